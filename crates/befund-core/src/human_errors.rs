// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for clinic staff.
//
// Every technical error is mapped to one plain-language message with a
// suggestion. The severity drives how the front end presents it.

use crate::error::BefundError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Running assembly again may succeed (I/O hiccup, task failure).
    Transient,
    /// The user must change the inputs (remove or replace a file).
    ActionRequired,
    /// A defect in configuration or the program itself.
    Defect,
}

/// A human-readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Single user-visible message.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether re-running assembly unchanged is worth a try.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `BefundError` into a `HumanError`.
pub fn humanize_error(err: &BefundError) -> HumanError {
    match err {
        BefundError::Configuration(detail) => HumanError {
            message: "The assembler is configured incorrectly.".into(),
            suggestion: format!("Check the configuration file. ({detail})"),
            retriable: false,
            severity: Severity::Defect,
        },

        BefundError::Decode { name, .. } => {
            if is_pdf(name) {
                HumanError {
                    message: format!("Could not process PDF file: {name}"),
                    suggestion: "The file may be damaged or password protected. Export the report again and retry.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: format!("Could not read image: {name}"),
                    suggestion: "Save the screenshot again as PNG or JPEG and retry.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            }
        }

        BefundError::Render { name, reason } => HumanError {
            message: if is_pdf(name) {
                format!("Could not process PDF file: {name}")
            } else {
                format!("Could not process file: {name}")
            },
            suggestion: format!("The page could not be drawn. Try again, or remove this file. ({reason})"),
            retriable: true,
            severity: Severity::Transient,
        },

        BefundError::EmptyInput => HumanError {
            message: "No files to process.".into(),
            suggestion: "Add at least one screenshot or report, then start processing.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BefundError::Encode(_) => HumanError {
            message: "The combined PDF could not be created.".into(),
            suggestion: "Try again. If this keeps happening, process fewer files at once.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BefundError::Task(_) => HumanError {
            message: "Processing stopped unexpectedly.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        BefundError::UnknownHandle(_) => HumanError {
            message: "This document is no longer available.".into(),
            suggestion: "Process the files again to create a new document.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        BefundError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Choose the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The program doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        BefundError::Serialization(_) => HumanError {
            message: "The configuration file could not be read.".into(),
            suggestion: "Check that the configuration file is valid JSON.".into(),
            retriable: false,
            severity: Severity::Defect,
        },
    }
}

fn is_pdf(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_render_failure_names_the_pdf() {
        let err = BefundError::Render {
            name: "radiology.pdf".into(),
            reason: "page 2: out of memory".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.message, "Could not process PDF file: radiology.pdf");
        assert!(human.suggestion.contains("page 2: out of memory"));
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::Transient);
    }

    #[test]
    fn pdf_decode_names_the_file() {
        let err = BefundError::Decode {
            name: "ceph.PDF".into(),
            reason: "bad xref".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.message, "Could not process PDF file: ceph.PDF");
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn image_decode_names_the_file() {
        let err = BefundError::Decode {
            name: "scan-01.png".into(),
            reason: "truncated".into(),
        };
        assert!(humanize_error(&err).message.contains("scan-01.png"));
    }

    #[test]
    fn empty_input_is_action_required() {
        let human = humanize_error(&BefundError::EmptyInput);
        assert_eq!(human.message, "No files to process.");
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn configuration_is_a_defect() {
        let human = humanize_error(&BefundError::Configuration("zero extent".into()));
        assert_eq!(human.severity, Severity::Defect);
        assert!(human.suggestion.contains("zero extent"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = BefundError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }

    #[test]
    fn encode_failure_is_retriable() {
        let human = humanize_error(&BefundError::Encode("empty output".into()));
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::Transient);
    }
}
