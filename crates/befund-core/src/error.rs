// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Befund.

use thiserror::Error;

/// Top-level error type for all Befund operations.
///
/// Every per-item failure aborts the whole assembly; there is no partial
/// document. The caller retries by re-running assembly from the original
/// inputs.
#[derive(Debug, Error)]
pub enum BefundError {
    // -- Defects --
    #[error("invalid configuration: {0}")]
    Configuration(String),

    // -- Per-item errors --
    #[error("could not read {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("could not render {name}: {reason}")]
    Render { name: String, reason: String },

    // -- Assembly --
    #[error("no files to process")]
    EmptyInput,

    #[error("document encoding failed: {0}")]
    Encode(String),

    #[error("assembly task failed: {0}")]
    Task(String),

    // -- Output handles --
    #[error("unknown document handle: {0}")]
    UnknownHandle(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BefundError {
    /// Display name of the input item this error is scoped to, if any.
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::Decode { name, .. } | Self::Render { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BefundError>;
