// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// befund-document — Document assembly for Befund.
//
// Crops screenshots with rounded corners, rasterizes and post-processes report
// PDFs, lays everything out on branded pages and encodes a single PDF.

pub mod assemble;
pub mod image;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export the primary structs so callers can use `befund_document::Assembler` etc.
pub use assemble::Assembler;
pub use crate::image::brand::BrandMark;
pub use pdf::reader::PdfReader;
pub use pdf::writer::PdfWriter;
pub use render::renderer::{PageRenderer, PdfiumRenderer};
pub use session::AssemblySession;
pub use store::{DocumentHandle, DocumentStore};
