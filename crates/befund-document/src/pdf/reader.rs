// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — inspect existing PDF documents using the `lopdf` crate.
//
// Used to check an assembled document after encoding and to summarise it on
// the command line. Rendering goes through the page renderer, not through here.

use std::path::Path;

use befund_core::error::{BefundError, Result};
use befund_core::types::PageSize;
use lopdf::{Dictionary, Document, Object};
use tracing::{debug, instrument};

/// How many /Parent hops to follow when looking for an inherited MediaBox.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Read-only view over a parsed PDF.
pub struct PdfReader {
    document: Document,
    /// Display name used in error messages.
    name: String,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Self::from_bytes(path.display().to_string(), &data)
    }

    /// Parse PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Result<Self> {
        let name = name.into();
        let document = Document::load_mem(data).map_err(|err| BefundError::Decode {
            name: name.clone(),
            reason: format!("failed to parse PDF: {err}"),
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self { document, name })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Page sizes in millimetres, in page order, taken from each page's
    /// (possibly inherited) MediaBox.
    pub fn page_sizes(&self) -> Result<Vec<PageSize>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, id)| {
                let page = self.document.get_dictionary(id).map_err(|err| {
                    self.decode_error(format!("cannot read page {number}: {err}"))
                })?;
                let (width_pt, height_pt) = self
                    .media_box(page)
                    .ok_or_else(|| self.decode_error(format!("page {number} has no MediaBox")))?;
                Ok(PageSize::from_points(width_pt, height_pt))
            })
            .collect()
    }

    // -- Helpers --------------------------------------------------------------

    /// Width and height of the MediaBox, walking up the page tree if needed.
    fn media_box(&self, page: &Dictionary) -> Option<(f32, f32)> {
        let mut node = page;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = node.get(b"MediaBox") {
                return self.rect_size(value);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.document.get_dictionary(parent).ok()?;
        }
        None
    }

    fn rect_size(&self, value: &Object) -> Option<(f32, f32)> {
        let value = match value {
            Object::Reference(id) => self.document.get_object(*id).ok()?,
            other => other,
        };
        let coords = value
            .as_array()
            .ok()?
            .iter()
            .map(number)
            .collect::<Option<Vec<f32>>>()?;
        match coords.as_slice() {
            [x0, y0, x1, y1] => Some(((x1 - x0).abs(), (y1 - y0).abs())),
            _ => None,
        }
    }

    fn decode_error(&self, reason: String) -> BefundError {
        BefundError::Decode {
            name: self.name.clone(),
            reason,
        }
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}
