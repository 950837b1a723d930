// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page renderer — turns PDF bytes into one oversampled bitmap per page.
//
// The `PageRenderer` trait is the seam between the pipeline and the native
// rendering library. `PdfiumRenderer` binds libpdfium once at process start
// and is shared for the life of the process.

use std::path::{Path, PathBuf};

use befund_core::error::{BefundError, Result};
use image::RgbaImage;
use pdfium_render::prelude::*;
use tracing::{debug, info, instrument};

/// One page as it came out of the renderer, before post-processing.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 1-based page number.
    pub number: u32,
    /// Page width at 1x, in points.
    pub native_width_pt: f32,
    /// Page height at 1x, in points.
    pub native_height_pt: f32,
    /// Oversampled bitmap. May contain transparency.
    pub pixels: RgbaImage,
}

/// Why a document could not be rendered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderFailure {
    /// The bytes are not a readable PDF.
    #[error("cannot open document: {0}")]
    Open(String),
    /// A single page failed to render.
    #[error("page {number} failed to render: {reason}")]
    Page { number: u32, reason: String },
}

impl RenderFailure {
    /// Attach the display name of the offending file.
    pub fn into_error(self, name: &str) -> BefundError {
        match self {
            Self::Open(reason) => BefundError::Decode {
                name: name.to_string(),
                reason,
            },
            Self::Page { number, reason } => BefundError::Render {
                name: name.to_string(),
                reason: format!("page {number}: {reason}"),
            },
        }
    }
}

/// Renders every page of a PDF at `scale` times its native size.
///
/// Implementations return pages in ascending page-number order and render
/// each page exactly once.
pub trait PageRenderer: Send + Sync {
    fn render_pages(
        &self,
        data: &[u8],
        scale: f32,
    ) -> std::result::Result<Vec<RenderedPage>, RenderFailure>;
}

/// libpdfium-backed renderer.
pub struct PdfiumRenderer {
    pdfium: Pdfium,
}

impl PdfiumRenderer {
    /// Bind libpdfium. Call once at startup.
    ///
    /// Searches, in order:
    /// 1. `library_dir`, when given
    /// 2. Current directory (./libpdfium.so)
    /// 3. System library paths
    pub fn init(library_dir: Option<&Path>) -> Result<Self> {
        let mut candidates: Vec<PathBuf> = library_dir
            .map(|dir| Pdfium::pdfium_platform_library_name_at_path(dir))
            .into_iter()
            .collect();
        candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));

        let bindings = candidates
            .iter()
            .find_map(|path| Pdfium::bind_to_library(path).ok())
            .map(Ok)
            .unwrap_or_else(Pdfium::bind_to_system_library)
            .map_err(|e| {
                BefundError::Configuration(format!(
                    "failed to load the PDFium library; install libpdfium or pass its directory: {e:?}"
                ))
            })?;

        info!("PDFium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRenderer for PdfiumRenderer {
    #[instrument(skip(self, data), fields(bytes = data.len(), scale))]
    fn render_pages(
        &self,
        data: &[u8],
        scale: f32,
    ) -> std::result::Result<Vec<RenderedPage>, RenderFailure> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| RenderFailure::Open(e.to_string()))?;

        let pages = document.pages();
        let mut rendered = Vec::with_capacity(pages.len() as usize);

        for (index, page) in pages.iter().enumerate() {
            let number = index as u32 + 1;
            let native_width_pt = page.width().value;
            let native_height_pt = page.height().value;

            let config = PdfRenderConfig::new()
                .set_target_width((native_width_pt * scale).round() as i32)
                .set_target_height((native_height_pt * scale).round() as i32);

            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| RenderFailure::Page {
                    number,
                    reason: e.to_string(),
                })?;
            let pixels = bitmap.as_image().to_rgba8();

            debug!(
                page = number,
                native_width_pt,
                native_height_pt,
                width = pixels.width(),
                height = pixels.height(),
                "Page rendered"
            );

            rendered.push(RenderedPage {
                number,
                native_width_pt,
                native_height_pt,
                pixels,
            });
        }

        Ok(rendered)
    }
}
