// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the unit tests.

use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use crate::image::raster::RasterImage;
use crate::render::renderer::{PageRenderer, RenderFailure, RenderedPage};

/// Renderer that recognises registered byte strings as documents with known
/// page sizes and paints each page a flat grey. Anything else fails to open.
#[derive(Default)]
pub struct SyntheticRenderer {
    documents: HashMap<Vec<u8>, Vec<(f32, f32)>>,
    failing: HashMap<Vec<u8>, u32>,
}

impl SyntheticRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `data` as a document whose pages have the given sizes in points.
    pub fn with_document(mut self, data: &[u8], pages: &[(f32, f32)]) -> Self {
        self.documents.insert(data.to_vec(), pages.to_vec());
        self
    }

    /// Make page `number` of the registered document `data` fail to render.
    pub fn failing_page(mut self, data: &[u8], number: u32) -> Self {
        self.failing.insert(data.to_vec(), number);
        self
    }
}

impl PageRenderer for SyntheticRenderer {
    fn render_pages(&self, data: &[u8], scale: f32) -> Result<Vec<RenderedPage>, RenderFailure> {
        let sizes = self
            .documents
            .get(data)
            .ok_or_else(|| RenderFailure::Open("not a PDF".into()))?;

        let mut pages = Vec::with_capacity(sizes.len());
        for (index, &(width_pt, height_pt)) in sizes.iter().enumerate() {
            let number = index as u32 + 1;
            if self.failing.get(data) == Some(&number) {
                return Err(RenderFailure::Page {
                    number,
                    reason: "synthetic failure".into(),
                });
            }
            let shade = (40 * number % 200) as u8;
            pages.push(RenderedPage {
                number,
                native_width_pt: width_pt,
                native_height_pt: height_pt,
                pixels: RgbaImage::from_pixel(
                    (width_pt * scale).round() as u32,
                    (height_pt * scale).round() as u32,
                    Rgba([shade, shade, shade, 255]),
                ),
            });
        }
        Ok(pages)
    }
}

/// PNG bytes of a flat `width` x `height` image.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    RasterImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba([70, 120, 200, 255])))
        .to_png_bytes()
        .expect("PNG encoding of a test image")
}
