// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Brand mark — the clinic logo drawn on every output page, and the stamper
// that decides where it goes.

use std::path::Path;

use befund_core::config::StampSettings;
use befund_core::error::Result;
use befund_core::types::PageSize;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use tracing::{debug, info};

use super::raster::RasterImage;

/// Native width of the mark in pixels.
pub const MARK_WIDTH_PX: u32 = 680;
/// Native height of the mark in pixels.
pub const MARK_HEIGHT_PX: u32 = 120;

/// Height of a mark drawn `width` units wide.
pub fn mark_height_for(width: f32) -> f32 {
    width * MARK_HEIGHT_PX as f32 / MARK_WIDTH_PX as f32
}

/// The brand mark, normalised to the fixed 680:120 aspect ratio.
#[derive(Debug, Clone)]
pub struct BrandMark {
    image: RgbaImage,
}

impl BrandMark {
    /// Load a mark from encoded PNG/JPEG bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let decoded = RasterImage::decode("brand mark", data)?;
        Ok(Self::normalised(decoded.into_rgba()))
    }

    /// Load a mark from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        info!(path = %path.as_ref().display(), "Brand mark loaded");
        Self::from_bytes(&data)
    }

    /// Load the configured mark, or fall back to the generated one.
    pub fn from_config(mark_path: Option<&Path>) -> Result<Self> {
        match mark_path {
            Some(path) => Self::open(path),
            None => Ok(Self::generated()),
        }
    }

    /// A plain geometric emblem used when no logo file is configured.
    pub fn generated() -> Self {
        let navy = Rgba([22u8, 52, 96, 255]);
        let teal = Rgba([0u8, 150, 160, 255]);
        let mut image = RgbaImage::from_pixel(MARK_WIDTH_PX, MARK_HEIGHT_PX, Rgba([0, 0, 0, 0]));

        draw_filled_circle_mut(&mut image, (60, 60), 50, navy);
        draw_filled_circle_mut(&mut image, (60, 60), 22, Rgba([255, 255, 255, 255]));
        draw_filled_rect_mut(&mut image, Rect::at(130, 28).of_size(520, 26), navy);
        draw_filled_rect_mut(&mut image, Rect::at(130, 66).of_size(360, 26), teal);

        Self { image }
    }

    fn normalised(image: RgbaImage) -> Self {
        if image.dimensions() == (MARK_WIDTH_PX, MARK_HEIGHT_PX) {
            return Self { image };
        }
        debug!(
            from_w = image.width(),
            from_h = image.height(),
            "Normalising brand mark to 680x120"
        );
        Self {
            image: imageops::resize(&image, MARK_WIDTH_PX, MARK_HEIGHT_PX, FilterType::Lanczos3),
        }
    }

    /// The mark at its native 680x120 size.
    pub fn native(&self) -> &RgbaImage {
        &self.image
    }

    /// The mark resized to `width_px`, height following the fixed aspect ratio.
    pub fn render(&self, width_px: u32) -> RgbaImage {
        let width_px = width_px.max(1);
        let height_px = (mark_height_for(width_px as f32).round() as u32).max(1);
        if (width_px, height_px) == self.image.dimensions() {
            return self.image.clone();
        }
        imageops::resize(&self.image, width_px, height_px, FilterType::Lanczos3)
    }
}

/// Rectangle on an output page in millimetres, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

impl Placement {
    /// Bottom edge, measured from the top of the page.
    pub fn bottom_mm(&self) -> f32 {
        self.y_mm + self.height_mm
    }
}

/// Places the brand mark in the bottom-right corner of a page.
#[derive(Debug, Clone)]
pub struct BrandStamper {
    width_mm: f32,
    margin_mm: f32,
}

impl BrandStamper {
    pub fn new(settings: &StampSettings) -> Self {
        Self {
            width_mm: settings.width_mm,
            margin_mm: settings.margin_mm,
        }
    }

    /// Where the mark goes on a page of the given size.
    pub fn placement(&self, page: PageSize) -> Placement {
        let height_mm = mark_height_for(self.width_mm);
        Placement {
            x_mm: page.width_mm - self.margin_mm - self.width_mm,
            y_mm: page.height_mm - self.margin_mm - height_mm,
            width_mm: self.width_mm,
            height_mm,
        }
    }
}
