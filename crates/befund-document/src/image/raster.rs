// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster images — the pixel buffers that flow from the cropper and the
// rasterizer into the layout engine. Operates on in-memory RGBA images using
// the `image` and `imageproc` crates.

use befund_core::error::{BefundError, Result};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};

/// Opaque white.
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Fully transparent black.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Upper bound on a single rendering surface (1 GiB of RGBA pixels).
const MAX_SURFACE_PIXELS: u64 = 1 << 28;

/// Allocate a rendering surface of `width` x `height` filled with `fill`.
///
/// Fails with [`BefundError::Render`] when the surface has no area or would
/// exceed [`MAX_SURFACE_PIXELS`]; `name` identifies the item being processed.
pub fn acquire_surface(width: u32, height: u32, fill: Rgba<u8>, name: &str) -> Result<RgbaImage> {
    let pixels = width as u64 * height as u64;
    if pixels == 0 || pixels > MAX_SURFACE_PIXELS {
        return Err(BefundError::Render {
            name: name.to_string(),
            reason: format!("cannot allocate a {width}x{height} surface"),
        });
    }
    Ok(RgbaImage::from_pixel(width, height, fill))
}

/// An immutable-by-convention RGBA pixel buffer.
///
/// Produced once by the cropper or the rasterizer, consumed once by the layout
/// engine. Transformations consume `self` and return the transformed image.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: RgbaImage,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Decode encoded bytes (JPEG, PNG, WebP...). `name` is the display name of
    /// the item, reported on failure.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(name: &str, data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| BefundError::Decode {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self {
            image: img.to_rgba8(),
        })
    }

    /// Wrap an already-decoded RGBA buffer.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.image.width() as f32 / self.image.height() as f32
    }

    /// Whether any pixel is not fully opaque.
    pub fn has_transparency(&self) -> bool {
        self.image.pixels().any(|p| p.0[3] != 255)
    }

    /// Borrow the underlying buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the image and return the underlying buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Composite the image onto an opaque white surface of the same size.
    pub fn flatten_on_white(self, name: &str) -> Result<Self> {
        let mut surface = acquire_surface(self.width(), self.height(), WHITE, name)?;
        image::imageops::overlay(&mut surface, &self.image, 0, 0);
        Ok(Self { image: surface })
    }

    /// Paint an opaque white rectangle. Parts outside the image are ignored.
    pub fn fill_white(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        if width > 0 && height > 0 {
            draw_filled_rect_mut(
                &mut self.image,
                Rect::at(x, y).of_size(width, height),
                WHITE,
            );
        }
        self
    }

    /// Alpha-blend `top` with its top-left corner at (`x`, `y`).
    pub fn overlay(mut self, top: &RgbaImage, x: i64, y: i64) -> Self {
        image::imageops::overlay(&mut self.image, top, x, y);
        self
    }

    /// Rotate a quarter turn clockwise about the centre. The output swaps
    /// width and height.
    #[instrument(skip(self), fields(width = self.width(), height = self.height()))]
    pub fn rotate_quarter(self) -> Self {
        let rotated = image::imageops::rotate90(&self.image);
        debug!(width = rotated.width(), height = rotated.height(), "Rotated");
        Self { image: rotated }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        DynamicImage::ImageRgba8(self.image.clone())
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| BefundError::Encode(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }
}
