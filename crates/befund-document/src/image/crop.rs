// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric cropper — cuts a screenshot down to its region of interest and
// clips the result to a rounded rectangle.

use befund_core::error::Result;
use befund_core::types::{CropRegion, InputFile};
use image::RgbaImage;
use tracing::{info, instrument};

use super::raster::{RasterImage, TRANSPARENT, acquire_surface};

/// Decode a screenshot and crop it to `region` with rounded corners.
///
/// Decode failures are reported against the file's display name.
#[instrument(skip(file), fields(name = %file.name, bytes = file.data.len()))]
pub fn crop_screenshot(file: &InputFile, region: CropRegion, radius_px: f32) -> Result<RasterImage> {
    let source = RasterImage::decode(&file.name, &file.data)?;
    let cropped = crop_rounded(source.as_rgba(), region, radius_px, &file.name)?;
    info!(
        from_w = source.width(),
        from_h = source.height(),
        width = cropped.width(),
        height = cropped.height(),
        "Screenshot cropped"
    );
    Ok(cropped)
}

/// Copy `region` of `source` onto a new transparent surface of exactly
/// `region.width` x `region.height`, keeping only pixels inside a rounded
/// rectangle with corner radius `radius_px`.
///
/// Parts of the region that fall outside the source stay transparent. The
/// radius is capped at half the shorter side.
pub fn crop_rounded(
    source: &RgbaImage,
    region: CropRegion,
    radius_px: f32,
    name: &str,
) -> Result<RasterImage> {
    region.validate()?;
    let mut surface = acquire_surface(region.width, region.height, TRANSPARENT, name)?;

    let (w, h) = (region.width as f32, region.height as f32);
    let radius = radius_px.max(0.0).min(w.min(h) / 2.0);

    for (x, y, pixel) in surface.enumerate_pixels_mut() {
        let (sx, sy) = (region.x as u64 + x as u64, region.y as u64 + y as u64);
        if sx >= source.width() as u64 || sy >= source.height() as u64 {
            continue;
        }
        if inside_rounded_rect(x as f32 + 0.5, y as f32 + 0.5, w, h, radius) {
            *pixel = *source.get_pixel(sx as u32, sy as u32);
        }
    }

    Ok(RasterImage::from_rgba(surface))
}

/// Whether the point (`px`, `py`) lies inside a `w` x `h` rectangle whose
/// corners are rounded with radius `r` (`r <= min(w, h) / 2`).
fn inside_rounded_rect(px: f32, py: f32, w: f32, h: f32, r: f32) -> bool {
    let cx = px.clamp(r, w - r);
    let cy = py.clamp(r, h - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

#[cfg(test)]
mod tests {
    use super::*;
    use befund_core::error::BefundError;
    use image::Rgba;

    /// Source whose pixel colour encodes its coordinates.
    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn output_has_exact_region_size() {
        let source = gradient(3000, 1200);
        let region = CropRegion::new(326, 202, 1571, 807);
        let cropped = crop_rounded(&source, region, 30.0, "shot.png").unwrap();
        assert_eq!((cropped.width(), cropped.height()), (1571, 807));
    }

    #[test]
    fn corners_are_masked_and_interior_matches_source() {
        let source = gradient(400, 300);
        let region = CropRegion::new(50, 40, 200, 120);
        let cropped = crop_rounded(&source, region, 30.0, "shot.png").unwrap();
        let out = cropped.as_rgba();

        for (x, y) in [(0, 0), (199, 0), (0, 119), (199, 119), (3, 3)] {
            assert_eq!(out.get_pixel(x, y).0[3], 0, "corner pixel ({x},{y}) should be clear");
        }
        for (x, y) in [(100, 60), (30, 0), (0, 30), (199, 60), (100, 119)] {
            assert_eq!(
                out.get_pixel(x, y),
                source.get_pixel(region.x + x, region.y + y),
                "pixel ({x},{y}) should come from the source"
            );
        }
    }

    #[test]
    fn zero_radius_keeps_every_pixel() {
        let source = gradient(20, 20);
        let cropped = crop_rounded(&source, CropRegion::new(0, 0, 20, 20), 0.0, "s").unwrap();
        assert!(!cropped.has_transparency());
    }

    #[test]
    fn region_past_source_edge_stays_transparent() {
        let source = gradient(100, 100);
        let region = CropRegion::new(60, 60, 80, 80);
        let cropped = crop_rounded(&source, region, 0.0, "small.png").unwrap();
        assert_eq!((cropped.width(), cropped.height()), (80, 80));
        assert_eq!(cropped.as_rgba().get_pixel(10, 10), source.get_pixel(70, 70));
        assert_eq!(cropped.as_rgba().get_pixel(50, 50).0[3], 0);
    }

    #[test]
    fn zero_extent_region_is_rejected() {
        let source = gradient(10, 10);
        assert!(matches!(
            crop_rounded(&source, CropRegion::new(0, 0, 0, 5), 30.0, "s"),
            Err(BefundError::Configuration(_))
        ));
    }

    #[test]
    fn undecodable_screenshot_names_the_file() {
        let file = InputFile::new("segmentation-3.png", b"\x89PNG broken".to_vec());
        let err = crop_screenshot(&file, CropRegion::new(0, 0, 10, 10), 30.0).unwrap_err();
        assert_eq!(err.item_name(), Some("segmentation-3.png"));
    }

    #[test]
    fn rounded_rect_membership() {
        assert!(inside_rounded_rect(50.0, 50.0, 100.0, 100.0, 30.0));
        assert!(!inside_rounded_rect(1.0, 1.0, 100.0, 100.0, 30.0));
        assert!(inside_rounded_rect(30.0, 0.5, 100.0, 100.0, 30.0));
    }
}
