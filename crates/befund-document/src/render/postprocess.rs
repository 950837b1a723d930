// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-category post-processing of rendered report pages.
//
// Pure with respect to its inputs: the same rendered page, step and scale
// always give the same output, independent of any other page.

use befund_core::config::{BrandOverlay, FooterRedaction};
use befund_core::types::PostProcess;
use tracing::debug;

use crate::image::brand::{BrandMark, mark_height_for};
use crate::image::raster::RasterImage;

/// Apply `step` to a page rendered at `scale` times its native size.
pub fn apply(step: PostProcess, page: RasterImage, scale: f32, mark: &BrandMark) -> RasterImage {
    match step {
        PostProcess::Identity => page,
        PostProcess::FooterRedaction(band) => redact_footer(page, band, scale),
        PostProcess::OverlayAndRotate(overlay) => {
            overlay_brand(page, overlay, scale, mark).rotate_quarter()
        }
    }
}

/// Paint the bottom band of the page white.
fn redact_footer(page: RasterImage, band: FooterRedaction, scale: f32) -> RasterImage {
    let band_px = ((band.band_height_pt * scale).round() as u32).min(page.height());
    let top = (page.height() - band_px) as i32;
    debug!(band_px, top, "Redacting footer");
    let width = page.width();
    page.fill_white(0, top, width, band_px)
}

/// Cover the vendor logo with a white backdrop and draw the brand mark on it.
fn overlay_brand(page: RasterImage, overlay: BrandOverlay, scale: f32, mark: &BrandMark) -> RasterImage {
    let logo_w = overlay.logo_width_pt * scale;
    let logo_h = mark_height_for(logo_w);
    let logo_x = overlay.offset_x_pt * scale;
    let logo_y = overlay.offset_y_pt * scale;

    let backdrop_y = logo_y - overlay.backdrop_raise_pt * scale;
    let backdrop_w = logo_w + overlay.backdrop_extra_width_pt * scale;
    let backdrop_h = logo_h + overlay.backdrop_extra_height_pt * scale;

    debug!(logo_x, logo_y, logo_w, logo_h, "Overlaying brand mark");

    let logo = mark.render(logo_w.round() as u32);
    page.fill_white(
        logo_x.round() as i32,
        backdrop_y.round() as i32,
        backdrop_w.round() as u32,
        backdrop_h.round() as u32,
    )
    .overlay(&logo, logo_x.round() as i64, logo_y.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::WHITE;
    use image::{Rgba, RgbaImage};

    const INK: Rgba<u8> = Rgba([10, 10, 10, 255]);

    /// A 3x-oversampled A4 page (595x842 pt) filled with dark ink.
    fn inked_page() -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_pixel(1785, 2526, INK))
    }

    #[test]
    fn identity_leaves_page_untouched() {
        let out = apply(PostProcess::Identity, inked_page(), 3.0, &BrandMark::generated());
        assert_eq!((out.width(), out.height()), (1785, 2526));
        assert_eq!(*out.as_rgba().get_pixel(0, 2525), INK);
    }

    #[test]
    fn footer_band_is_whited_out() {
        let step = PostProcess::FooterRedaction(FooterRedaction::default());
        let out = apply(step, inked_page(), 3.0, &BrandMark::generated());
        let buf = out.as_rgba();

        assert_eq!((out.width(), out.height()), (1785, 2526));
        // 70pt at 3x = 210 px band.
        assert_eq!(*buf.get_pixel(0, 2526 - 210), WHITE);
        assert_eq!(*buf.get_pixel(1784, 2525), WHITE);
        assert_eq!(*buf.get_pixel(900, 2526 - 211), INK);
    }

    #[test]
    fn band_taller_than_page_covers_whole_page() {
        let step = PostProcess::FooterRedaction(FooterRedaction {
            band_height_pt: 10_000.0,
        });
        let page = RasterImage::from_rgba(RgbaImage::from_pixel(30, 20, INK));
        let out = apply(step, page, 3.0, &BrandMark::generated());
        assert!(out.as_rgba().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn overlay_rotates_and_swaps_axes() {
        let step = PostProcess::OverlayAndRotate(BrandOverlay::default());
        let out = apply(step, inked_page(), 3.0, &BrandMark::generated());
        assert_eq!((out.width(), out.height()), (2526, 1785));
    }

    #[test]
    fn overlay_draws_backdrop_before_rotation() {
        let overlay = BrandOverlay::default();
        let out = overlay_brand(inked_page(), overlay, 3.0, &BrandMark::generated());
        let buf = out.as_rgba();

        // Backdrop spans from the raised top edge (77 - 30 = 47 px) at x = 65.
        assert_eq!(*buf.get_pixel(66, 48), WHITE);
        // Far right of the backdrop: logo is 330 px wide, backdrop 30 px wider.
        assert_eq!(*buf.get_pixel(65 + 345, 60), WHITE);
        // Outside the backdrop the ink survives.
        assert_eq!(*buf.get_pixel(10, 10), INK);
        assert_eq!(*buf.get_pixel(1000, 1000), INK);
        // The generated mark's navy disc is drawn on top of the backdrop.
        assert_ne!(*buf.get_pixel(65 + 50, 77 + 29), WHITE);
    }
}
