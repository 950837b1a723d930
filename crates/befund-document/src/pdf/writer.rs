// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — encode an assembled document into PDF bytes using `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: every raster is registered once as an
// XObject, each page is a `PdfPage` holding a `Vec<Op>` of placements, and the
// whole document is serialised via `PdfDocument::save()`.

use befund_core::config::OutputSettings;
use befund_core::error::{BefundError, Result};
use image::RgbaImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, RawImage, RawImageData,
    RawImageFormat, XObjectId, XObjectTransform,
};
use tracing::{debug, info, instrument, warn};

use super::reader::PdfReader;
use crate::image::brand::{BrandMark, Placement};
use crate::image::raster::RasterImage;
use crate::layout::{OutputPage, SealedDocument};

/// At 72 DPI one image pixel spans one point, so scale factors are simply
/// target points over pixels.
const PLACEMENT_DPI: f32 = 72.0;

/// Serialises sealed documents into PDF bytes.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
    /// Re-parse the output and compare page counts before returning it.
    verify: bool,
}

impl PdfWriter {
    pub fn new(settings: &OutputSettings) -> Self {
        Self {
            title: settings.title.clone(),
            verify: settings.verify,
        }
    }

    /// Encode `document` with every page's stamp drawn from `mark`.
    ///
    /// Page order is preserved exactly. Rasters with transparent pixels are
    /// embedded with their alpha channel so the page shows through.
    #[instrument(skip_all, fields(pages = document.page_count()))]
    pub fn encode(&self, document: SealedDocument, mark: &BrandMark) -> Result<Vec<u8>> {
        let expected_pages = document.page_count();
        info!(title = %self.title, pages = expected_pages, "Encoding PDF");

        let mut doc = PdfDocument::new(&self.title);

        // The stamp is the same on every page, so embed it once.
        let mark_id = document
            .pages()
            .iter()
            .any(|page| page.stamp.is_some())
            .then(|| doc.add_image(&raw_image(mark.native(), true)));

        let mut pages = Vec::with_capacity(expected_pages);
        for page in document.into_pages() {
            pages.push(self.encode_page(&mut doc, page, mark, mark_id.as_ref()));
        }
        doc.with_pages(pages);

        // Rasters are embedded at full resolution; printpdf's default image
        // optimisation would resample anything over its size budget.
        let options = PdfSaveOptions {
            image_optimization: None,
            ..PdfSaveOptions::default()
        };
        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&options, &mut warnings);
        for warning in &warnings {
            debug!(?warning, "printpdf warning");
        }

        if output.is_empty() {
            return Err(BefundError::Encode("serialiser produced no bytes".into()));
        }
        if self.verify {
            self.check(&output, expected_pages)?;
        }

        info!(bytes = output.len(), "PDF encoded");
        Ok(output)
    }

    fn encode_page(
        &self,
        doc: &mut PdfDocument,
        page: OutputPage,
        mark: &BrandMark,
        mark_id: Option<&XObjectId>,
    ) -> PdfPage {
        let page_height = page.size.height_mm;
        let mut ops = Vec::with_capacity(page.images.len() + 1);

        for placed in page.images {
            let (width_px, height_px) = (placed.image.width(), placed.image.height());
            let id = doc.add_image(&raster_to_raw(placed.image));
            ops.push(place(id, placed.placement, width_px, height_px, page_height));
        }

        if let (Some(stamp), Some(id)) = (page.stamp, mark_id) {
            let native = mark.native();
            ops.push(place(id.clone(), stamp, native.width(), native.height(), page_height));
        }

        debug!(
            width_mm = page.size.width_mm,
            height_mm = page.size.height_mm,
            placements = ops.len(),
            "Page encoded"
        );
        PdfPage::new(Mm(page.size.width_mm), Mm(page_height), ops)
    }

    /// Parse the encoded bytes back and make sure nothing was lost.
    fn check(&self, output: &[u8], expected_pages: usize) -> Result<()> {
        let reader = PdfReader::from_bytes(self.title.clone(), output)
            .map_err(|err| BefundError::Encode(format!("output does not parse: {err}")))?;
        let actual = reader.page_count();
        if actual != expected_pages {
            warn!(expected_pages, actual, "Encoded page count mismatch");
            return Err(BefundError::Encode(format!(
                "expected {expected_pages} pages in output, found {actual}"
            )));
        }
        Ok(())
    }
}

// -- Placement helpers --------------------------------------------------------

/// Draw XObject `id` (of `width_px` x `height_px`) into `rect`, measured from
/// the top-left of a page `page_height_mm` tall.
fn place(id: XObjectId, rect: Placement, width_px: u32, height_px: u32, page_height_mm: f32) -> Op {
    let target_w_pt = Mm(rect.width_mm).into_pt().0;
    let target_h_pt = Mm(rect.height_mm).into_pt().0;

    Op::UseXobject {
        id,
        transform: XObjectTransform {
            translate_x: Some(Mm(rect.x_mm).into_pt()),
            // PDF space grows upwards from the bottom edge.
            translate_y: Some(Mm(page_height_mm - rect.bottom_mm()).into_pt()),
            scale_x: Some(target_w_pt / width_px.max(1) as f32),
            scale_y: Some(target_h_pt / height_px.max(1) as f32),
            dpi: Some(PLACEMENT_DPI),
            rotate: None,
        },
    }
}

fn raster_to_raw(image: RasterImage) -> RawImage {
    let keep_alpha = image.has_transparency();
    raw_image(&image.into_rgba(), keep_alpha)
}

fn raw_image(image: &RgbaImage, keep_alpha: bool) -> RawImage {
    let (width, height) = (image.width() as usize, image.height() as usize);
    if keep_alpha {
        RawImage {
            pixels: RawImageData::U8(image.as_raw().clone()),
            width,
            height,
            data_format: RawImageFormat::RGBA8,
            tag: Vec::new(),
        }
    } else {
        let rgb: Vec<u8> = image.pixels().flat_map(|p| [p[0], p[1], p[2]]).collect();
        RawImage {
            pixels: RawImageData::U8(rgb),
            width,
            height,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::brand::BrandStamper;
    use crate::layout::{AssembledDocument, LayoutEngine};
    use crate::render::rasterize::PageDescriptor;
    use befund_core::config::{LayoutSettings, StampSettings};
    use befund_core::types::{PageSize, SourceCategory};
    use image::Rgba;

    fn engine() -> LayoutEngine {
        LayoutEngine::new(
            LayoutSettings::default(),
            BrandStamper::new(&StampSettings::default()),
        )
    }

    fn screenshot() -> RasterImage {
        let mut img = RgbaImage::from_pixel(157, 81, Rgba([200, 30, 30, 255]));
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        RasterImage::from_rgba(img)
    }

    #[test]
    fn encodes_every_page_at_its_own_size() {
        let engine = engine();
        let mut doc = AssembledDocument::new();
        engine.flow_screenshots(&mut doc, vec![screenshot(), screenshot()]);
        engine.pass_through_reports(
            &mut doc,
            vec![PageDescriptor {
                image: RasterImage::from_rgba(RgbaImage::from_pixel(84, 60, Rgba([9, 9, 9, 255]))),
                size: PageSize::from_points(842.0, 595.0),
                category: SourceCategory::CephalometricAnalysis,
                page_number: 1,
                branded: true,
            }],
        );

        let writer = PdfWriter::new(&OutputSettings::default());
        let bytes = writer.encode(doc.seal().unwrap(), &BrandMark::generated()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let reader = PdfReader::from_bytes("out.pdf", &bytes).unwrap();
        let sizes = reader.page_sizes().unwrap();
        assert_eq!(sizes.len(), 2);
        assert!((sizes[0].width_mm - 210.0).abs() < 0.5);
        assert!((sizes[0].height_mm - 297.0).abs() < 0.5);
        assert!((sizes[1].width_mm - 297.0).abs() < 0.5);
        assert!((sizes[1].height_mm - 210.0).abs() < 0.5);
    }

    /// Pixel size of every image XObject in an encoded PDF.
    fn embedded_image_sizes(bytes: &[u8]) -> Vec<(i64, i64)> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        doc.objects
            .values()
            .filter_map(|object| match object {
                lopdf::Object::Stream(stream) => Some(&stream.dict),
                _ => None,
            })
            .filter(|dict| {
                matches!(dict.get(b"Subtype"), Ok(lopdf::Object::Name(name)) if name == b"Image")
            })
            .map(|dict| {
                let width = dict.get(b"Width").and_then(lopdf::Object::as_i64).unwrap();
                let height = dict.get(b"Height").and_then(lopdf::Object::as_i64).unwrap();
                (width, height)
            })
            .collect()
    }

    #[test]
    fn rasters_are_embedded_at_full_resolution() {
        let engine = engine();
        let mut doc = AssembledDocument::new();

        let mut crop = RgbaImage::from_pixel(1571, 807, Rgba([200, 30, 30, 255]));
        crop.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        engine.flow_screenshots(&mut doc, vec![RasterImage::from_rgba(crop)]);
        engine.pass_through_reports(
            &mut doc,
            vec![PageDescriptor {
                // An A4 page rendered at 3x.
                image: RasterImage::from_rgba(RgbaImage::from_pixel(
                    1785,
                    2526,
                    Rgba([40, 40, 40, 255]),
                )),
                size: PageSize::from_points(595.0, 842.0),
                category: SourceCategory::RadiologicalReport,
                page_number: 1,
                branded: false,
            }],
        );

        let writer = PdfWriter::new(&OutputSettings::default());
        let bytes = writer.encode(doc.seal().unwrap(), &BrandMark::generated()).unwrap();
        let sizes = embedded_image_sizes(&bytes);

        assert!(sizes.contains(&(1785, 2526)), "report page resampled: {sizes:?}");
        assert!(sizes.contains(&(1571, 807)), "screenshot crop resampled: {sizes:?}");
        assert!(sizes.contains(&(680, 120)), "brand mark resampled: {sizes:?}");
    }

    #[test]
    fn placement_is_measured_from_page_bottom() {
        let rect = Placement {
            x_mm: 10.0,
            y_mm: 10.0,
            width_mm: 190.0,
            height_mm: 100.0,
        };
        let Op::UseXobject { transform, .. } =
            place(XObjectId::new(), rect, 1900, 1000, 297.0)
        else {
            panic!("expected an XObject placement");
        };
        let y = transform.translate_y.unwrap().0;
        assert!((y - Mm(187.0).into_pt().0).abs() < 1e-2);
        let scale = transform.scale_x.unwrap();
        assert!((scale * 1900.0 - Mm(190.0).into_pt().0).abs() < 1e-2);
    }

    #[test]
    fn opaque_rasters_drop_alpha() {
        let raw = raster_to_raw(RasterImage::from_rgba(RgbaImage::from_pixel(
            2,
            2,
            Rgba([1, 2, 3, 255]),
        )));
        assert!(matches!(raw.data_format, RawImageFormat::RGB8));
        let RawImageData::U8(pixels) = raw.pixels else {
            panic!("expected 8-bit pixels");
        };
        assert_eq!(pixels, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn transparent_rasters_keep_alpha() {
        let raw = raster_to_raw(screenshot());
        assert!(matches!(raw.data_format, RawImageFormat::RGBA8));
    }
}
