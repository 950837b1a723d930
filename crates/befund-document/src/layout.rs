// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout engine — places raster images onto output pages.
//
// Two policies run in a fixed order. Screenshots are flowed top to bottom
// onto fixed-size pages, greedily and without backtracking. Report pages then
// pass through as one custom-sized page each. Screenshot pages always come
// first, whatever order the inputs arrived in.

use befund_core::config::LayoutSettings;
use befund_core::error::{BefundError, Result};
use befund_core::types::{PageSize, SourceCategory};
use tracing::{debug, info, instrument};

use crate::image::brand::{BrandStamper, Placement};
use crate::image::raster::RasterImage;
use crate::render::rasterize::PageDescriptor;

/// An image and the rectangle it occupies on its page.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub image: RasterImage,
    pub placement: Placement,
}

/// Where an output page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrigin {
    /// A flow-layout page of cropped screenshots.
    Screenshots,
    /// One page of a report document.
    Report {
        category: SourceCategory,
        page_number: u32,
    },
}

/// One page of the assembled document.
#[derive(Debug, Clone)]
pub struct OutputPage {
    pub size: PageSize,
    pub origin: PageOrigin,
    pub images: Vec<PlacedImage>,
    /// Brand stamp position; at most one per page.
    pub stamp: Option<Placement>,
}

impl OutputPage {
    fn new(size: PageSize, origin: PageOrigin) -> Self {
        Self {
            size,
            origin,
            images: Vec::new(),
            stamp: None,
        }
    }
}

/// Append-only sequence of output pages under construction.
#[derive(Debug, Default)]
pub struct AssembledDocument {
    pages: Vec<OutputPage>,
}

impl AssembledDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: OutputPage) {
        self.pages.push(page);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[OutputPage] {
        &self.pages
    }

    /// Freeze the document. An empty document is never sealed.
    pub fn seal(self) -> Result<SealedDocument> {
        if self.pages.is_empty() {
            return Err(BefundError::EmptyInput);
        }
        Ok(SealedDocument { pages: self.pages })
    }
}

/// A finished, non-empty page sequence ready for encoding.
#[derive(Debug)]
pub struct SealedDocument {
    pages: Vec<OutputPage>,
}

impl SealedDocument {
    pub fn pages(&self) -> &[OutputPage] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_pages(self) -> Vec<OutputPage> {
        self.pages
    }
}

/// Places images according to the layout settings, stamping pages with the
/// brand mark.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    settings: LayoutSettings,
    stamper: BrandStamper,
}

impl LayoutEngine {
    pub fn new(settings: LayoutSettings, stamper: BrandStamper) -> Self {
        Self { settings, stamper }
    }

    /// Size of an image with `aspect_ratio` scaled to the printable width,
    /// shrunk to the printable height when it would be taller.
    pub fn fit_to_printable(&self, aspect_ratio: f32) -> (f32, f32) {
        let page = self.settings.page;
        let margin = self.settings.margin_mm;
        let max_height = page.height_mm - 2.0 * margin;

        let mut width = page.width_mm - 2.0 * margin;
        let mut height = width / aspect_ratio;
        if height > max_height {
            height = max_height;
            width = height * aspect_ratio;
        }
        (width, height)
    }

    /// Phase 1: flow screenshots onto fixed-size pages.
    ///
    /// Pages are created only when the first image that needs one arrives, and
    /// each new page is stamped as it is created. An image that does not fit
    /// below the previous one starts a new page, unless it is the first image
    /// on its page.
    #[instrument(skip_all, fields(images = images.len()))]
    pub fn flow_screenshots(&self, document: &mut AssembledDocument, images: Vec<RasterImage>) {
        let page_size = self.settings.page;
        let margin = self.settings.margin_mm;
        let bottom = page_size.height_mm - margin;

        let mut current: Option<OutputPage> = None;
        let mut y = margin;
        let mut created = 0usize;

        for image in images {
            let (width, height) = self.fit_to_printable(image.aspect_ratio());

            let overflows = current
                .as_ref()
                .is_some_and(|page| !page.images.is_empty() && y + height > bottom);
            if overflows {
                if let Some(full) = current.take() {
                    document.push(full);
                }
            }

            let page = current.get_or_insert_with(|| {
                created += 1;
                y = margin;
                self.stamped_page(page_size, PageOrigin::Screenshots)
            });

            let placement = Placement {
                x_mm: (page_size.width_mm - width) / 2.0,
                y_mm: y,
                width_mm: width,
                height_mm: height,
            };
            debug!(
                x = placement.x_mm,
                y = placement.y_mm,
                width,
                height,
                "Screenshot placed"
            );
            page.images.push(PlacedImage { image, placement });
            y += height + self.settings.gap_mm;
        }

        if let Some(last) = current {
            document.push(last);
        }
        info!(pages = created, "Screenshots laid out");
    }

    /// Phase 2: one page per report page, sized to its native geometry.
    ///
    /// The raster fills the page edge to edge. Pages that already carry the
    /// brand mark in their raster are not stamped again.
    #[instrument(skip_all, fields(pages = pages.len()))]
    pub fn pass_through_reports(&self, document: &mut AssembledDocument, pages: Vec<PageDescriptor>) {
        for descriptor in pages {
            let origin = PageOrigin::Report {
                category: descriptor.category,
                page_number: descriptor.page_number,
            };
            let mut page = if descriptor.branded {
                OutputPage::new(descriptor.size, origin)
            } else {
                self.stamped_page(descriptor.size, origin)
            };

            page.images.push(PlacedImage {
                placement: Placement {
                    x_mm: 0.0,
                    y_mm: 0.0,
                    width_mm: descriptor.size.width_mm,
                    height_mm: descriptor.size.height_mm,
                },
                image: descriptor.image,
            });
            document.push(page);
        }
    }

    fn stamped_page(&self, size: PageSize, origin: PageOrigin) -> OutputPage {
        let mut page = OutputPage::new(size, origin);
        page.stamp = Some(self.stamper.placement(size));
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use befund_core::config::StampSettings;
    use image::{Rgba, RgbaImage};

    fn engine() -> LayoutEngine {
        LayoutEngine::new(
            LayoutSettings::default(),
            BrandStamper::new(&StampSettings::default()),
        )
    }

    fn image(width: u32, height: u32) -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_pixel(width, height, Rgba([1, 2, 3, 255])))
    }

    fn report_page(category: SourceCategory, number: u32) -> PageDescriptor {
        PageDescriptor {
            image: image(30, 42),
            size: PageSize::from_points(595.0, 842.0),
            category,
            page_number: number,
            branded: category == SourceCategory::CephalometricAnalysis,
        }
    }

    #[test]
    fn two_segmentation_crops_share_one_page() {
        let mut doc = AssembledDocument::new();
        engine().flow_screenshots(&mut doc, vec![image(1571, 807), image(1571, 807)]);

        assert_eq!(doc.page_count(), 1);
        let page = &doc.pages()[0];
        assert_eq!(page.images.len(), 2);
        assert!(page.stamp.is_some());

        let first = page.images[0].placement;
        let second = page.images[1].placement;
        assert!((first.width_mm - 190.0).abs() < 1e-3);
        assert!((first.height_mm - 190.0 / (1571.0 / 807.0)).abs() < 1e-3);
        assert!((first.y_mm - 10.0).abs() < 1e-6);
        assert!((second.y_mm - (10.0 + first.height_mm + 5.0)).abs() < 1e-3);
        assert!((first.x_mm - 10.0).abs() < 1e-3);
        assert!(second.bottom_mm() < 287.0);
    }

    #[test]
    fn third_crop_overflows_to_a_new_stamped_page() {
        let mut doc = AssembledDocument::new();
        engine().flow_screenshots(
            &mut doc,
            vec![image(1571, 807), image(1571, 807), image(1571, 807)],
        );

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages()[0].images.len(), 2);
        assert_eq!(doc.pages()[1].images.len(), 1);
        assert!(doc.pages().iter().all(|p| p.stamp.is_some()));
        assert!((doc.pages()[1].images[0].placement.y_mm - 10.0).abs() < 1e-6);
    }

    #[test]
    fn tall_image_is_clamped_and_centred() {
        let mut doc = AssembledDocument::new();
        engine().flow_screenshots(&mut doc, vec![image(100, 1000)]);

        let placed = doc.pages()[0].images[0].placement;
        assert!((placed.height_mm - 277.0).abs() < 1e-3);
        assert!((placed.width_mm - 27.7).abs() < 1e-3);
        assert!((placed.x_mm - (210.0 - 27.7) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn full_height_images_each_get_their_own_page() {
        let mut doc = AssembledDocument::new();
        engine().flow_screenshots(&mut doc, vec![image(100, 1000), image(100, 1000)]);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn placements_never_cross_bottom_margin() {
        let sizes = [(1571, 807), (1367, 852), (400, 900), (1000, 100), (300, 300), (1571, 807)];
        let images: Vec<RasterImage> = sizes.iter().cycle().take(25).map(|&(w, h)| image(w, h)).collect();

        let mut doc = AssembledDocument::new();
        engine().flow_screenshots(&mut doc, images);

        let placed: usize = doc.pages().iter().map(|p| p.images.len()).sum();
        assert_eq!(placed, 25);
        for page in doc.pages() {
            assert!(page.stamp.is_some());
            for img in &page.images {
                assert!(img.placement.y_mm >= 10.0 - 1e-4);
                assert!(img.placement.bottom_mm() <= 287.0 + 1e-3);
            }
        }
    }

    #[test]
    fn no_screenshots_creates_no_page() {
        let mut doc = AssembledDocument::new();
        engine().flow_screenshots(&mut doc, Vec::new());
        assert_eq!(doc.page_count(), 0);
        assert!(matches!(doc.seal(), Err(BefundError::EmptyInput)));
    }

    #[test]
    fn report_pages_pass_through_at_native_size() {
        let mut doc = AssembledDocument::new();
        engine().pass_through_reports(
            &mut doc,
            vec![
                report_page(SourceCategory::RadiologicalReport, 1),
                report_page(SourceCategory::CephalometricAnalysis, 1),
            ],
        );

        assert_eq!(doc.page_count(), 2);
        let radiology = &doc.pages()[0];
        assert_eq!(radiology.size, PageSize::from_points(595.0, 842.0));
        assert_eq!(radiology.images.len(), 1);
        assert_eq!(radiology.images[0].placement.x_mm, 0.0);
        assert_eq!(radiology.images[0].placement.width_mm, radiology.size.width_mm);
        assert!(radiology.stamp.is_some());

        let ceph = &doc.pages()[1];
        assert!(ceph.stamp.is_none());
        assert_eq!(
            ceph.origin,
            PageOrigin::Report {
                category: SourceCategory::CephalometricAnalysis,
                page_number: 1
            }
        );
    }

    #[test]
    fn screenshot_pages_precede_report_pages() {
        let engine = engine();
        let mut doc = AssembledDocument::new();
        engine.flow_screenshots(&mut doc, vec![image(1571, 807)]);
        engine.pass_through_reports(&mut doc, vec![report_page(SourceCategory::RadiologicalReport, 1)]);

        let sealed = doc.seal().unwrap();
        assert_eq!(sealed.page_count(), 2);
        assert_eq!(sealed.pages()[0].origin, PageOrigin::Screenshots);
        assert!(matches!(sealed.pages()[1].origin, PageOrigin::Report { .. }));
    }
}
