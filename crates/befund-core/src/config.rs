// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembly configuration.
//
// Every constant the pipeline depends on lives here so that a source layout
// change is a config edit rather than a code change. The defaults reproduce
// the layouts of the clinic's current reporting tools.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BefundError, Result};
use crate::types::{CropRegion, Handling, PageSize, PostProcess, SourceCategory};

/// Complete configuration for one assembler instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub crop: CropSettings,
    pub raster: RasterSettings,
    pub redaction: FooterRedaction,
    pub overlay: BrandOverlay,
    pub layout: LayoutSettings,
    pub stamp: StampSettings,
    pub brand: BrandSettings,
    pub output: OutputSettings,
}

/// Screenshot regions of interest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CropSettings {
    pub segmentation: CropRegion,
    pub intraoral_scan: CropRegion,
    /// Corner radius of the rounded clip, in output pixels.
    pub corner_radius_px: f32,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            segmentation: CropRegion::new(326, 202, 1571, 807),
            intraoral_scan: CropRegion::new(475, 179, 1367, 852),
            corner_radius_px: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Linear oversampling factor applied when rendering report pages.
    pub oversampling: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self { oversampling: 3.0 }
    }
}

/// Footer band painted white on radiological report pages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterRedaction {
    /// Band height in native points, measured from the bottom edge.
    pub band_height_pt: f32,
}

impl Default for FooterRedaction {
    fn default() -> Self {
        Self {
            band_height_pt: 70.0,
        }
    }
}

/// Brand mark baked into cephalometric analysis pages, in native points.
///
/// The mark sits on a white backdrop that covers the vendor logo. The
/// backdrop starts at the mark's left edge, is raised above it and extends
/// past it to the right and below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandOverlay {
    pub logo_width_pt: f32,
    pub offset_x_pt: f32,
    pub offset_y_pt: f32,
    pub backdrop_extra_width_pt: f32,
    pub backdrop_extra_height_pt: f32,
    pub backdrop_raise_pt: f32,
}

impl Default for BrandOverlay {
    fn default() -> Self {
        Self {
            logo_width_pt: 110.0,
            offset_x_pt: 65.0 / 3.0,
            offset_y_pt: 65.0 / 3.0 + 4.0,
            backdrop_extra_width_pt: 10.0,
            backdrop_extra_height_pt: 20.0,
            backdrop_raise_pt: 10.0,
        }
    }
}

/// Screenshot flow-layout geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub page: PageSize,
    pub margin_mm: f32,
    pub gap_mm: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            margin_mm: 10.0,
            gap_mm: 5.0,
        }
    }
}

/// Placement of the brand stamp on output pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StampSettings {
    pub width_mm: f32,
    pub margin_mm: f32,
}

impl Default for StampSettings {
    fn default() -> Self {
        Self {
            width_mm: 40.0,
            margin_mm: 10.0,
        }
    }
}

/// Source of the brand mark image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandSettings {
    /// PNG or JPEG file. When unset a generated mark is used.
    pub mark_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Title embedded in the PDF metadata.
    pub title: String,
    /// Suggested file name for downloads.
    pub file_name: String,
    /// Re-parse the encoded PDF before publishing it.
    pub verify: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            title: "Clinical report".into(),
            file_name: "processed_document.pdf".into(),
            verify: true,
        }
    }
}

impl AssemblyConfig {
    /// Read a JSON config file. Missing keys fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the per-category handling.
    pub fn handling(&self, category: SourceCategory) -> Handling {
        match category {
            SourceCategory::SegmentationScreenshot => Handling::Crop(self.crop.segmentation),
            SourceCategory::IntraoralScan => Handling::Crop(self.crop.intraoral_scan),
            SourceCategory::RadiologicalReport => {
                Handling::Rasterize(PostProcess::FooterRedaction(self.redaction))
            }
            SourceCategory::CephalometricAnalysis => {
                Handling::Rasterize(PostProcess::OverlayAndRotate(self.overlay))
            }
        }
    }

    /// Fail fast on values that indicate a defect rather than bad input.
    pub fn validate(&self) -> Result<()> {
        self.crop.segmentation.validate()?;
        self.crop.intraoral_scan.validate()?;
        if self.crop.corner_radius_px < 0.0 {
            return Err(invalid("corner radius must not be negative"));
        }
        if !(self.raster.oversampling > 0.0) {
            return Err(invalid("oversampling factor must be positive"));
        }
        if self.redaction.band_height_pt < 0.0 {
            return Err(invalid("footer band height must not be negative"));
        }
        if !(self.overlay.logo_width_pt > 0.0) {
            return Err(invalid("overlay logo width must be positive"));
        }

        let layout = &self.layout;
        if layout.margin_mm < 0.0 || layout.gap_mm < 0.0 {
            return Err(invalid("layout margin and gap must not be negative"));
        }
        if layout.page.width_mm <= 2.0 * layout.margin_mm
            || layout.page.height_mm <= 2.0 * layout.margin_mm
        {
            return Err(invalid("page has no printable area inside its margins"));
        }

        if !(self.stamp.width_mm > 0.0) || self.stamp.margin_mm < 0.0 {
            return Err(invalid("stamp width must be positive and margin non-negative"));
        }
        if self.output.file_name.trim().is_empty() {
            return Err(invalid("output file name must not be empty"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> BefundError {
    BefundError::Configuration(reason.to_string())
}
