// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Befund document assembler.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{BrandOverlay, FooterRedaction};
use crate::error::{BefundError, Result};

/// Millimetres per PDF point.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

/// Closed classification of an input item.
///
/// Declaration order is processing order: screenshot categories first, then
/// report categories. Maps keyed by `SourceCategory` iterate in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceCategory {
    /// Segmentation report screenshots from the CBCT viewer.
    SegmentationScreenshot,
    /// Intraoral scan screenshots from the scan viewer.
    IntraoralScan,
    /// Radiological report PDF.
    RadiologicalReport,
    /// Cephalometric analysis PDF.
    CephalometricAnalysis,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 4] = [
        Self::SegmentationScreenshot,
        Self::IntraoralScan,
        Self::RadiologicalReport,
        Self::CephalometricAnalysis,
    ];

    /// Human-readable label shown next to the input list.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SegmentationScreenshot => "Segmentation report (screenshots)",
            Self::IntraoralScan => "Intraoral scans (screenshots)",
            Self::RadiologicalReport => "Radiological report (PDF)",
            Self::CephalometricAnalysis => "Cephalometric analysis (PDF)",
        }
    }

    /// Kebab-case key used on the command line and in config files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SegmentationScreenshot => "segmentation-screenshot",
            Self::IntraoralScan => "intraoral-scan",
            Self::RadiologicalReport => "radiological-report",
            Self::CephalometricAnalysis => "cephalometric-analysis",
        }
    }

    /// Whether items of this category are screenshots (cropped) rather than
    /// paginated reports (rasterized).
    pub fn is_screenshot(&self) -> bool {
        matches!(self, Self::SegmentationScreenshot | Self::IntraoralScan)
    }
}

impl std::fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for SourceCategory {
    type Err = BefundError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == s)
            .ok_or_else(|| BefundError::Configuration(format!("unknown source category: {s}")))
    }
}

/// Rectangle in source-pixel units selecting the region of interest of a
/// screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region with zero extent is a configuration defect.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(BefundError::Configuration(format!(
                "crop region {}x{} at ({}, {}) has zero extent",
                self.width, self.height, self.x, self.y
            )));
        }
        Ok(())
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Post-processing applied to a rasterized report page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostProcess {
    /// Leave the page as rendered.
    Identity,
    /// Paint the footer band white.
    FooterRedaction(FooterRedaction),
    /// Bake the brand mark into the page, then rotate it a quarter turn.
    OverlayAndRotate(BrandOverlay),
}

impl PostProcess {
    /// Whether the page already carries the brand mark after processing.
    pub fn embeds_brand_mark(&self) -> bool {
        matches!(self, Self::OverlayAndRotate(_))
    }

    /// Whether the native width and height are swapped by this step.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::OverlayAndRotate(_))
    }
}

/// How items of a category are turned into raster images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Handling {
    /// Crop a single screenshot to a fixed region.
    Crop(CropRegion),
    /// Rasterize every page of a PDF and post-process it.
    Rasterize(PostProcess),
}

/// Page geometry in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// Convert a native point-based size to millimetres.
    pub fn from_points(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_mm: width_pt * PT_TO_MM,
            height_mm: height_pt * PT_TO_MM,
        }
    }

    /// The same page turned a quarter turn.
    pub fn swapped(self) -> Self {
        Self {
            width_mm: self.height_mm,
            height_mm: self.width_mm,
        }
    }
}

/// One item handed over by the input boundary: a display name plus its bytes.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub data: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Read a file from disk, using its file name as the display name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, data })
    }
}

/// Ordered input lists per category.
pub type AssemblyInputs = BTreeMap<SourceCategory, Vec<InputFile>>;

/// Total number of items across all categories.
pub fn input_count(inputs: &AssemblyInputs) -> usize {
    inputs.values().map(Vec::len).sum()
}

/// Lifecycle of an assembly session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    /// Nothing submitted yet, or reset.
    Idle,
    /// Assembly in progress.
    Processing,
    /// A document is available.
    Success,
    /// The last run failed; the error message is available.
    Error,
}
