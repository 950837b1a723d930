// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — raster buffers, screenshot cropping, and the brand mark.

pub mod brand;
pub mod crop;
pub mod raster;

pub use brand::{BrandMark, BrandStamper, Placement};
pub use crop::crop_screenshot;
pub use raster::RasterImage;
