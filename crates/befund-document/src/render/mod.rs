// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Render module — PDF rasterization and per-category post-processing.

pub mod postprocess;
pub mod rasterize;
pub mod renderer;

pub use rasterize::{PageDescriptor, RasterJob, rasterize_document};
pub use renderer::{PageRenderer, PdfiumRenderer, RenderFailure, RenderedPage};
