// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterizer — renders a report PDF into page descriptors.
//
// Rendering happens once per document on the blocking pool; the pages then
// fan out to one post-processing task each and are joined back into
// ascending page-number order. Any failure rejects the whole document, but
// only after every sibling task has finished.

use std::sync::Arc;

use befund_core::error::{BefundError, Result};
use befund_core::types::{InputFile, PageSize, PostProcess, SourceCategory};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, instrument};

use super::postprocess;
use super::renderer::{PageRenderer, RenderedPage};
use crate::image::brand::BrandMark;
use crate::image::raster::RasterImage;

/// A rasterized, post-processed report page ready for layout.
#[derive(Debug, Clone)]
pub struct PageDescriptor {
    /// Oversampled pixels.
    pub image: RasterImage,
    /// Physical page size in millimetres, from the native (1x) page size.
    pub size: PageSize,
    pub category: SourceCategory,
    /// 1-based page number within the source document.
    pub page_number: u32,
    /// The brand mark is already part of the raster.
    pub branded: bool,
}

/// Everything a rasterization run needs besides the document itself.
#[derive(Clone)]
pub struct RasterJob {
    pub renderer: Arc<dyn PageRenderer>,
    pub mark: Arc<BrandMark>,
    pub oversampling: f32,
}

/// Convert a join failure into an assembly error.
pub(crate) fn task_error(err: JoinError) -> BefundError {
    BefundError::Task(err.to_string())
}

/// Wait for every task, then return the outputs sorted by their key.
///
/// Tasks are never cancelled. If any failed, the error of the lowest key is
/// returned, so the reported failure does not depend on completion order.
pub(crate) async fn join_in_order<T: Send + 'static>(
    mut tasks: JoinSet<(usize, Result<T>)>,
) -> Result<Vec<T>> {
    let mut finished = Vec::with_capacity(tasks.len());
    let mut panicked = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(item) => finished.push(item),
            Err(err) => {
                panicked.get_or_insert(task_error(err));
            }
        }
    }
    if let Some(err) = panicked {
        return Err(err);
    }

    finished.sort_by_key(|(key, _)| *key);
    finished.into_iter().map(|(_, result)| result).collect()
}

/// Rasterize every page of `file` and post-process it with `step`.
///
/// Returns one descriptor per page in ascending page-number order. Open or
/// render failures are reported against the file's display name and no page
/// of the document is returned.
#[instrument(skip(job, file), fields(name = %file.name, category = %category))]
pub async fn rasterize_document(
    job: RasterJob,
    file: InputFile,
    category: SourceCategory,
    step: PostProcess,
) -> Result<Vec<PageDescriptor>> {
    let name = file.name.clone();
    let renderer = Arc::clone(&job.renderer);
    let scale = job.oversampling;

    let rendered = tokio::task::spawn_blocking(move || renderer.render_pages(&file.data, scale))
        .await
        .map_err(task_error)?
        .map_err(|failure| failure.into_error(&name))?;

    info!(pages = rendered.len(), "Document rendered");

    let mut tasks = JoinSet::new();
    for page in rendered {
        let name = name.clone();
        let mark = Arc::clone(&job.mark);
        let number = page.number as usize;
        tasks.spawn_blocking(move || {
            (number, finish_page(page, category, step, scale, &mark, &name))
        });
    }

    join_in_order(tasks).await
}

/// Flatten one rendered page onto white, post-process it and record its
/// native size.
fn finish_page(
    page: RenderedPage,
    category: SourceCategory,
    step: PostProcess,
    scale: f32,
    mark: &BrandMark,
    name: &str,
) -> Result<PageDescriptor> {
    let surface = RasterImage::from_rgba(page.pixels).flatten_on_white(name)?;
    let image = postprocess::apply(step, surface, scale, mark);

    let native = PageSize::from_points(page.native_width_pt, page.native_height_pt);
    let size = if step.swaps_axes() { native.swapped() } else { native };

    debug!(
        page = page.number,
        width_mm = size.width_mm,
        height_mm = size.height_mm,
        "Page finished"
    );

    Ok(PageDescriptor {
        image,
        size,
        category,
        page_number: page.number,
        branded: step.embeds_brand_mark(),
    })
}
