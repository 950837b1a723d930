// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Assembler — runs the whole pipeline from categorised inputs to PDF bytes.
//
// Screenshot crops and report rasterizations run concurrently. Results are
// joined back into submission order before layout, so the output never
// depends on which task finished first. Any failure fails the run once every
// task has finished; no partial document is produced.

use std::sync::Arc;

use befund_core::config::AssemblyConfig;
use befund_core::error::{BefundError, Result};
use befund_core::types::{
    AssemblyInputs, CropRegion, Handling, InputFile, PostProcess, SourceCategory, input_count,
};
use tokio::task::JoinSet;
use tracing::{info, instrument};

use crate::image::brand::{BrandMark, BrandStamper};
use crate::image::crop::crop_screenshot;
use crate::image::raster::RasterImage;
use crate::layout::{AssembledDocument, LayoutEngine, SealedDocument};
use crate::pdf::writer::PdfWriter;
use crate::render::rasterize::{
    PageDescriptor, RasterJob, join_in_order, rasterize_document, task_error,
};
use crate::render::renderer::PageRenderer;
use crate::store::{DocumentHandle, DocumentStore};

type CropItem = (CropRegion, InputFile);
type ReportItem = (SourceCategory, PostProcess, InputFile);

/// Shared assembly pipeline. Cheap to clone.
#[derive(Clone)]
pub struct Assembler {
    config: Arc<AssemblyConfig>,
    renderer: Arc<dyn PageRenderer>,
    mark: Arc<BrandMark>,
    store: DocumentStore,
}

impl Assembler {
    /// Build an assembler, rejecting invalid configuration up front.
    pub fn new(
        config: AssemblyConfig,
        renderer: Arc<dyn PageRenderer>,
        mark: BrandMark,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            renderer,
            mark: Arc::new(mark),
            store: DocumentStore::new(),
        })
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Store that [`Assembler::assemble`] publishes into.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Assemble `inputs` and publish the result under a new handle.
    pub async fn assemble(&self, inputs: AssemblyInputs) -> Result<DocumentHandle> {
        let bytes = self.build(inputs).await?;
        Ok(self.store.insert(bytes, self.config.output.file_name.clone()))
    }

    /// Assemble `inputs` into PDF bytes.
    pub async fn build(&self, inputs: AssemblyInputs) -> Result<Vec<u8>> {
        let sealed = self.compose(inputs).await?;
        let writer = PdfWriter::new(&self.config.output);
        let mark = Arc::clone(&self.mark);
        tokio::task::spawn_blocking(move || writer.encode(sealed, &mark))
            .await
            .map_err(task_error)?
    }

    /// Crop, rasterize and lay out `inputs` without encoding.
    ///
    /// Screenshot pages come first, then report pages, each group in category
    /// order and then submission order.
    #[instrument(skip_all, fields(items = input_count(&inputs)))]
    pub async fn compose(&self, inputs: AssemblyInputs) -> Result<SealedDocument> {
        if input_count(&inputs) == 0 {
            return Err(BefundError::EmptyInput);
        }

        let mut crops: Vec<CropItem> = Vec::new();
        let mut reports: Vec<ReportItem> = Vec::new();
        for (category, files) in inputs {
            match self.config.handling(category) {
                Handling::Crop(region) => crops.extend(files.into_iter().map(|f| (region, f))),
                Handling::Rasterize(step) => {
                    reports.extend(files.into_iter().map(|f| (category, step, f)))
                }
            }
        }
        info!(screenshots = crops.len(), reports = reports.len(), "Starting assembly");

        let (screenshots, report_pages) =
            tokio::join!(self.crop_all(crops), self.rasterize_all(reports));
        let (screenshots, report_pages) = (screenshots?, report_pages?);

        let engine = LayoutEngine::new(
            self.config.layout.clone(),
            BrandStamper::new(&self.config.stamp),
        );
        let mut document = AssembledDocument::new();
        engine.flow_screenshots(&mut document, screenshots);
        engine.pass_through_reports(&mut document, report_pages);
        document.seal()
    }

    // -- Stages ---------------------------------------------------------------

    async fn crop_all(&self, items: Vec<CropItem>) -> Result<Vec<RasterImage>> {
        let radius = self.config.crop.corner_radius_px;
        let mut tasks = JoinSet::new();
        for (index, (region, file)) in items.into_iter().enumerate() {
            tasks.spawn_blocking(move || (index, crop_screenshot(&file, region, radius)));
        }
        join_in_order(tasks).await
    }

    async fn rasterize_all(&self, items: Vec<ReportItem>) -> Result<Vec<PageDescriptor>> {
        let job = RasterJob {
            renderer: Arc::clone(&self.renderer),
            mark: Arc::clone(&self.mark),
            oversampling: self.config.raster.oversampling,
        };

        let mut tasks = JoinSet::new();
        for (index, (category, step, file)) in items.into_iter().enumerate() {
            let job = job.clone();
            tasks.spawn(async move { (index, rasterize_document(job, file, category, step).await) });
        }

        let documents = join_in_order(tasks).await?;
        Ok(documents.into_iter().flatten().collect())
    }
}
