// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Befund — clinic document assembler
//
// Entry point. Initialises logging, loads configuration, binds the PDF
// renderer once, and runs one assembly over the files named on the command
// line.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use befund_core::error::Result;
use befund_core::human_errors::humanize_error;
use befund_core::{AssemblyConfig, AssemblyInputs, InputFile, SourceCategory};
use befund_document::{Assembler, AssemblySession, BrandMark, PdfReader, PdfiumRenderer};

/// Assemble screenshots and imaging reports into one branded PDF.
#[derive(Debug, Parser)]
#[command(name = "befund", version, about)]
struct Args {
    /// Segmentation screenshot (PNG/JPEG). Repeat for several.
    #[arg(long = "segmentation", value_name = "FILE")]
    segmentation: Vec<PathBuf>,

    /// Intraoral scan screenshot (PNG/JPEG). Repeat for several.
    #[arg(long = "scan", value_name = "FILE")]
    scan: Vec<PathBuf>,

    /// Radiological report PDF. Repeat for several.
    #[arg(long = "radiological", value_name = "FILE")]
    radiological: Vec<PathBuf>,

    /// Cephalometric analysis PDF. Repeat for several.
    #[arg(long = "cephalometric", value_name = "FILE")]
    cephalometric: Vec<PathBuf>,

    /// JSON configuration file. Missing keys use built-in defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Brand mark image, overriding the configured one.
    #[arg(long, value_name = "FILE")]
    brand_mark: Option<PathBuf>,

    /// Directory containing the libpdfium shared library.
    #[arg(long, value_name = "DIR")]
    pdfium_dir: Option<PathBuf>,

    /// Where to write the PDF. Defaults to the configured file name.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

impl Args {
    fn inputs(&self) -> Result<AssemblyInputs> {
        let groups = [
            (SourceCategory::SegmentationScreenshot, &self.segmentation),
            (SourceCategory::IntraoralScan, &self.scan),
            (SourceCategory::RadiologicalReport, &self.radiological),
            (SourceCategory::CephalometricAnalysis, &self.cephalometric),
        ];

        let mut inputs = AssemblyInputs::new();
        for (category, paths) in groups {
            if paths.is_empty() {
                continue;
            }
            let files = paths
                .iter()
                .map(InputFile::from_path)
                .collect::<Result<Vec<_>>>()?;
            inputs.insert(category, files);
        }
        Ok(inputs)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Befund starting");

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let human = humanize_error(&err);
            tracing::error!(error = %err, "assembly failed");
            eprintln!("{}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AssemblyConfig::load(path)?,
        None => AssemblyConfig::default(),
    };
    if let Some(path) = &args.brand_mark {
        config.brand.mark_path = Some(path.clone());
    }

    let inputs = args.inputs()?;
    for (category, files) in &inputs {
        println!("{}: {} file(s)", category.label(), files.len());
    }

    let mark = BrandMark::from_config(config.brand.mark_path.as_deref())?;
    let renderer = Arc::new(PdfiumRenderer::init(args.pdfium_dir.as_deref())?);
    let mut session = AssemblySession::new(Assembler::new(config, renderer, mark)?);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&session.assembler().config().output.file_name));

    let handle = session.process(inputs).await?;
    session.assembler().store().write_to(&handle, &output)?;

    let reader = PdfReader::open(&output)?;
    println!(
        "Wrote {} ({} pages, {} bytes, sha256 {})",
        reader.name(),
        reader.page_count(),
        handle.size,
        handle.digest
    );
    for (index, size) in reader.page_sizes()?.iter().enumerate() {
        println!("  page {}: {:.1} x {:.1} mm", index + 1, size.width_mm, size.height_mm);
    }

    session.reset();
    Ok(())
}
