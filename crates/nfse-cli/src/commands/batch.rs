//! Batch processing command for multiple invoice files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use nfse_core::invoice::{ExtractionReport, NfseExtractor};
use nfse_core::models::invoice::Provenance;

use super::output::{OutputFormat, render, source_label};
use super::process::{build_extractor, extract_file};
use super::{load_config, parse_date};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching the PDF files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include provenance, matched rules and warnings in each output
    #[arg(long)]
    report: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue when a file cannot be read
    #[arg(long)]
    continue_on_error: bool,

    /// Date used for missing dates and placeholder records (DD/MM/YYYY)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    report: Option<ExtractionReport>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("pdf")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = Arc::new(build_extractor(&config, args.date));

    // Files run on the blocking pool, at most `jobs` at a time; results keep
    // the input order.
    let results: Vec<ProcessResult> = stream::iter(files)
        .map(|path| {
            let extractor = Arc::clone(&extractor);
            let pb = overall_pb.clone();
            async move {
                let result = process_single_file(path, extractor).await;
                pb.inc(1);
                result
            }
        })
        .buffered(args.jobs.max(1))
        .collect()
        .await;

    overall_pb.finish_with_message("Complete");

    if !args.continue_on_error {
        if let Some(failed) = results.iter().find(|r| r.error.is_some()) {
            let error_msg = failed.error.as_deref().unwrap_or("unknown error");
            error!("Failed to process {}: {}", failed.path.display(), error_msg);
            anyhow::bail!("Processing failed: {}", error_msg);
        }
    }

    if let Some(ref output_dir) = args.output_dir {
        for result in &results {
            if let Some(report) = &result.report {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, render(report, args.format, args.report)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let extracted = results
        .iter()
        .filter(|r| r.report.as_ref().is_some_and(|rep| !rep.is_fallback()))
        .count();
    let placeholders: Vec<_> = results
        .iter()
        .filter(|r| r.report.as_ref().is_some_and(|rep| rep.is_fallback()))
        .collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} extracted, {} placeholders, {} failed",
        style(extracted).green(),
        style(placeholders.len()).yellow(),
        style(failed.len()).red()
    );

    if !placeholders.is_empty() {
        println!();
        println!("{}", style("Placeholder records (review before saving):").yellow());
        for result in &placeholders {
            println!("  - {}", result.path.display());
        }
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(path: PathBuf, extractor: Arc<NfseExtractor>) -> ProcessResult {
    let file_start = Instant::now();
    let task_path = path.clone();
    let outcome =
        tokio::task::spawn_blocking(move || extract_file(&task_path, None, &extractor)).await;
    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    let (report, error) = match outcome {
        Ok(Ok(report)) => (Some(report), None),
        Ok(Err(e)) => {
            warn!("Failed to process {}: {}", path.display(), e);
            (None, Some(e.to_string()))
        }
        Err(e) => {
            warn!("Worker for {} did not finish: {}", path.display(), e);
            (None, Some(e.to_string()))
        }
    };

    ProcessResult {
        path,
        report,
        error,
        processing_time_ms,
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_number",
        "service_date",
        "amount",
        "payer_name",
        "description",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(report) = &result.report {
            let data = &report.data;
            let note = match &report.provenance {
                Provenance::Extracted => String::new(),
                Provenance::Fallback { reason } => reason.clone(),
            };
            wtr.write_record([
                filename,
                source_label(&report.provenance),
                &data.invoice_number,
                &data.service_date,
                &format!("{:.2}", data.amount),
                &data.payer_name,
                &data.description,
                &result.processing_time_ms.to_string(),
                &note,
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
