//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use nfse_core::invoice::{ExtractionReport, NfseExtractor};
use nfse_core::models::config::NfseConfig;
use nfse_core::models::invoice::Provenance;
use nfse_core::pdf::DocumentInput;

use super::output::{OutputFormat, render};
use super::{load_config, parse_date};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include provenance, matched rules and warnings in the output
    #[arg(long)]
    report: bool,

    /// Declared media type, for files without a .pdf extension
    #[arg(long)]
    media_type: Option<String>,

    /// Date used for missing dates and placeholder records (DD/MM/YYYY)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting invoice data...");

    let extractor = build_extractor(&config, args.date);
    let path = args.input.clone();
    let media_type = args.media_type.clone();
    let report = tokio::task::spawn_blocking(move || {
        extract_file(&path, media_type.as_deref(), &extractor)
    })
    .await??;

    pb.finish_and_clear();

    print_diagnostics(&report);

    let output = render(&report, args.format, args.report)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Extractor for `config`, pinned to `date` when one is given.
pub fn build_extractor(config: &NfseConfig, date: Option<NaiveDate>) -> NfseExtractor {
    let extractor = NfseExtractor::from_config(config);
    match date {
        Some(date) => extractor.with_reference_date(date),
        None => extractor,
    }
}

/// Read a file from disk and run it through the extractor.
pub fn extract_file(
    path: &Path,
    media_type: Option<&str>,
    extractor: &NfseExtractor,
) -> anyhow::Result<ExtractionReport> {
    let data = fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let mut input = DocumentInput::new(name, &data);
    if let Some(media_type) = media_type {
        input = input.with_media_type(media_type);
    }

    Ok(extractor.extract_with_report(&input))
}

/// Tell the user on stderr which values need a manual check.
fn print_diagnostics(report: &ExtractionReport) {
    if let Provenance::Fallback { reason } = &report.provenance {
        eprintln!(
            "{} Could not read the document ({}). All values are placeholders, review before saving.",
            style("⚠").yellow(),
            reason
        );
        return;
    }

    let missing = report.data.missing_fields();
    if !missing.is_empty() {
        eprintln!(
            "{} Not found in the document: {}",
            style("⚠").yellow(),
            missing.join(", ")
        );
    }
}
