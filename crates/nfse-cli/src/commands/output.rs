//! Rendering of extracted records.

use nfse_core::invoice::ExtractionReport;
use nfse_core::invoice::rules::format_brl_amount;
use nfse_core::models::invoice::{ExtractedInvoiceData, Provenance};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Render a report; with `full` the provenance, matched rules and warnings
/// are included.
pub fn render(report: &ExtractionReport, format: OutputFormat, full: bool) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if full => Ok(serde_json::to_string(report)?),
        OutputFormat::Json => Ok(serde_json::to_string(&report.data)?),
        OutputFormat::Csv => format_csv(report, full),
        OutputFormat::Text => Ok(format_text(report, full)),
    }
}

/// `extracted`, or `fallback` for placeholder records.
pub fn source_label(provenance: &Provenance) -> &'static str {
    match provenance {
        Provenance::Extracted => "extracted",
        Provenance::Fallback { .. } => "fallback",
    }
}

fn format_csv(report: &ExtractionReport, full: bool) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let data = &report.data;

    let mut header = vec![
        "invoice_number",
        "service_date",
        "description",
        "amount",
        "payer_name",
    ];
    if full {
        header.push("source");
    }
    wtr.write_record(&header)?;

    let amount = format!("{:.2}", data.amount);
    let mut row = vec![
        data.invoice_number.as_str(),
        data.service_date.as_str(),
        data.description.as_str(),
        amount.as_str(),
        data.payer_name.as_str(),
    ];
    if full {
        row.push(source_label(&report.provenance));
    }
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ExtractionReport, full: bool) -> String {
    let data: &ExtractedInvoiceData = &report.data;
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", data.invoice_number));
    output.push_str(&format!("Date: {}\n", data.service_date));
    output.push_str(&format!("Payer: {}\n", data.payer_name));
    output.push_str(&format!("Amount: R$ {}\n", format_brl_amount(data.amount)));
    output.push_str(&format!("Description: {}\n", data.description));

    if !full {
        return output;
    }

    output.push('\n');
    match &report.provenance {
        Provenance::Extracted => output.push_str("Source: extracted\n"),
        Provenance::Fallback { reason } => {
            output.push_str(&format!("Source: fallback ({})\n", reason))
        }
    }
    if !report.matches.is_empty() {
        output.push_str("Matches:\n");
        for m in &report.matches {
            output.push_str(&format!(
                "  {:<14} {} ({:?}, {:.2})",
                m.field.as_str(),
                m.rule,
                m.kind,
                m.confidence
            ));
            if let Some((start, end)) = m.span {
                output.push_str(&format!(" at {}..{}", start, end));
            }
            output.push('\n');
        }
    }
    if !report.warnings.is_empty() {
        output.push_str("Warnings:\n");
        for warning in &report.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }

    output
}
