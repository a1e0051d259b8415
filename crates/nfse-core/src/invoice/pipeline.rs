//! Document-to-record extraction with a fallback boundary.

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{NfseError, Result};
use crate::models::config::NfseConfig;
use crate::models::invoice::{ExtractedInvoiceData, Provenance};
use crate::pdf::{DocumentInput, DocumentTextReader};

use super::InvoiceExtractor;
use super::fallback::FallbackSynthesizer;
use super::parser::{ExtractionResult, FieldMatch, InvoiceParser, NfseParser};
use super::rules::PatternSet;

/// Where a single extraction currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ReadingText,
    ExtractingFields,
    Normalizing,
    Fallback,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ReadingText => "reading_text",
            Stage::ExtractingFields => "extracting_fields",
            Stage::Normalizing => "normalizing",
            Stage::Fallback => "fallback",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// A record together with how it was obtained.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub data: ExtractedInvoiceData,
    pub provenance: Provenance,
    pub matches: Vec<FieldMatch>,
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    pub fn is_fallback(&self) -> bool {
        self.provenance.is_fallback()
    }
}

/// Reads an uploaded document and returns its invoice record.
///
/// [`extract`](Self::extract) never fails: when the document has no text
/// layer, cannot be parsed, or no field matches, the record is synthesized
/// from the file name and size instead. Shareable across threads.
#[derive(Debug, Clone, Default)]
pub struct NfseExtractor {
    reader: DocumentTextReader,
    parser: NfseParser,
    fallback: FallbackSynthesizer,
}

impl NfseExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor from configuration.
    pub fn from_config(config: &NfseConfig) -> Self {
        Self {
            reader: DocumentTextReader::new(config.pdf.clone())
                .with_media_type_check(config.extraction.accept_media_type),
            parser: NfseParser::new(),
            fallback: FallbackSynthesizer::new(config.fallback.clone()),
        }
    }

    /// Replace the field rules.
    pub fn with_patterns(mut self, patterns: Arc<PatternSet>) -> Self {
        self.parser = self.parser.with_patterns(patterns);
        self
    }

    /// Fix "today" for missing dates and fallback records.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.parser = self.parser.with_reference_date(date);
        self
    }

    /// Extract a record, falling back to a placeholder on any failure.
    pub fn extract(&self, input: &DocumentInput<'_>) -> ExtractedInvoiceData {
        self.extract_with_report(input).data
    }

    /// Like [`extract`](Self::extract), also reporting which path was taken.
    pub fn extract_with_report(&self, input: &DocumentInput<'_>) -> ExtractionReport {
        enter(Stage::Idle, input.name);

        let outcome = catch_unwind(AssertUnwindSafe(|| self.run(input)))
            .unwrap_or_else(|payload| Err(NfseError::Aborted(panic_message(payload.as_ref()))));

        let report = match outcome {
            Ok(result) => {
                info!(
                    name = input.name,
                    matched = result.matches.len(),
                    "Invoice extracted"
                );
                ExtractionReport {
                    data: result.data,
                    provenance: Provenance::Extracted,
                    matches: result.matches,
                    warnings: result.warnings,
                }
            }
            Err(e) => self.fall_back(input, e),
        };

        enter(Stage::Done, input.name);
        report
    }

    fn run(&self, input: &DocumentInput<'_>) -> Result<ExtractionResult> {
        enter(Stage::ReadingText, input.name);
        let text = self.reader.read(input)?;

        enter(Stage::ExtractingFields, input.name);
        let matches = self.parser.match_fields(&text)?;

        enter(Stage::Normalizing, input.name);
        Ok(self.parser.finish(&matches))
    }

    fn fall_back(&self, input: &DocumentInput<'_>, cause: NfseError) -> ExtractionReport {
        enter(Stage::Fallback, input.name);
        warn!(name = input.name, size = input.size, error = %cause, "Fallback engaged");

        let data = self
            .fallback
            .synthesize(input.name, input.size, self.parser.today());
        let reason = cause.to_string();

        ExtractionReport {
            data,
            provenance: Provenance::Fallback {
                reason: reason.clone(),
            },
            matches: Vec::new(),
            warnings: vec![format!("Placeholder record: {reason}")],
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic without message".to_string())
}

fn enter(stage: Stage, name: &str) {
    debug!(%stage, name, "Extraction stage");
}

impl InvoiceExtractor for NfseExtractor {
    fn extract(&self, input: &DocumentInput<'_>) -> ExtractedInvoiceData {
        NfseExtractor::extract(self, input)
    }

    fn extract_from_text(&self, text: &str) -> super::Result<ExtractedInvoiceData> {
        self.parser.parse(text).map(|r| r.data)
    }
}
