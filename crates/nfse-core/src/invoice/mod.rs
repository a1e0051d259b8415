//! Invoice field extraction module.

mod fallback;
mod parser;
mod pipeline;
pub mod rules;

pub use fallback::{FallbackSynthesizer, name_hash, placeholder_number};
pub use parser::{ExtractionResult, FieldMatch, FieldMatches, InvoiceParser, NfseParser, normalize};
pub use pipeline::{ExtractionReport, NfseExtractor, Stage};

use crate::error::ExtractionError;
use crate::models::invoice::ExtractedInvoiceData;
use crate::pdf::DocumentInput;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for invoice extractors.
pub trait InvoiceExtractor {
    /// Extract invoice data from an uploaded document. Always yields a record.
    fn extract(&self, input: &DocumentInput<'_>) -> ExtractedInvoiceData;

    /// Extract invoice data from plain text.
    fn extract_from_text(&self, text: &str) -> Result<ExtractedInvoiceData>;
}
