//! Core library for NFS-e (Brazilian service invoice) data extraction.
//!
//! This crate provides:
//! - PDF text reading (lopdf, optionally pdf-extract)
//! - Ordered, labeled-first regex rules for the invoice number, service date,
//!   description, amount and payer name
//! - Brazilian amount and name normalization
//! - A placeholder record built from the file name and size whenever the
//!   document yields nothing usable

pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use error::{ExtractionError, NfseError, PdfError, Result};
pub use invoice::rules::{Field, MatchRule, PatternSet, RuleKind};
pub use invoice::{
    ExtractionReport, FallbackSynthesizer, InvoiceExtractor, InvoiceParser, NfseExtractor,
    NfseParser,
};
pub use models::config::NfseConfig;
pub use models::invoice::{ExtractedInvoiceData, Provenance};
pub use pdf::{DocumentInput, DocumentTextReader, PdfProcessor};
