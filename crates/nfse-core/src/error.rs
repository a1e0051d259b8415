//! Error types for the nfse-core library.

use thiserror::Error;

/// Main error type for the nfse library.
#[derive(Error, Debug)]
pub enum NfseError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// A stage panicked; the message is the panic payload when it is text.
    #[error("extraction aborted: {0}")]
    Aborted(String),
}

/// Errors related to reading text out of a PDF.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Neither the file name nor the declared media type says PDF.
    #[error("not a PDF document: {0}")]
    Format(String),

    /// No page produced any text (image-only or corrupted document).
    #[error("no text could be recovered from the document")]
    EmptyText,

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and the empty password does not open it.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Text could not be read from a single page.
    #[error("failed to read text from page {page}: {reason}")]
    PageText { page: u32, reason: String },
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Not a single field matched any rule.
    #[error("no invoice data found")]
    NoData,

    /// Failed to parse a value.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Result type for the nfse library.
pub type Result<T> = std::result::Result<T, NfseError>;
