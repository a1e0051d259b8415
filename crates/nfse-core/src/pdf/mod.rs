//! PDF processing module.

mod extractor;
#[cfg(feature = "pdf-extract")]
mod paged;
mod reader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::PdfExtractor;
#[cfg(feature = "pdf-extract")]
pub use paged::PagedTextExtractor;
pub use reader::DocumentTextReader;

use crate::error::PdfError;

/// Media type that marks an upload as PDF.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text backends.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

/// An uploaded document as handed over by the UI layer.
#[derive(Debug, Clone, Copy)]
pub struct DocumentInput<'a> {
    /// Declared file name.
    pub name: &'a str,
    /// Declared media type, if the upload control reported one.
    pub media_type: Option<&'a str>,
    /// Raw document bytes.
    pub data: &'a [u8],
    /// Byte length; only the fallback record uses it.
    pub size: u64,
}

impl<'a> DocumentInput<'a> {
    /// Create an input whose size is the payload length.
    pub fn new(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            media_type: None,
            data,
            size: data.len() as u64,
        }
    }

    /// Set the declared media type.
    pub fn with_media_type(mut self, media_type: &'a str) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// Override the byte length with the size declared by the upload.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Whether the name (or, if allowed, the media type) says PDF.
    pub fn looks_like_pdf(&self, accept_media_type: bool) -> bool {
        let by_name = self.name.trim().to_lowercase().ends_with(".pdf");
        let by_type = accept_media_type
            && self
                .media_type
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE));
        by_name || by_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_pdf() {
        assert!(DocumentInput::new("nota.PDF", b"").looks_like_pdf(false));
        assert!(!DocumentInput::new("nota.png", b"").looks_like_pdf(true));

        let typed = DocumentInput::new("upload", b"").with_media_type("Application/PDF");
        assert!(typed.looks_like_pdf(true));
        assert!(!typed.looks_like_pdf(false));
    }

    #[test]
    fn test_size_defaults_to_payload_length() {
        let input = DocumentInput::new("a.pdf", b"12345");
        assert_eq!(input.size, 5);
        assert_eq!(input.with_size(53_664).size, 53_664);
    }
}
