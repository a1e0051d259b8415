//! Flattens a PDF into a single reading-order string.

use tracing::{debug, info, warn};

use super::{DocumentInput, PdfExtractor, PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::{PdfConfig, TextBackend};

/// Reads every page of a document into one normalized string.
///
/// Each page contributes its text fragments joined by single spaces, followed
/// by a newline. Pages are visited in ascending order; a page that fails to
/// decode is logged and skipped.
#[derive(Debug, Clone)]
pub struct DocumentTextReader {
    config: PdfConfig,
    accept_media_type: bool,
}

impl DocumentTextReader {
    pub fn new(config: PdfConfig) -> Self {
        Self {
            config,
            accept_media_type: true,
        }
    }

    /// Whether a declared `application/pdf` type counts when the name lacks `.pdf`.
    pub fn with_media_type_check(mut self, accept: bool) -> Self {
        self.accept_media_type = accept;
        self
    }

    /// Fail with [`PdfError::Format`] unless the input is declared as PDF.
    pub fn check_format(&self, input: &DocumentInput<'_>) -> Result<()> {
        if input.looks_like_pdf(self.accept_media_type) {
            Ok(())
        } else {
            Err(PdfError::Format(format!(
                "{} ({})",
                input.name,
                input.media_type.unwrap_or("no media type")
            )))
        }
    }

    /// Read the whole document text using the configured backend.
    pub fn read(&self, input: &DocumentInput<'_>) -> Result<String> {
        self.check_format(input)?;

        let mut processor = self.processor();
        processor.load(input.data)?;
        info!(
            name = input.name,
            pages = processor.page_count(),
            "Document opened"
        );

        self.read_pages(processor.as_ref())
    }

    /// Accumulate page text from an already loaded processor.
    pub fn read_pages(&self, processor: &dyn PdfProcessor) -> Result<String> {
        let mut page_count = processor.page_count();
        if self.config.max_pages > 0 && page_count > self.config.max_pages {
            debug!(
                "Reading only {} of {} pages",
                self.config.max_pages, page_count
            );
            page_count = self.config.max_pages;
        }

        let mut text = String::new();
        for page in 1..=page_count {
            match processor.extract_page_text(page) {
                Ok(page_text) => {
                    let flattened = flatten_fragments(&page_text);
                    debug!(page, chars = flattened.len(), "Page processed");
                    text.push_str(&flattened);
                    text.push('\n');
                }
                Err(e) => {
                    warn!(page, error = %e, "Skipping unreadable page");
                }
            }
        }

        if text.trim().is_empty() {
            return Err(PdfError::EmptyText);
        }

        Ok(text)
    }

    fn processor(&self) -> Box<dyn PdfProcessor> {
        match self.config.backend {
            TextBackend::Lopdf => Box::new(PdfExtractor::new()),
            #[cfg(feature = "pdf-extract")]
            TextBackend::PdfExtract => Box::new(super::PagedTextExtractor::new()),
            #[cfg(not(feature = "pdf-extract"))]
            TextBackend::PdfExtract => {
                warn!("pdf-extract backend not compiled in, using lopdf");
                Box::new(PdfExtractor::new())
            }
        }
    }
}

impl Default for DocumentTextReader {
    fn default() -> Self {
        Self::new(PdfConfig::default())
    }
}

/// Join a page's text fragments with single spaces.
fn flatten_fragments(page_text: &str) -> String {
    page_text.split_whitespace().collect::<Vec<_>>().join(" ")
}
