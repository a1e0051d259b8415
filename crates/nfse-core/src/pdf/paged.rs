//! Page text via pdf-extract.
//!
//! pdf-extract decodes the whole document in one pass, so the pages are
//! materialized at load time and served from memory afterwards. It can panic
//! on malformed input; those panics are turned into [`PdfError::Parse`].

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor backed by pdf-extract.
#[derive(Default)]
pub struct PagedTextExtractor {
    pages: Vec<String>,
}

impl PagedTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PdfProcessor for PagedTextExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(data)
        }));

        let pages = match result {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(PdfError::Parse(e.to_string())),
            Err(_) => {
                return Err(PdfError::Parse(
                    "pdf-extract panicked (malformed document)".to_string(),
                ));
            }
        };

        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("pdf-extract decoded {} pages", pages.len());
        self.pages = pages;
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .cloned()
            .ok_or_else(|| PdfError::PageText {
                page,
                reason: "page does not exist".to_string(),
            })
    }
}
