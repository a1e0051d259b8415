//! Configuration structures for the extraction pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NfseError, Result};

/// Main configuration for the nfse pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NfseConfig {
    /// PDF reading configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Fallback record configuration.
    pub fallback: FallbackConfig,
}

/// Which library pulls text out of PDF pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextBackend {
    /// lopdf content-stream decoding.
    #[default]
    Lopdf,
    /// pdf-extract layout-aware decoding.
    PdfExtract,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Text extraction backend.
    pub backend: TextBackend,

    /// Maximum pages to read (0 = unlimited).
    pub max_pages: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            backend: TextBackend::Lopdf,
            max_pages: 0,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Accept documents whose declared media type is `application/pdf` even
    /// when the file name has no `.pdf` extension.
    pub accept_media_type: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            accept_media_type: true,
        }
    }
}

/// A file-name keyword that maps to a known payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerKeyword {
    /// Lower-case substring looked up in the file name.
    pub keyword: String,
    /// Payer name used when the keyword is present.
    pub payer_name: String,
}

impl PayerKeyword {
    pub fn new(keyword: impl Into<String>, payer_name: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            payer_name: payer_name.into(),
        }
    }
}

/// Placeholder record configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Placeholder amount per kilobyte of file size.
    pub amount_per_kilobyte: f64,

    /// Keywords checked, in order, against the lower-cased file name.
    pub payer_keywords: Vec<PayerKeyword>,

    /// Description written into every fallback record.
    pub description: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            amount_per_kilobyte: 50.0,
            payer_keywords: vec![
                PayerKeyword::new("oli", "OLICIO DOS SANTOS"),
                PayerKeyword::new("ana", "ANA PAULA DA SILVA"),
                PayerKeyword::new("maria", "MARIA INES JUNG"),
            ],
            description: "Serviços de acolhimento institucional (dados estimados, revisar)".to_string(),
        }
    }
}

impl NfseConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| NfseError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| NfseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
