//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod output;
pub mod process;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;

use nfse_core::models::config::NfseConfig;
use nfse_core::models::invoice::DATE_FORMAT;

/// `<config_dir>/nfse/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nfse")
        .join("config.json")
}

/// The `-c` file if given, else the default file if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<NfseConfig> {
    let path = match config_path {
        Some(path) => PathBuf::from(path),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(NfseConfig::default());
            }
            path
        }
    };

    read_config(&path)
}

pub fn read_config(path: &Path) -> anyhow::Result<NfseConfig> {
    NfseConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Clap value parser for `DD/MM/YYYY` dates.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected DD/MM/YYYY: {e}"))
}
