//! Placeholder records for documents that yield no usable text.

use chrono::NaiveDate;
use tracing::debug;

use crate::models::config::FallbackConfig;
use crate::models::invoice::{ExtractedInvoiceData, NAME_NOT_FOUND};

use super::rules::format_date;
use super::rules::patterns::FILE_NAME_DIGITS;

/// Builds a record from the file name and size alone.
///
/// Every value is a placeholder for the user to correct. The same name, size
/// and date always give the same record.
#[derive(Debug, Clone, Default)]
pub struct FallbackSynthesizer {
    config: FallbackConfig,
}

impl FallbackSynthesizer {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    pub fn synthesize(&self, name: &str, size: u64, today: NaiveDate) -> ExtractedInvoiceData {
        let record = ExtractedInvoiceData::new(
            placeholder_number(name),
            format_date(today),
            self.config.description.as_str(),
            self.placeholder_amount(size),
            self.sniff_payer(name).unwrap_or(NAME_NOT_FOUND),
        );
        debug!(
            name,
            size,
            number = %record.invoice_number,
            amount = record.amount,
            "Synthesized placeholder record"
        );
        record
    }

    /// `round(size / 1000 * amount_per_kilobyte)`.
    pub fn placeholder_amount(&self, size: u64) -> f64 {
        (size as f64 / 1000.0 * self.config.amount_per_kilobyte).round()
    }

    /// Payer of the first configured keyword found in the lower-cased name.
    pub fn sniff_payer(&self, name: &str) -> Option<&str> {
        let lowered = name.to_lowercase();
        self.config
            .payer_keywords
            .iter()
            .find(|k| !k.keyword.is_empty() && lowered.contains(&k.keyword.to_lowercase()))
            .map(|k| k.payer_name.as_str())
    }
}

/// First run of 4+ digits in the name, else a number in `1000..=9999`
/// derived from [`name_hash`].
pub fn placeholder_number(name: &str) -> String {
    match FILE_NAME_DIGITS.find(name) {
        Some(digits) => digits.as_str().to_string(),
        None => (name_hash(name).unsigned_abs() % 9000 + 1000).to_string(),
    }
}

/// Rolling `h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::PayerKeyword;
    use crate::models::invoice::DATE_FORMAT;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    #[test]
    fn test_image_only_upload() {
        let record = FallbackSynthesizer::default().synthesize("oli-invoice.pdf", 53_664, today());

        assert_eq!(record.amount, 2683.0);
        assert_eq!(record.payer_name, "OLICIO DOS SANTOS");
        assert_eq!(record.invoice_number, "5776");
        assert_eq!(record.service_date, "01/10/2025");
        assert_eq!(record.description, FallbackConfig::default().description);
    }

    #[test]
    fn test_number_from_file_name() {
        assert_eq!(placeholder_number("nfse_004512_set.pdf"), "004512");
        assert_eq!(placeholder_number("nota 12 de 2025.pdf"), "2025");
    }

    #[test]
    fn test_hash_number_is_deterministic() {
        assert_eq!(placeholder_number("scan.pdf"), "7007");
        assert_eq!(placeholder_number("scan.pdf"), placeholder_number("scan.pdf"));
        assert_eq!(placeholder_number(""), "1000");
        assert_eq!(name_hash("ação.pdf"), -1_583_327_210);

        let long_name = "x".repeat(500);
        for name in ["a", "recibo.pdf", "ação.pdf", long_name.as_str()] {
            let n: u32 = placeholder_number(name).parse().unwrap();
            assert!((1000..=9999).contains(&n), "{name}: {n}");
        }
    }

    #[test]
    fn test_sniff_payer_order() {
        let synth = FallbackSynthesizer::default();

        assert_eq!(synth.sniff_payer("Maria-Ana.PDF"), Some("ANA PAULA DA SILVA"));
        assert_eq!(synth.sniff_payer("MARIA.pdf"), Some("MARIA INES JUNG"));
        assert_eq!(synth.sniff_payer("recibo.pdf"), None);
        assert_eq!(
            synth.synthesize("recibo.pdf", 0, today()).payer_name,
            NAME_NOT_FOUND
        );
    }

    #[test]
    fn test_custom_config() {
        let synth = FallbackSynthesizer::new(FallbackConfig {
            amount_per_kilobyte: 10.0,
            payer_keywords: vec![PayerKeyword::new("jose", "JOSE PEREIRA")],
            description: "Revisar".to_string(),
        });
        let record = synth.synthesize("jose-0042.pdf", 2_500, today());

        assert_eq!(record.amount, 25.0);
        assert_eq!(record.payer_name, "JOSE PEREIRA");
        assert_eq!(record.invoice_number, "0042");
        assert_eq!(record.description, "Revisar");
        assert!(NaiveDate::parse_from_str(&record.service_date, DATE_FORMAT).is_ok());
    }
}
