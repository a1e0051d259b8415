//! Extracted NFS-e invoice record.

use serde::{Deserialize, Serialize};

/// Marker stored in `invoice_number` when no number was recovered.
pub const NUMBER_NOT_FOUND: &str = "Não encontrado";

/// Marker stored in `description` when no description was recovered.
pub const DESCRIPTION_NOT_FOUND: &str = "Descrição não encontrada";

/// Marker stored in `payer_name` when no payer was recovered.
pub const NAME_NOT_FOUND: &str = "Nome não encontrado";

/// Date format used for `service_date` (day/month/year).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// The five fields recovered from an uploaded NFS-e.
///
/// Always fully populated: fields that could not be recovered carry one of the
/// `*_NOT_FOUND` markers, a default date, or an amount of `0`. The record is
/// built once and handed to the caller, who reviews it before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInvoiceData {
    /// Invoice number (digits) or [`NUMBER_NOT_FOUND`].
    pub invoice_number: String,

    /// Service/issue date as `DD/MM/YYYY`.
    pub service_date: String,

    /// Billed service description or [`DESCRIPTION_NOT_FOUND`].
    pub description: String,

    /// Invoice value in BRL, finite and non-negative. `0` means not recovered.
    pub amount: f64,

    /// Canonical upper-case payer name or [`NAME_NOT_FOUND`].
    pub payer_name: String,
}

impl ExtractedInvoiceData {
    /// Build a record, enforcing the trimmed-strings and finite-amount invariants.
    pub fn new(
        invoice_number: impl Into<String>,
        service_date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        payer_name: impl Into<String>,
    ) -> Self {
        Self {
            invoice_number: invoice_number.into().trim().to_string(),
            service_date: service_date.into().trim().to_string(),
            description: description.into().trim().to_string(),
            amount: sanitize_amount(amount),
            payer_name: payer_name.into().trim().to_string(),
        }
    }

    /// Names of the fields that carry a not-found marker or a zero amount.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.invoice_number == NUMBER_NOT_FOUND {
            missing.push("invoiceNumber");
        }
        if self.description == DESCRIPTION_NOT_FOUND {
            missing.push("description");
        }
        if self.amount == 0.0 {
            missing.push("amount");
        }
        if self.payer_name == NAME_NOT_FOUND {
            missing.push("payerName");
        }

        missing
    }

    /// Whether the user should be asked to fill in any field by hand.
    pub fn has_missing_fields(&self) -> bool {
        !self.missing_fields().is_empty()
    }
}

/// Clamp anything that is not a finite non-negative number to `0`.
pub(crate) fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

/// Which path produced a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Fields were read from the document text.
    Extracted,
    /// Fields were synthesized from the file name and size.
    Fallback {
        /// Why the normal path was abandoned.
        reason: String,
    },
}

impl Provenance {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_trims_and_sanitizes() {
        let data = ExtractedInvoiceData::new(" 1491 ", "15/09/2025\n", "  Mensalidade ", f64::NAN, " ANA ");
        assert_eq!(data.invoice_number, "1491");
        assert_eq!(data.service_date, "15/09/2025");
        assert_eq!(data.description, "Mensalidade");
        assert_eq!(data.amount, 0.0);
        assert_eq!(data.payer_name, "ANA");

        let negative = ExtractedInvoiceData::new("1", "01/01/2025", "x", -12.5, "A");
        assert_eq!(negative.amount, 0.0);
    }

    #[test]
    fn test_missing_fields() {
        let data = ExtractedInvoiceData::new(
            NUMBER_NOT_FOUND,
            "01/10/2025",
            DESCRIPTION_NOT_FOUND,
            0.0,
            NAME_NOT_FOUND,
        );
        assert_eq!(
            data.missing_fields(),
            vec!["invoiceNumber", "description", "amount", "payerName"]
        );

        let complete = ExtractedInvoiceData::new("1491", "15/09/2025", "Hospedagem", 2500.0, "JOÃO");
        assert!(!complete.has_missing_fields());
    }

    #[test]
    fn test_serializes_camel_case() {
        let data = ExtractedInvoiceData::new("1491", "15/09/2025", "Hospedagem", 2500.0, "JOÃO DA SILVA");
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["invoiceNumber"], "1491");
        assert_eq!(json["serviceDate"], "15/09/2025");
        assert_eq!(json["payerName"], "JOÃO DA SILVA");
        assert_eq!(json["amount"], 2500.0);
    }

    #[test]
    fn test_provenance_serialization() {
        let fallback = Provenance::Fallback { reason: "PDF has no pages".to_string() };
        let json = serde_json::to_string(&fallback).unwrap();
        assert_eq!(json, r#"{"kind":"fallback","reason":"PDF has no pages"}"#);
        assert!(fallback.is_fallback());
        assert!(!Provenance::Extracted.is_fallback());
    }
}
