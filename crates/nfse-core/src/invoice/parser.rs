//! Text-to-record parser for NFS-e invoices.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ExtractionError;
use crate::models::invoice::{
    DESCRIPTION_NOT_FOUND, ExtractedInvoiceData, NAME_NOT_FOUND, NUMBER_NOT_FOUND,
};

use super::Result;
use super::rules::{
    ExtractionMatch, Field, PatternSet, RuleKind, canonical_name, format_date, parse_brl_amount,
};

/// Result of parsing invoice text.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Normalized record.
    pub data: ExtractedInvoiceData,
    /// One entry per field that matched a rule.
    pub matches: Vec<FieldMatch>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

/// Which rule produced a field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch {
    pub field: Field,
    pub rule: &'static str,
    pub kind: RuleKind,
    pub confidence: f32,
    pub value: String,
    /// The capture as it appeared in the document, before cleanup.
    pub source: String,
    /// Byte range of the capture in the document text.
    pub span: Option<(usize, usize)>,
}

/// Raw captures keyed by field, before normalization.
#[derive(Debug, Clone, Default)]
pub struct FieldMatches {
    found: BTreeMap<Field, ExtractionMatch<String>>,
}

impl FieldMatches {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.found.get(&field).map(|m| m.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }

    /// Rule summaries in field order.
    pub fn summary(&self) -> Vec<FieldMatch> {
        self.found
            .iter()
            .filter_map(|(field, m)| {
                Some(FieldMatch {
                    field: *field,
                    rule: m.rule?,
                    kind: m.kind?,
                    confidence: m.confidence,
                    value: m.value.clone(),
                    source: m.source.clone(),
                    span: m.position,
                })
            })
            .collect()
    }
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse invoice from text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Applies a [`PatternSet`] to document text and normalizes the captures.
#[derive(Debug, Clone)]
pub struct NfseParser {
    patterns: Arc<PatternSet>,
    reference_date: Option<NaiveDate>,
}

impl NfseParser {
    /// Create a parser over the shared NFS-e rules.
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::shared(),
            reference_date: None,
        }
    }

    pub fn with_patterns(mut self, patterns: Arc<PatternSet>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Fix the date used for a missing service date.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn patterns(&self) -> &Arc<PatternSet> {
        &self.patterns
    }

    /// The reference date, or the local calendar date when none is set.
    pub fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Run every field's rules against the full text.
    ///
    /// Fails with [`ExtractionError::NoData`] when not a single field matched.
    pub fn match_fields(&self, text: &str) -> Result<FieldMatches> {
        let found: BTreeMap<_, _> = Field::ALL
            .into_iter()
            .filter_map(|field| {
                self.patterns
                    .first_match(text, field)
                    .map(|m| (field, m))
            })
            .collect();

        if found.is_empty() {
            return Err(ExtractionError::NoData);
        }

        debug!(matched = found.len(), "Fields matched");
        Ok(FieldMatches { found })
    }

    /// Normalize matched fields into the final result.
    pub fn finish(&self, matches: &FieldMatches) -> ExtractionResult {
        let data = normalize(matches, self.today());
        let warnings = warnings_for(matches);

        debug!(
            "Extracted invoice {} with {} of {} fields",
            data.invoice_number,
            matches.len(),
            Field::ALL.len()
        );

        ExtractionResult {
            data,
            matches: matches.summary(),
            warnings,
        }
    }
}

impl Default for NfseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn raw captures into a record. Unmatched fields get their markers, the
/// reference date or a zero amount.
pub fn normalize(matches: &FieldMatches, today: NaiveDate) -> ExtractedInvoiceData {
    let invoice_number = matches
        .get(Field::InvoiceNumber)
        .unwrap_or(NUMBER_NOT_FOUND);
    let service_date = matches
        .get(Field::ServiceDate)
        .map(str::to_string)
        .unwrap_or_else(|| format_date(today));
    let description = matches
        .get(Field::Description)
        .unwrap_or(DESCRIPTION_NOT_FOUND);
    let amount = matches.get(Field::Amount).map(parse_brl_amount).unwrap_or(0.0);
    let payer_name = matches
        .get(Field::PayerName)
        .map(canonical_name)
        .unwrap_or_else(|| NAME_NOT_FOUND.to_string());

    ExtractedInvoiceData::new(invoice_number, service_date, description, amount, payer_name)
}

fn warnings_for(matches: &FieldMatches) -> Vec<String> {
    let mut warnings = Vec::new();

    for field in Field::ALL {
        if matches.get(field).is_none() {
            warnings.push(format!("Could not extract {field}"));
        }
    }
    if let Some(raw) = matches.get(Field::Amount) {
        if parse_brl_amount(raw) == 0.0 {
            warnings.push(format!("Amount '{raw}' parsed as 0"));
        }
    }

    warnings
}

impl InvoiceParser for NfseParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        info!("Parsing invoice from {} characters of text", text.len());

        let matches = self.match_fields(text)?;
        Ok(self.finish(&matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use regex::Regex;

    use crate::invoice::rules::MatchRule;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    const FULL_INVOICE: &str = "PREFEITURA MUNICIPAL\n\
        NOTA FISCAL DE SERVIÇOS ELETRÔNICA NFSE: 1491\n\
        Data de Emissão: 15/09/2025\n\
        Tomador: JOÃO DA SILVA CPF: 123.456.789-00\n\
        Discriminação dos Serviços: Mensalidade de hospedagem setembro\n\n\
        Valor Total: R$ 2.500,00\n";

    #[test]
    fn test_parse_full_invoice() {
        let parser = NfseParser::new().with_reference_date(reference_date());
        let result = parser.parse(FULL_INVOICE).unwrap();

        assert_eq!(
            result.data,
            ExtractedInvoiceData::new(
                "1491",
                "15/09/2025",
                "Mensalidade de hospedagem setembro",
                2500.0,
                "JOÃO DA SILVA",
            )
        );
        assert!(result.warnings.is_empty());
        assert_eq!(result.matches.len(), 5);
        assert!(result.matches.iter().all(|m| m.kind == RuleKind::Labeled));

        let payer = result.matches.iter().find(|m| m.field == Field::PayerName).unwrap();
        assert_eq!(payer.source, "JOÃO DA SILVA CPF");
        assert_eq!(payer.value, "JOÃO DA SILVA");
    }

    // Two pages as the reader flattens them: header with both party blocks,
    // then the service lines and the tax box.
    const TWO_BLOCK_INVOICE: &str = "PREFEITURA MUNICIPAL DE PORTO ALEGRE \
        NOTA FISCAL DE SERVIÇOS ELETRÔNICA - NFS-e Número da Nota 1491 \
        Data e Hora de Emissão 15/09/2025 10:22:01 Código de Verificação 8A2B-41C9 \
        PRESTADOR DE SERVIÇOS CPF/CNPJ: 12.345.678/0001-90 \
        Nome/Razão Social: LAR SAO VICENTE DE PAULO Endereço: Rua das Flores, 100 \
        TOMADOR DE SERVIÇOS CPF/CNPJ: 123.456.789-00 \
        Nome/Razão Social: João da Silva Endereço: Av. Brasil, 200 E-mail: joao@example.com\n\
        DISCRIMINAÇÃO DOS SERVIÇOS Mensalidade de hospedagem setembro/2025 \
        Valor das Deduções R$ 0,00 Base de Cálculo R$ 2.500,00 Alíquota 2,00% \
        Valor do ISS R$ 50,00 VALOR DOS SERVIÇOS R$ 2.500,00\n";

    #[test]
    fn test_parse_two_block_invoice() {
        let parser = NfseParser::new().with_reference_date(reference_date());
        let result = parser.parse(TWO_BLOCK_INVOICE).unwrap();

        assert_eq!(
            result.data,
            ExtractedInvoiceData::new(
                "1491",
                "15/09/2025",
                "Mensalidade de hospedagem setembro/2025",
                2500.0,
                "JOÃO DA SILVA",
            )
        );
        assert!(result.warnings.is_empty());
        assert!(result.matches.iter().all(|m| m.kind == RuleKind::Labeled));
    }

    #[test]
    fn test_missing_fields_get_markers() {
        let parser = NfseParser::new().with_reference_date(reference_date());
        let result = parser.parse("nfse: 2201 emitida").unwrap();

        assert_eq!(result.data.invoice_number, "2201");
        assert_eq!(result.data.service_date, "01/10/2025");
        assert_eq!(result.data.description, DESCRIPTION_NOT_FOUND);
        assert_eq!(result.data.amount, 0.0);
        assert_eq!(result.data.payer_name, NAME_NOT_FOUND);
        assert_eq!(result.data.missing_fields(), vec!["description", "amount", "payerName"]);
        assert!(result.warnings.contains(&"Could not extract payerName".to_string()));
    }

    #[test]
    fn test_no_match_is_no_data() {
        let parser = NfseParser::new();
        assert!(matches!(
            parser.parse("lorem ipsum dolor sit amet"),
            Err(ExtractionError::NoData)
        ));
    }

    #[test]
    fn test_payer_name_is_canonical() {
        let parser = NfseParser::new().with_reference_date(reference_date());
        let matches = parser.match_fields("Tomador:  MARIA   INÊS JUNG\n").unwrap();

        assert_eq!(matches.get(Field::PayerName), Some("MARIA   INÊS JUNG"));
        assert_eq!(normalize(&matches, reference_date()).payer_name, "MARIA INÊS JUNG");
    }

    #[test]
    fn test_custom_patterns() {
        let code = Regex::new(r"COD-(\d+)").unwrap();
        let patterns = PatternSet::new().with_rules(
            Field::InvoiceNumber,
            vec![MatchRule::labeled("code", &code, 1)],
        );
        let parser = NfseParser::new()
            .with_patterns(Arc::new(patterns))
            .with_reference_date(reference_date());

        let result = parser.parse("NFSE: 1491 COD-77").unwrap();
        assert_eq!(result.data.invoice_number, "77");
        assert_eq!(result.matches[0].rule, "code");
        assert_eq!(result.matches[0].span, Some((15, 17)));
    }
}
