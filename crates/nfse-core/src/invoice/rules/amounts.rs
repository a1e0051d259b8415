//! Amount extraction for NFS-e invoices.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use tracing::debug;

use super::patterns::{AMOUNT_PATTERN, AMOUNT_TOTAL_LABEL, AMOUNT_VALUE_LABEL, AMOUNT_WITH_CURRENCY};
use super::{Field, FieldRules, MatchRule};
use crate::error::ExtractionError;

/// Amount rules: labeled value → labeled total → `R$` expression → bare number.
pub fn amount_rules() -> FieldRules {
    FieldRules::new(
        Field::Amount,
        vec![
            MatchRule::labeled("amount.valor_label", &AMOUNT_VALUE_LABEL, 1),
            MatchRule::labeled("amount.total_label", &AMOUNT_TOTAL_LABEL, 1),
            MatchRule::structural("amount.currency", &AMOUNT_WITH_CURRENCY, 1),
            MatchRule::structural("amount.decimal_comma", &AMOUNT_PATTERN, 1),
        ],
    )
}

/// Parse a Brazilian-formatted amount (`2.500,00`) exactly.
///
/// Every `.` is a thousands separator and `,` is the decimal separator.
pub fn parse_brl_decimal(s: &str) -> Result<Decimal, ExtractionError> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let normalized = cleaned.replace('.', "").replace(',', ".");

    Decimal::from_str(&normalized).map_err(|_| ExtractionError::Parse {
        field: Field::Amount.to_string(),
        value: s.to_string(),
    })
}

/// Parse a Brazilian-formatted amount, falling back to `0.0` on any failure.
///
/// The result is always finite and non-negative.
pub fn parse_brl_amount(s: &str) -> f64 {
    match parse_brl_decimal(s) {
        Ok(amount) => amount
            .to_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0),
        Err(e) => {
            debug!(error = %e, "Unparseable amount, using 0");
            0.0
        }
    }
}

/// Format amount in Brazilian style (2.500,00).
pub fn format_brl_amount(amount: f64) -> String {
    let s = format!("{:.2}", amount);
    let parts: Vec<&str> = s.split('.').collect();

    if parts.len() != 2 {
        return s;
    }

    let (sign, integer_part) = match parts[0].strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", parts[0]),
    };
    let decimal_part = parts[1];

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::{FieldExtractor, RuleKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_brl_amount() {
        assert_eq!(parse_brl_amount("1.707,40"), 1707.40);
        assert_eq!(parse_brl_amount("2.500,00"), 2500.0);
        assert_eq!(parse_brl_amount("R$ 12.345.678,90"), 12345678.90);
        assert_eq!(parse_brl_amount("850,5"), 850.5);
    }

    #[test]
    fn test_parse_brl_decimal_is_exact() {
        assert_eq!(parse_brl_decimal("1.707,40").unwrap(), Decimal::from_str("1707.40").unwrap());
    }

    #[test]
    fn test_unparseable_amount_is_zero() {
        assert_eq!(parse_brl_amount(""), 0.0);
        assert_eq!(parse_brl_amount("abc"), 0.0);
        assert_eq!(parse_brl_amount("1,2,3"), 0.0);
        assert!(matches!(
            parse_brl_decimal("n/a"),
            Err(ExtractionError::Parse { .. })
        ));
    }

    #[test]
    fn test_minus_sign_is_ignored() {
        assert_eq!(parse_brl_amount("-10,00"), 10.0);
    }

    #[test]
    fn test_format_brl_amount() {
        assert_eq!(format_brl_amount(1707.4), "1.707,40");
        assert_eq!(format_brl_amount(12345678.9), "12.345.678,90");
        assert_eq!(format_brl_amount(0.0), "0,00");
    }

    #[test]
    fn test_amount_rules_prefer_label() {
        let rules = amount_rules();
        let text = "Base de cálculo 100,00 ISS R$ 5,00 Valor Total: R$ 2.500,00";

        let found = rules.extract(text).unwrap();
        assert_eq!(found.value, "2.500,00");
        assert_eq!(found.kind, Some(RuleKind::Labeled));
    }

    #[test]
    fn test_amount_rules_fall_back_to_currency() {
        let rules = amount_rules();

        let found = rules.extract("Mensalidade 3 100,00 pago R$ 1.707,40").unwrap();
        assert_eq!(found.value, "1.707,40");
        assert_eq!(found.rule, Some("amount.currency"));

        let found = rules.extract("Mensalidade 1.707,40").unwrap();
        assert_eq!(found.rule, Some("amount.decimal_comma"));
    }

    #[test]
    fn test_services_total_beats_earlier_deductions() {
        let rules = amount_rules();
        let text = "NFS-e Número da Nota 1491 Data de Emissão 15/09/2025 Valor das Deduções R$ 0,00 \
                    Base de Cálculo R$ 100,00 VALOR DOS SERVIÇOS R$ 2.500,00";

        let found = rules.extract(text).unwrap();
        assert_eq!(found.value, "2.500,00");
        assert_eq!(found.rule, Some("amount.valor_label"));
        assert_eq!(parse_brl_amount(&found.value), 2500.0);
    }

    #[test]
    fn test_currency_amount_needs_a_boundary() {
        let rules = amount_rules();

        let found = rules.extract("Total R$ 2.500,005 e R$ 7,50").unwrap();
        assert_eq!(found.value, "7,50");
    }
}
