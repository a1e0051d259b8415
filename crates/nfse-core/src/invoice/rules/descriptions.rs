//! Service description extraction.

use super::patterns::{REFERENTE_A, SERVICE_DESCRIPTION};
use super::{Field, FieldRules, MatchRule};

/// Description rules: labeled "discriminação/descrição" block → a
/// "referente a…" fragment.
pub fn description_rules() -> FieldRules {
    FieldRules::new(
        Field::Description,
        vec![
            MatchRule::labeled("description.service_label", &SERVICE_DESCRIPTION, 1),
            MatchRule::structural("description.referente_a", &REFERENTE_A, 1),
        ],
    )
    .with_refine(|v| {
        let v = v.trim_matches(|c: char| c.is_whitespace() || c == ':' || c == '-');
        (v.chars().count() >= 3).then(|| v.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::{FieldExtractor, RuleKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_labeled_description() {
        let rules = description_rules();
        let text = "Discriminação dos Serviços: Mensalidade de hospedagem - setembro/2025 Valor Total: R$ 2.500,00";

        let found = rules.extract(text).unwrap();
        assert_eq!(found.value, "Mensalidade de hospedagem - setembro/2025");
        assert_eq!(found.kind, Some(RuleKind::Labeled));
    }

    #[test]
    fn test_description_stops_at_blank_line() {
        let rules = description_rules();
        let text = "Descrição:\nCuidados diários\n\nObservações gerais";

        assert_eq!(rules.extract(text).unwrap().value, "Cuidados diários");
    }

    #[test]
    fn test_referente_a_fallback() {
        let rules = description_rules();
        let text = "Recebemos o valor referente a mensalidade de outubro; obrigado";

        let found = rules.extract(text).unwrap();
        assert_eq!(found.value, "referente a mensalidade de outubro");
        assert_eq!(found.kind, Some(RuleKind::Structural));
    }
}
