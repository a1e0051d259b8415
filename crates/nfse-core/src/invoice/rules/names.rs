//! Payer name extraction and normalization.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::patterns::{
    CLIENTE_NAME, NAME_TRAILING_LABEL, PRESTADOR_NAME, TOMADOR_NAME, TOMADOR_SECTION_ANY_CASE,
    TOMADOR_SECTION_NAME, UPPERCASE_RUN,
};
use super::{Field, FieldRules, MatchRule};

/// Words a real name never starts with; a capture starting with one is the
/// tail of a section header ("TOMADOR DE SERVIÇOS").
const LEADING_CONNECTIVES: [&str; 6] = ["DE", "DA", "DO", "DAS", "DOS", "E"];

/// Name rules: tomador section → tomador label → tomador section in any case
/// → cliente/prestador labels → any upper-case run of 5–50 characters.
///
/// "Nome/Razão Social" only counts inside the tomador block; the prestador
/// block usually comes first and carries the same label.
pub fn name_rules() -> FieldRules {
    FieldRules::new(
        Field::PayerName,
        vec![
            MatchRule::labeled("name.tomador_section", &TOMADOR_SECTION_NAME, 1),
            MatchRule::labeled("name.tomador_label", &TOMADOR_NAME, 1),
            MatchRule::labeled("name.tomador_section_any_case", &TOMADOR_SECTION_ANY_CASE, 1),
            MatchRule::labeled("name.cliente_label", &CLIENTE_NAME, 1),
            MatchRule::labeled("name.prestador_label", &PRESTADOR_NAME, 1),
            MatchRule::structural("name.uppercase_run", &UPPERCASE_RUN, 1),
        ],
    )
    .with_refine(refine_name)
}

/// Cut off swallowed field labels and reject header fragments.
fn refine_name(raw: &str) -> Option<String> {
    let name = match NAME_TRAILING_LABEL.find(raw) {
        Some(label) => &raw[..label.start()],
        None => raw,
    };
    let name = name.trim();

    let first_word = name.split_whitespace().next()?.to_uppercase();
    if LEADING_CONNECTIVES.contains(&first_word.as_str()) {
        return None;
    }
    let folded = normalize_name(name);
    if folded.contains("SERVICO") || folded.contains("NOTA FISCAL") {
        return None;
    }

    Some(name.to_string())
}

/// Trim, collapse whitespace runs and upper-case. Accents are kept.
pub fn canonical_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Comparison key for names: [`canonical_name`] with diacritics removed.
///
/// Idempotent, and equal for inputs that differ only in accents, case or
/// whitespace runs.
pub fn normalize_name(name: &str) -> String {
    canonical_name(name)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Whether two names refer to the same person for duplicate detection.
pub fn names_match(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::{FieldExtractor, RuleKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Maria  Inês   Jung "), "MARIA INES JUNG");
        assert_eq!(normalize_name("MARIA INES JUNG"), "MARIA INES JUNG");
        assert_eq!(normalize_name("joão da silva"), "JOAO DA SILVA");
    }

    #[test]
    fn test_normalize_name_is_idempotent() {
        for name in ["  Maria  Inês   Jung ", "Conceição\tAraújo", "ÇÃÕ ñ", ""] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once, "{name:?}");
        }
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("José  Antônio", "jose antonio"));
        assert!(!names_match("José Antônio", "José Antunes"));
    }

    #[test]
    fn test_canonical_name_keeps_accents() {
        assert_eq!(canonical_name("  joão   da silva "), "JOÃO DA SILVA");
    }

    #[test]
    fn test_refine_name() {
        assert_eq!(refine_name("JOÃO DA SILVA CPF"), Some("JOÃO DA SILVA".to_string()));
        assert_eq!(refine_name("CNPJ"), None);
        assert_eq!(refine_name("DE SERVIÇOS"), None);
        assert_eq!(refine_name("NOTA FISCAL ELETRONICA"), None);
        assert_eq!(refine_name("João da Silva Endereço"), Some("João da Silva".to_string()));
        assert_eq!(refine_name("de Serviços"), None);
    }

    #[test]
    fn test_labeled_payer() {
        let rules = name_rules();
        let text = "NOTA FISCAL DE SERVIÇOS ELETRÔNICA NFSE: 1491 Tomador: JOÃO DA SILVA CPF: 123.456.789-00";

        let found = rules.extract(text).unwrap();
        assert_eq!(found.value, "JOÃO DA SILVA");
        assert_eq!(found.kind, Some(RuleKind::Labeled));
    }

    #[test]
    fn test_header_tail_is_not_a_name() {
        let rules = name_rules();
        let text = "TOMADOR DE SERVIÇOS Nome/Razão Social: ANA PAULA DA SILVA Endereço: Rua B";

        assert_eq!(rules.extract(text).unwrap().value, "ANA PAULA DA SILVA");
    }

    #[test]
    fn test_uppercase_run_last_resort() {
        let rules = name_rules();

        let found = rules.extract("recebemos de OLICIO DOS SANTOS o valor").unwrap();
        assert_eq!(found.value, "OLICIO DOS SANTOS");
        assert_eq!(found.kind, Some(RuleKind::Structural));
    }

    #[test]
    fn test_prestador_block_is_not_the_payer() {
        let rules = name_rules();
        let text = "PRESTADOR DE SERVIÇOS Nome/Razão Social: LAR SAO VICENTE DE PAULO \
                    CNPJ: 12.345.678/0001-90 TOMADOR DE SERVIÇOS CPF/CNPJ: 123.456.789-00 \
                    Nome/Razão Social: João da Silva Valor dos Serviços R$ 10,00";

        let found = rules.extract(text).unwrap();
        assert_eq!(found.value, "João da Silva");
        assert_eq!(found.rule, Some("name.tomador_section_any_case"));
        assert_eq!(canonical_name(&found.value), "JOÃO DA SILVA");
    }

    #[test]
    fn test_mixed_case_tomador_cut_at_next_label() {
        let rules = name_rules();
        let text = "TOMADOR DE SERVIÇOS Nome/Razão Social: Maria Inês Jung Endereço: Rua B, 10";

        assert_eq!(rules.extract(text).unwrap().value, "Maria Inês Jung");
    }
}
