//! Invoice number extraction.

use super::patterns::{DIGIT_RUN, NFSE_NUMBER, NOTA_FISCAL_NUMBER, NUMBER_OF_NOTE};
use super::{Field, FieldRules, MatchRule};

/// Number rules: "número da nota" → "NFS-e" → "nota fiscal nº" → any run of
/// 4+ digits.
pub fn invoice_number_rules() -> FieldRules {
    FieldRules::new(
        Field::InvoiceNumber,
        vec![
            MatchRule::labeled("number.numero_da_nota", &NUMBER_OF_NOTE, 1),
            MatchRule::labeled("number.nfse_label", &NFSE_NUMBER, 1),
            MatchRule::labeled("number.nota_fiscal_label", &NOTA_FISCAL_NUMBER, 1),
            MatchRule::structural("number.digit_run", &DIGIT_RUN, 1),
        ],
    )
}
