//! Date extraction for NFS-e invoices.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, ISSUE_DATE};
use super::{Field, FieldRules, MatchRule};
use crate::models::invoice::DATE_FORMAT;

/// Date rules: labeled issue/competence date → any `DD/MM/YYYY`.
///
/// Captures that are not real calendar dates are skipped.
pub fn date_rules() -> FieldRules {
    FieldRules::new(
        Field::ServiceDate,
        vec![
            MatchRule::labeled("date.issue_label", &ISSUE_DATE, 1),
            MatchRule::structural("date.dmy", &DATE_DMY, 1),
        ],
    )
    .with_refine(|v| is_calendar_date(v).then(|| v.to_string()))
}

/// Whether `s` is a valid `DD/MM/YYYY` date.
pub fn is_calendar_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).is_ok()
}

/// Format a date the way the record stores it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
