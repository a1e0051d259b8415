//! Rule-based field extractors for NFS-e invoices.
//!
//! Every field owns an ordered list of [`MatchRule`]s. Labeled rules (value
//! preceded by a recognizable header) come first, structural rules (shape
//! only) last, and the first accepted capture wins.

pub mod amounts;
pub mod dates;
pub mod descriptions;
pub mod names;
pub mod numbers;
pub mod patterns;

pub use amounts::{format_brl_amount, parse_brl_amount, parse_brl_decimal};
pub use dates::{format_date, is_calendar_date};
pub use names::{canonical_name, names_match, normalize_name};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// The semantic fields recovered from an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    InvoiceNumber,
    ServiceDate,
    Description,
    Amount,
    PayerName,
}

impl Field {
    /// All fields, in record order.
    pub const ALL: [Field; 5] = [
        Field::InvoiceNumber,
        Field::ServiceDate,
        Field::Description,
        Field::Amount,
        Field::PayerName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::InvoiceNumber => "invoiceNumber",
            Field::ServiceDate => "serviceDate",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::PayerName => "payerName",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a rule needs a field header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Labeled,
    Structural,
}

/// One pattern plus the capture group holding the value.
#[derive(Debug, Clone)]
pub enum MatchRule {
    /// The value must follow a recognizable field header.
    Labeled {
        name: &'static str,
        pattern: Regex,
        group: usize,
    },
    /// The value is recognized by shape alone.
    Structural {
        name: &'static str,
        pattern: Regex,
        group: usize,
    },
}

impl MatchRule {
    pub fn labeled(name: &'static str, pattern: &Regex, group: usize) -> Self {
        Self::Labeled {
            name,
            pattern: pattern.clone(),
            group,
        }
    }

    pub fn structural(name: &'static str, pattern: &Regex, group: usize) -> Self {
        Self::Structural {
            name,
            pattern: pattern.clone(),
            group,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Labeled { name, .. } | Self::Structural { name, .. } => name,
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::Labeled { .. } => RuleKind::Labeled,
            Self::Structural { .. } => RuleKind::Structural,
        }
    }

    /// Trust placed in a value found by this rule.
    pub fn confidence(&self) -> f32 {
        match self.kind() {
            RuleKind::Labeled => 0.95,
            RuleKind::Structural => 0.6,
        }
    }

    /// Capture-group matches of this rule, in text order.
    fn candidates<'t>(&'t self, text: &'t str) -> impl Iterator<Item = regex::Match<'t>> + 't {
        let (pattern, group) = match self {
            Self::Labeled { pattern, group, .. } | Self::Structural { pattern, group, .. } => {
                (pattern, *group)
            }
        };
        pattern
            .captures_iter(text)
            .filter_map(move |caps| caps.get(group))
    }
}

/// Post-capture cleanup; `None` rejects the capture.
pub type Refine = fn(&str) -> Option<String>;

/// Extraction context with confidence scores.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
    /// Rule that produced the match.
    pub rule: Option<&'static str>,
    /// Kind of that rule.
    pub kind: Option<RuleKind>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
            rule: None,
            kind: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn with_rule(mut self, rule: &MatchRule) -> Self {
        self.rule = Some(rule.name());
        self.kind = Some(rule.kind());
        self
    }
}

/// The ordered rules for one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: Field,
    rules: Vec<MatchRule>,
    refine: Option<Refine>,
}

impl FieldRules {
    pub fn new(field: Field, rules: Vec<MatchRule>) -> Self {
        Self {
            field,
            rules,
            refine: None,
        }
    }

    /// Clean or reject captures before they are accepted.
    pub fn with_refine(mut self, refine: Refine) -> Self {
        self.refine = Some(refine);
        self
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    fn accept(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match self.refine {
            Some(refine) => refine(trimmed).filter(|v| !v.trim().is_empty()),
            None => Some(trimmed.to_string()),
        }
    }

    fn matches_for<'t>(
        &'t self,
        rule: &'t MatchRule,
        text: &'t str,
    ) -> impl Iterator<Item = ExtractionMatch<String>> + 't {
        rule.candidates(text).filter_map(move |m| {
            self.accept(m.as_str()).map(|value| {
                ExtractionMatch::new(value, rule.confidence(), m.as_str())
                    .with_position(m.start(), m.end())
                    .with_rule(rule)
            })
        })
    }
}

impl FieldExtractor for FieldRules {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for rule in &self.rules {
            if let Some(found) = self.matches_for(rule, text).next() {
                debug!(
                    field = %self.field,
                    rule = rule.name(),
                    kind = ?rule.kind(),
                    value = %found.value,
                    "Pattern matched"
                );
                return Some(found);
            }
        }
        debug!(field = %self.field, "No rule matched");
        None
    }
}

/// Rules for every field. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    fields: HashMap<Field, FieldRules>,
}

lazy_static! {
    static ref DEFAULT_PATTERNS: Arc<PatternSet> = Arc::new(PatternSet::nfse());
}

impl PatternSet {
    /// An empty set; every field is unmatched until rules are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// The NFS-e rule lists, most specific first.
    pub fn nfse() -> Self {
        Self::new()
            .with_field_rules(numbers::invoice_number_rules())
            .with_field_rules(dates::date_rules())
            .with_field_rules(descriptions::description_rules())
            .with_field_rules(amounts::amount_rules())
            .with_field_rules(names::name_rules())
    }

    /// The process-wide NFS-e set, built on first use.
    pub fn shared() -> Arc<PatternSet> {
        Arc::clone(&DEFAULT_PATTERNS)
    }

    /// Replace a field's rules with a plain ordered list.
    pub fn with_rules(self, field: Field, rules: Vec<MatchRule>) -> Self {
        self.with_field_rules(FieldRules::new(field, rules))
    }

    pub fn with_field_rules(mut self, rules: FieldRules) -> Self {
        self.fields.insert(rules.field(), rules);
        self
    }

    pub fn rules(&self, field: Field) -> Option<&FieldRules> {
        self.fields.get(&field)
    }

    /// First accepted capture for `field`, or `None`.
    pub fn first_match(&self, text: &str, field: Field) -> Option<ExtractionMatch<String>> {
        self.rules(field).and_then(|rules| rules.extract(text))
    }
}
