//! Declarative per-field rule tables for supplier invoices.
//!
//! Every field has one [`RuleCascade`]: an ordered table of rules, each with
//! an id, a supplier scope, a priority and either a pattern plus validity
//! predicate or a derivation function. Evaluation stops at the first rule
//! that yields an accepted value.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod identifiers;
pub mod location;
pub mod patterns;

pub use amounts::{
    net_amount_rules, parse_currency_amount, reconcile_amounts, total_amount_rules,
    vat_amount_rules, ReconciledAmounts, SourcedAmount,
};
pub use dates::{invoice_date_rules, parse_date};
pub use description::description_rules;
pub use identifiers::{invoice_number_rules, is_valid_invoice_number, is_valid_po, po_number_rules};
pub use location::{collect_address_pairs, resolve_store_from_pairs, store_rules};

use regex::{Captures, Regex};

use crate::models::config::AddressPair;
use crate::models::invoice::FieldKind;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str, ctx: &RuleContext<'_>) -> Option<Self::Output>;
}

/// A value together with the rule that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Id of the producing rule.
    pub rule_id: &'static str,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, rule_id: &'static str, source: impl Into<String>) -> Self {
        Self {
            value,
            rule_id,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// The customer's name as printed on invoices.
#[derive(Debug, Clone)]
pub struct CustomerMarker {
    name: String,
    /// The name followed by one word, which is captured.
    word_after: Option<Regex>,
}

impl CustomerMarker {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let word_after = if name.trim().is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i){}\s+(\w+)", regex::escape(name.trim()))).ok()
        };
        Self { name, word_after }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn word_after(&self) -> Option<&Regex> {
        self.word_after.as_ref()
    }
}

/// Per-document inputs that some rules need besides the text.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Registry code of the identified supplier.
    pub supplier_code: Option<&'a str>,
    /// Source file name.
    pub filename: &'a str,
    /// The customer's billing addresses.
    pub billing_addresses: &'a [AddressPair],
    /// Customer name as printed on invoices.
    pub customer_marker: Option<&'a CustomerMarker>,
}

impl<'a> RuleContext<'a> {
    pub fn new(supplier_code: Option<&'a str>, filename: &'a str) -> Self {
        Self {
            supplier_code,
            filename,
            billing_addresses: &[],
            customer_marker: None,
        }
    }

    pub fn with_billing_addresses(mut self, billing: &'a [AddressPair]) -> Self {
        self.billing_addresses = billing;
        self
    }

    pub fn with_customer_marker(mut self, marker: &'a CustomerMarker) -> Self {
        self.customer_marker = Some(marker);
        self
    }

    /// File name without directory or extension.
    pub fn filename_stem(&self) -> &'a str {
        std::path::Path::new(self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.filename)
    }
}

/// Which documents a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    /// Every document.
    Any,
    /// Only documents from the supplier with this registry code.
    Supplier(&'static str),
}

impl RuleScope {
    pub fn applies_to(&self, supplier_code: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Supplier(code) => supplier_code == Some(*code),
        }
    }
}

/// Validity predicate over a pattern match.
pub type AcceptFn<T> = fn(&Captures<'_>, &RuleContext<'_>) -> Option<T>;

/// Derivation over the whole text, for rules a single pattern can't express.
pub type DeriveFn<T> = fn(&str, &RuleContext<'_>) -> Option<T>;

pub enum RuleKind<T> {
    Pattern {
        regex: &'static Regex,
        accept: AcceptFn<T>,
    },
    Derived(DeriveFn<T>),
}

/// One row of a field's rule table.
pub struct Rule<T> {
    pub id: &'static str,
    pub scope: RuleScope,
    /// Lower runs first.
    pub priority: u16,
    pub kind: RuleKind<T>,
}

impl<T> Rule<T> {
    pub fn pattern(
        id: &'static str,
        scope: RuleScope,
        priority: u16,
        regex: &'static Regex,
        accept: AcceptFn<T>,
    ) -> Self {
        Self {
            id,
            scope,
            priority,
            kind: RuleKind::Pattern { regex, accept },
        }
    }

    pub fn derived(id: &'static str, scope: RuleScope, priority: u16, derive: DeriveFn<T>) -> Self {
        Self {
            id,
            scope,
            priority,
            kind: RuleKind::Derived(derive),
        }
    }

    /// First accepted value of this rule, ignoring scope.
    pub fn apply(&self, text: &str, ctx: &RuleContext<'_>) -> Option<ExtractionMatch<T>> {
        match &self.kind {
            RuleKind::Pattern { regex, accept } => regex.captures_iter(text).find_map(|caps| {
                let value = accept(&caps, ctx)?;
                let whole = caps.get(0)?;
                Some(
                    ExtractionMatch::new(value, self.id, whole.as_str())
                        .with_position(whole.start(), whole.end()),
                )
            }),
            RuleKind::Derived(derive) => {
                derive(text, ctx).map(|value| ExtractionMatch::new(value, self.id, ""))
            }
        }
    }
}

impl<T> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("priority", &self.priority)
            .finish()
    }
}

/// The ordered rule table for one field.
#[derive(Debug)]
pub struct RuleCascade<T> {
    field: FieldKind,
    rules: Vec<Rule<T>>,
}

impl<T> RuleCascade<T> {
    /// Rules are ordered by priority; equal priorities keep table order.
    pub fn new(field: FieldKind, mut rules: Vec<Rule<T>>) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self { field, rules }
    }

    pub fn field(&self) -> FieldKind {
        self.field
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&Rule<T>> {
        self.rules.iter().find(|r| r.id == id)
    }

    fn in_scope<'r>(&'r self, ctx: &'r RuleContext<'_>) -> impl Iterator<Item = &'r Rule<T>> + 'r {
        self.rules
            .iter()
            .filter(move |r| r.scope.applies_to(ctx.supplier_code))
    }
}

impl<T> FieldExtractor for RuleCascade<T> {
    type Output = ExtractionMatch<T>;

    fn extract(&self, text: &str, ctx: &RuleContext<'_>) -> Option<Self::Output> {
        self.in_scope(ctx).find_map(|rule| rule.apply(text, ctx))
    }
}

/// Trimmed text of a capture group, if it participated.
pub(crate) fn group<'t>(caps: &Captures<'t>, index: usize) -> Option<&'t str> {
    caps.get(index).map(|m| m.as_str().trim()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref DIGITS: Regex = Regex::new(r"(\d+)").unwrap();
    }

    fn even(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<u32> {
        group(caps, 1)?.parse().ok().filter(|n: &u32| n % 2 == 0)
    }

    fn fixed(_text: &str, _ctx: &RuleContext<'_>) -> Option<u32> {
        Some(7)
    }

    fn cascade() -> RuleCascade<u32> {
        RuleCascade::new(
            FieldKind::InvoiceNumber,
            vec![
                Rule::derived("fallback", RuleScope::Any, 900, fixed),
                Rule::pattern("even", RuleScope::Any, 100, &DIGITS, even),
                Rule::pattern("acme.even", RuleScope::Supplier("ACME"), 50, &DIGITS, even),
            ],
        )
    }

    #[test]
    fn test_rules_sorted_by_priority() {
        let ids: Vec<_> = cascade().rules().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["acme.even", "even", "fallback"]);
    }

    #[test]
    fn test_first_accepted_match_wins() {
        let ctx = RuleContext::new(None, "x.pdf");
        let m = cascade().extract("13 and 42", &ctx).unwrap();
        // 13 fails the predicate; the same rule moves on to 42.
        assert_eq!(m.value, 42);
        assert_eq!(m.rule_id, "even");
        assert_eq!(m.position, Some((7, 9)));
    }

    #[test]
    fn test_scope_filters_rules() {
        let plain = RuleContext::new(None, "x.pdf");
        let acme = RuleContext::new(Some("ACME"), "x.pdf");
        assert_eq!(cascade().extract("4", &plain).unwrap().rule_id, "even");
        assert_eq!(cascade().extract("4", &acme).unwrap().rule_id, "acme.even");
    }

    #[test]
    fn test_falls_through_to_derived() {
        let ctx = RuleContext::new(None, "x.pdf");
        let m = cascade().extract("no numbers", &ctx).unwrap();
        assert_eq!(m.value, 7);
        assert_eq!(m.rule_id, "fallback");
    }

    #[test]
    fn test_customer_marker_word_after() {
        let marker = CustomerMarker::new("Menkind (UK)");
        let caps = marker.word_after().unwrap().captures("menkind (uk) Guildford").unwrap();
        assert_eq!(&caps[1], "Guildford");
        assert!(CustomerMarker::new("  ").word_after().is_none());
    }

    #[test]
    fn test_filename_stem() {
        let ctx = RuleContext::new(None, "in/APS 1234.pdf");
        assert_eq!(ctx.filename_stem(), "APS 1234");
    }
}
