//! Invoice date extraction for UK invoices.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::*;
use super::{group, Rule, RuleCascade, RuleContext, RuleScope};
use crate::models::invoice::FieldKind;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parse a printed date: "8 May 2025", "08/05/2025", "8.5.25" or "2025-05-08".
///
/// Numeric dates are read day first.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_LONG.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_to_number(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Some(caps) = DATE_DMY.captures(s) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(parse_year(&caps[3])?, month, day);
    }
    if let Some(caps) = DATE_YMD.captures(s) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    None
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if year < 100 {
        // Two-digit year: 00-50 is 2000s, 51-99 is 1900s
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}

fn month_to_number(word: &str) -> Option<u32> {
    let word = word.to_lowercase();
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&word))
        .map(|i| i as u32 + 1)
}

fn date(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<NaiveDate> {
    parse_date(group(caps, 1)?)
}

/// Earliest parseable date anywhere in the text.
fn any_date(text: &str, _ctx: &RuleContext<'_>) -> Option<NaiveDate> {
    [&*DATE_LONG, &*DATE_DMY, &*DATE_YMD]
        .iter()
        .flat_map(|re| re.find_iter(text))
        .filter_map(|m| parse_date(m.as_str()).map(|d| (m.start(), d)))
        .min_by_key(|(start, _)| *start)
        .map(|(_, d)| d)
}

lazy_static! {
    static ref INVOICE_DATE_RULES: RuleCascade<NaiveDate> = RuleCascade::new(
        FieldKind::InvoiceDate,
        vec![
            Rule::pattern("invoice_date.aaw.date", RuleScope::Supplier("AAW"), 100, &DATE_LABEL_LONG, date),
            Rule::pattern("invoice_date.cjl.invoice_date", RuleScope::Supplier("CJL"), 100, &INVOICE_DATE_LONG, date),
            Rule::pattern("invoice_date.amazon.invoice_date", RuleScope::Supplier("AMAZON"), 100, &INVOICE_DATE_LONG, date),
            Rule::pattern("invoice_date.aps.invoice_date", RuleScope::Supplier("APS"), 100, &INVOICE_DATE_NUMERIC, date),
            Rule::pattern("invoice_date.invoice_label", RuleScope::Any, 200, &DATE_INVOICE_LABEL, date),
            Rule::pattern("invoice_date.label_numeric", RuleScope::Any, 210, &DATE_LABEL_NUMERIC, date),
            Rule::pattern("invoice_date.label_long", RuleScope::Any, 220, &DATE_LABEL_LONG, date),
            Rule::derived("invoice_date.any_date", RuleScope::Any, 900, any_date),
        ],
    );
}

pub fn invoice_date_rules() -> &'static RuleCascade<NaiveDate> {
    &INVOICE_DATE_RULES
}
