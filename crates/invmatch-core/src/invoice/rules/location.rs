//! Store (delivery site) extraction.
//!
//! Two-column layouts often merge the billing block and the delivery block
//! onto one line, so every rule here matches substructure inside a line.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::*;
use super::{group, Rule, RuleCascade, RuleContext, RuleScope};
use crate::models::config::AddressPair;
use crate::models::invoice::FieldKind;

/// Words that follow the customer name without being a store.
const CUSTOMER_SKIP_WORDS: &[&str] = &["limited", "ltd", "contract", "the", "atrium", "business"];

/// Every (city, postcode) pair in the text, in order of appearance.
pub fn collect_address_pairs(text: &str) -> Vec<AddressPair> {
    CITY_POSTCODE
        .captures_iter(text)
        .map(|caps| {
            let postcode = caps[2].split_whitespace().collect::<Vec<_>>().join(" ");
            AddressPair::new(&caps[1], postcode)
        })
        .collect()
}

/// The store city, if exactly one pair survives.
///
/// Billing pairs are excluded, as is any city printed more than once (the
/// supplier's own letterhead repeats).
pub fn resolve_store_from_pairs(pairs: &[AddressPair], billing: &[AddressPair]) -> Option<String> {
    let mut city_counts: HashMap<String, usize> = HashMap::new();
    for pair in pairs {
        *city_counts.entry(pair.city.to_lowercase()).or_default() += 1;
    }

    let remaining: Vec<&AddressPair> = pairs
        .iter()
        .filter(|p| !billing.iter().any(|b| b.same_as(p)))
        .filter(|p| city_counts.get(&p.city.to_lowercase()).copied() == Some(1))
        .collect();

    match remaining.as_slice() {
        [only] => Some(only.city.clone()),
        _ => None,
    }
}

fn lines(block: &str) -> impl Iterator<Item = &str> {
    block.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn store(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    group(caps, 1).map(str::to_string)
}

fn amazon_po_store(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    group(caps, 2).map(str::to_string)
}

fn last_line(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    lines(group(caps, 1)?).last().map(str::to_string)
}

fn first_line(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    lines(group(caps, 1)?).next().map(str::to_string)
}

/// The line after the customer's name in an Amazon delivery block.
fn amazon_delivery(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<String> {
    let marker = ctx.customer_marker?.name().trim().to_lowercase();
    if marker.is_empty() {
        return None;
    }
    let block: Vec<&str> = lines(group(caps, 1)?).collect();
    block
        .windows(2)
        .filter(|pair| pair[0].to_lowercase().contains(&marker))
        .map(|pair| pair[1])
        .find(|next| !next.starts_with(|c: char| c.is_ascii_digit()) && next.chars().count() < 30)
        .map(str::to_string)
}

/// Last line of a "SITE ADDRESS:" block with its postcode removed.
fn site_address(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    let last = lines(group(caps, 1)?).last()?;
    let city = UK_POSTCODE.replace_all(last, "");
    let city = city.trim();
    (city.chars().count() > 2 && !city.to_lowercase().starts_with("unit")).then(|| city.to_string())
}

fn site_name(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<String> {
    let first = group(caps, 1)?;
    let is_customer = ctx
        .customer_marker
        .is_some_and(|m| !m.name().is_empty() && first.eq_ignore_ascii_case(m.name()));
    let name = if is_customer {
        group(caps, 2)?
    } else {
        first
    };
    (name.chars().count() > 2).then(|| name.to_string())
}

fn address_pairs(text: &str, ctx: &RuleContext<'_>) -> Option<String> {
    resolve_store_from_pairs(&collect_address_pairs(text), ctx.billing_addresses)
}

/// The word after the customer's name, e.g. "Menkind Guildford".
fn customer_marker_word(text: &str, ctx: &RuleContext<'_>) -> Option<String> {
    ctx.customer_marker?
        .word_after()?
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|word| !CUSTOMER_SKIP_WORDS.contains(&word.to_lowercase().as_str()))
}

lazy_static! {
    static ref STORE_RULES: RuleCascade<String> = RuleCascade::new(
        FieldKind::StoreName,
        vec![
            Rule::pattern("store.aaw.site", RuleScope::Supplier("AAW"), 100, &AAW_SITE, store),
            Rule::pattern("store.cjl.subject", RuleScope::Supplier("CJL"), 100, &SUBJECT_BLOCK, last_line),
            Rule::pattern("store.amazon.po_detail", RuleScope::Supplier("AMAZON"), 100, &AMAZON_PO_DETAIL, amazon_po_store),
            Rule::pattern("store.amazon.delivery", RuleScope::Supplier("AMAZON"), 110, &DELIVERY_ADDRESS_BLOCK, amazon_delivery),
            Rule::pattern("store.aps.install_address", RuleScope::Supplier("APS"), 100, &INSTALL_ADDRESS_BLOCK, first_line),
            Rule::pattern("store.site_address", RuleScope::Any, 200, &SITE_ADDRESS_BLOCK, site_address),
            Rule::pattern("store.site_name", RuleScope::Any, 210, &SITE_NAME, site_name),
            Rule::pattern("store.shopping_centre", RuleScope::Any, 220, &SHOPPING_CENTRE, store),
            Rule::pattern("store.units", RuleScope::Any, 230, &UNITS_LOCATION, store),
            Rule::pattern("store.reference", RuleScope::Any, 240, &REFERENCE_LOCATION, store),
            Rule::derived("store.address_pairs", RuleScope::Any, 260, address_pairs),
            Rule::derived("store.customer_marker", RuleScope::Any, 270, customer_marker_word),
            Rule::pattern("store.var37", RuleScope::Any, 280, &VAR37_REFERENCE, store),
        ],
    );
}

pub fn store_rules() -> &'static RuleCascade<String> {
    &STORE_RULES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::{CustomerMarker, FieldExtractor};
    use pretty_assertions::assert_eq;

    fn billing() -> Vec<AddressPair> {
        vec![AddressPair::new("Dorking", "RH4 1XA")]
    }

    #[test]
    fn test_duplicated_city_and_billing_pair_leave_store_absent() {
        let pairs = vec![
            AddressPair::new("Dorking", "RH4 1XA"),
            AddressPair::new("Maidstone", "ME1 2AB"),
            AddressPair::new("Maidstone", "ME1 2AB"),
        ];
        assert_eq!(resolve_store_from_pairs(&pairs, &billing()), None);
    }

    #[test]
    fn test_single_remaining_pair_is_store() {
        let pairs = vec![
            AddressPair::new("Dorking", "RH4 1XA"),
            AddressPair::new("Maidstone", "ME1 2AB"),
        ];
        assert_eq!(resolve_store_from_pairs(&pairs, &billing()), Some("Maidstone".to_string()));
    }

    #[test]
    fn test_several_remaining_pairs_leave_store_absent() {
        let pairs = vec![
            AddressPair::new("Maidstone", "ME1 2AB"),
            AddressPair::new("Brighton", "BN1 1AA"),
        ];
        assert_eq!(resolve_store_from_pairs(&pairs, &billing()), None);
        assert_eq!(resolve_store_from_pairs(&[], &billing()), None);
    }

    #[test]
    fn test_billing_match_ignores_case_and_spacing() {
        let pairs = vec![AddressPair::new("DORKING", "RH41XA")];
        assert_eq!(resolve_store_from_pairs(&pairs, &billing()), None);
    }

    #[test]
    fn test_collect_pairs_from_merged_line() {
        let text = "Invoice To: Menkind, Dorking, RH4 1XA    Deliver To: Unit 5, Maidstone ME1  2AB";
        assert_eq!(
            collect_address_pairs(text),
            vec![
                AddressPair::new("Dorking", "RH4 1XA"),
                AddressPair::new("Maidstone", "ME1 2AB"),
            ]
        );
    }

    #[test]
    fn test_store_table() {
        let cases: &[(&str, Option<&str>, &str, &str)] = &[
            ("Site\nMenkind Limited - Maidstone - Address", Some("AAW"), "Maidstone", "store.aaw.site"),
            ("Subject :\nShop refit\nPortsmouth\n# Item", Some("CJL"), "Portsmouth", "store.cjl.subject"),
            ("PO ORD816 (Leicester 7820)", Some("AMAZON"), "Leicester", "store.amazon.po_detail"),
            (
                "Delivery address\nJo Bloggs\nMenkind\nLeicester\n12 High St\nSold by X",
                Some("AMAZON"),
                "Leicester",
                "store.amazon.delivery",
            ),
            ("INSTALL ADDRESS\nMenkind Bluewater\nGreenhithe\n\nNET TOTAL", Some("APS"), "Menkind Bluewater", "store.aps.install_address"),
            (
                "SITE ADDRESS:\nUnit 12\nHigh Street\nBasingstoke RG21 7LJ\nSite Ref 9",
                None,
                "Basingstoke",
                "store.site_address",
            ),
            ("Site Name: Menkind Bluewater", None, "Bluewater", "store.site_name"),
            ("Works at Westfield Shopping Centre", None, "Westfield", "store.shopping_centre"),
            ("Repairs to Units 4-6, Brighton", None, "Brighton", "store.units"),
            ("Reference MK123 - Chester", None, "Chester", "store.reference"),
            (
                "Sparks Ltd, Reading RG1 1AA\nTo: Menkind, Dorking, RH4 1XA    Site: Unit 3, Maidstone ME1 2AB\nReading RG1 1AA",
                None,
                "Maidstone",
                "store.address_pairs",
            ),
            ("Deliver to Menkind Ltd\nMenkind Guildford", None, "Guildford", "store.customer_marker"),
            ("##VAR37 Bristol##", None, "Bristol", "store.var37"),
        ];
        let billing = billing();
        let marker = CustomerMarker::new("Menkind");
        for (text, supplier, expected, rule_id) in cases {
            let ctx = RuleContext::new(*supplier, "x.pdf")
                .with_billing_addresses(&billing)
                .with_customer_marker(&marker);
            let m = store_rules()
                .extract(text, &ctx)
                .unwrap_or_else(|| panic!("no store for {:?}", text));
            assert_eq!(m.value, *expected, "text {:?}", text);
            assert_eq!(m.rule_id, *rule_id, "text {:?}", text);
        }
    }

    #[test]
    fn test_store_absent() {
        let billing = billing();
        let ctx = RuleContext::new(None, "x.pdf").with_billing_addresses(&billing);
        assert!(store_rules().extract("Menkind Ltd\nDorking, RH4 1XA", &ctx).is_none());
    }
}
