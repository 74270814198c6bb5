//! Net, VAT and gross amount rules, plus amount reconciliation.

use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Captures;
use rust_decimal::Decimal;

use super::patterns::*;
use super::{group, Rule, RuleCascade, RuleContext, RuleScope};
use crate::models::invoice::FieldKind;

/// VAT figures at or above this are registration numbers, not amounts.
const VAT_CEILING: i64 = 100_000;

/// Words that, printed before "Total", mean the figure is not a gross total.
const NON_GROSS_PREFIXES: &[&str] = &["net", "sub", "goods", "vat", "job"];

/// Parse a currency amount. A two-digit decimal part is required, so dates
/// and bare integers (quantities, years) are rejected.
pub fn parse_currency_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '£' | '$' | '€' | ','))
        .collect();

    if !CURRENCY_AMOUNT.is_match(&cleaned) {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

fn positive_in(caps: &Captures<'_>, index: usize) -> Option<Decimal> {
    group(caps, index)
        .and_then(parse_currency_amount)
        .filter(|a| *a > Decimal::ZERO)
}

fn vat_in(caps: &Captures<'_>, index: usize) -> Option<Decimal> {
    positive_in(caps, index).filter(|a| *a < Decimal::from(VAT_CEILING))
}

fn amount(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<Decimal> {
    positive_in(caps, 1)
}

fn second_amount(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<Decimal> {
    positive_in(caps, 2)
}

fn vat(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<Decimal> {
    vat_in(caps, 1)
}

fn second_vat(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<Decimal> {
    vat_in(caps, 2)
}

/// Gross total, unless the label reads "Net Total", "Sub Total" or similar.
fn gross_total(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<Decimal> {
    if let Some(prefix) = group(caps, 1) {
        let prefix = prefix.to_lowercase();
        if NON_GROSS_PREFIXES.contains(&prefix.as_str()) {
            return None;
        }
    }
    positive_in(caps, 2)
}

lazy_static! {
    static ref NET_RULES: RuleCascade<Decimal> = RuleCascade::new(
        FieldKind::NetAmount,
        vec![
            Rule::pattern("net.cjl.sub_total", RuleScope::Supplier("CJL"), 100, &CJL_SUB_TOTAL, amount),
            Rule::pattern("net.amazon.total_pair", RuleScope::Supplier("AMAZON"), 100, &AMAZON_NET_VAT, amount),
            Rule::pattern("net.amazon.rate_table", RuleScope::Supplier("AMAZON"), 110, &AMAZON_RATE_TABLE, amount),
            Rule::pattern("net.aps.net_total", RuleScope::Supplier("APS"), 100, &APS_NET_TOTAL, amount),
            Rule::pattern("net.goods_total", RuleScope::Any, 200, &NET_GOODS_TOTAL, amount),
            Rule::pattern("net.total_net", RuleScope::Any, 205, &NET_TOTAL_NET, amount),
            Rule::pattern("net.job_totals", RuleScope::Any, 210, &NET_JOB_TOTALS, amount),
            Rule::pattern("net.invoice_totals", RuleScope::Any, 215, &NET_INVOICE_TOTALS, amount),
            Rule::pattern("net.vat_analysis", RuleScope::Any, 220, &NET_VAT_ANALYSIS, amount),
            Rule::pattern("net.net_total", RuleScope::Any, 225, &NET_NET_TOTAL, amount),
            Rule::pattern("net.sub_total", RuleScope::Any, 230, &NET_SUB_TOTAL, amount),
            Rule::pattern("net.ex_vat", RuleScope::Any, 235, &NET_EX_VAT, amount),
            // AAW prints the net figure as a bare "Total £"; explicit net
            // labels above still win when present.
            Rule::pattern("net.aaw.total", RuleScope::Supplier("AAW"), 250, &AAW_TOTAL, amount),
            Rule::pattern("net.word", RuleScope::Any, 290, &NET_WORD, amount),
        ],
    );

    static ref VAT_RULES: RuleCascade<Decimal> = RuleCascade::new(
        FieldKind::VatAmount,
        vec![
            Rule::pattern("vat.aaw.vat", RuleScope::Supplier("AAW"), 100, &AAW_VAT, vat),
            Rule::pattern("vat.cjl.standard_rate", RuleScope::Supplier("CJL"), 100, &CJL_STANDARD_RATE, vat),
            Rule::pattern("vat.amazon.total_pair", RuleScope::Supplier("AMAZON"), 100, &AMAZON_NET_VAT, second_vat),
            Rule::pattern("vat.amazon.rate_table", RuleScope::Supplier("AMAZON"), 110, &AMAZON_RATE_TABLE, second_vat),
            Rule::pattern("vat.aps.at_rate", RuleScope::Supplier("APS"), 100, &APS_VAT, vat),
            Rule::pattern("vat.vat_total", RuleScope::Any, 200, &VAT_TOTAL, vat),
            Rule::pattern("vat.at_rate", RuleScope::Any, 205, &VAT_AT_RATE, vat),
            Rule::pattern("vat.total_vat", RuleScope::Any, 210, &VAT_TOTAL_VAT, vat),
            Rule::pattern("vat.no_vat", RuleScope::Any, 215, &VAT_NO_VAT, vat),
            Rule::pattern("vat.rate_amount", RuleScope::Any, 220, &VAT_RATE_AMOUNT, vat),
            Rule::pattern("vat.word", RuleScope::Any, 290, &VAT_WORD, vat),
        ],
    );

    static ref TOTAL_RULES: RuleCascade<Decimal> = RuleCascade::new(
        FieldKind::TotalAmount,
        vec![
            Rule::pattern("total.aaw.this_invoice", RuleScope::Supplier("AAW"), 100, &AAW_THIS_INVOICE, amount),
            Rule::pattern("total.amazon.payable", RuleScope::Supplier("AMAZON"), 100, &AMAZON_TOTAL_PAYABLE, amount),
            Rule::pattern("total.aps.total_due", RuleScope::Supplier("APS"), 100, &APS_TOTAL_DUE, amount),
            Rule::pattern("total.cjl.total", RuleScope::Supplier("CJL"), 100, &CJL_TOTAL, amount),
            Rule::pattern("total.invoice_total", RuleScope::Any, 200, &TOTAL_INVOICE_TOTAL, amount),
            Rule::pattern("total.pound", RuleScope::Any, 205, &TOTAL_POUND, gross_total),
            Rule::pattern("total.inc_vat", RuleScope::Any, 210, &TOTAL_INC_VAT, amount),
            Rule::pattern("total.invoice_totals", RuleScope::Any, 215, &TOTAL_INVOICE_TOTALS, amount),
            Rule::pattern("total.job_totals", RuleScope::Any, 220, &TOTAL_JOB_TOTALS, amount),
            Rule::pattern("total.grand", RuleScope::Any, 230, &TOTAL_GRAND, gross_total),
            Rule::pattern("total.amount_due", RuleScope::Any, 240, &TOTAL_AMOUNT_DUE, amount),
            Rule::pattern("total.balance_due", RuleScope::Any, 245, &TOTAL_BALANCE_DUE, amount),
        ],
    );
}

pub fn net_amount_rules() -> &'static RuleCascade<Decimal> {
    &NET_RULES
}

pub fn vat_amount_rules() -> &'static RuleCascade<Decimal> {
    &VAT_RULES
}

pub fn total_amount_rules() -> &'static RuleCascade<Decimal> {
    &TOTAL_RULES
}

/// An amount and the rule (or derivation) that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedAmount {
    pub value: Decimal,
    pub rule_id: String,
}

impl SourcedAmount {
    pub fn new(value: Decimal, rule_id: impl Into<String>) -> Self {
        Self {
            value,
            rule_id: rule_id.into(),
        }
    }
}

/// Net, VAT and gross after filling gaps from each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledAmounts {
    pub net: Option<SourcedAmount>,
    pub vat: Option<SourcedAmount>,
    pub total: Option<SourcedAmount>,
}

/// Fill missing amounts from the ones found.
///
/// `gross_only_rate` enables deriving net from a lone gross figure for
/// layouts that print nothing else.
pub fn reconcile_amounts(
    net: Option<SourcedAmount>,
    vat: Option<SourcedAmount>,
    total: Option<SourcedAmount>,
    gross_only_rate: Option<Decimal>,
) -> ReconciledAmounts {
    let mut amounts = ReconciledAmounts { net, vat, total };

    if amounts.net.is_none() {
        if let (Some(total), Some(vat)) = (&amounts.total, &amounts.vat) {
            let net = total.value - vat.value;
            if net > Decimal::ZERO {
                amounts.net = Some(SourcedAmount::new(net, "derived.net_from_total_minus_vat"));
            }
        }
    }

    if amounts.net.is_none() && amounts.vat.is_none() {
        if let (Some(total), Some(rate)) = (&amounts.total, gross_only_rate) {
            let net = (total.value / (Decimal::ONE + rate)).round_dp(2);
            amounts.net = Some(SourcedAmount::new(net, "derived.net_from_gross"));
        }
    }

    if amounts.vat.is_none() {
        if let (Some(net), Some(total)) = (&amounts.net, &amounts.total) {
            let vat = total.value - net.value;
            if vat >= Decimal::ZERO {
                amounts.vat = Some(SourcedAmount::new(vat, "derived.vat_from_total_minus_net"));
            }
        }
    }

    if amounts.total.is_none() {
        if let (Some(net), Some(vat)) = (&amounts.net, &amounts.vat) {
            amounts.total = Some(SourcedAmount::new(
                net.value + vat.value,
                "derived.total_from_net_plus_vat",
            ));
        }
    }

    amounts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::FieldExtractor;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_currency_amount() {
        let cases = [
            ("573.00", Some("573.00")),
            ("£1,234.56", Some("1234.56")),
            ("£ 68.20", Some("68.20")),
            ("14/01/2026", None),
            ("573", None),
            ("12.5", None),
            ("", None),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_currency_amount(input), expected.map(dec), "input {:?}", input);
        }
    }

    #[test]
    fn test_net_table() {
        // (text, supplier, expected net, rule id)
        let cases: &[(&str, Option<&str>, &str, &str)] = &[
            ("NET TOTAL £573.00\nTotal £687.60", None, "573.00", "net.net_total"),
            ("GOODS TOTAL 69.90\nVAT TOTAL 13.98\nINVOICE TOTAL 83.88", None, "69.90", "net.goods_total"),
            ("Total Net 218.00", None, "218.00", "net.total_net"),
            ("Job Totals £132.30 £26.46 £158.76", None, "132.30", "net.job_totals"),
            ("Invoice Totals\n£132.30 £26.46 £158.76", None, "132.30", "net.invoice_totals"),
            ("VAT Analysis\nRate 20%\nNET 95.00 VAT 19.00", None, "95.00", "net.vat_analysis"),
            ("Subtotal: £1,250.00", None, "1250.00", "net.sub_total"),
            ("Total excl. VAT £40.00", None, "40.00", "net.ex_vat"),
            ("Net 30 days\nNet £12.50", None, "12.50", "net.word"),
            ("Sub Total 518.00", Some("CJL"), "518.00", "net.cjl.sub_total"),
            ("Total £ 116.50\nThis Invoice £ 139.80", Some("AAW"), "116.50", "net.aaw.total"),
            ("Total £19.96 £4.00", Some("AMAZON"), "19.96", "net.amazon.total_pair"),
            ("20.0 % £19.96 £4.00", Some("AMAZON"), "19.96", "net.amazon.rate_table"),
            ("NET TOTAL £ 573.00", Some("APS"), "573.00", "net.aps.net_total"),
        ];
        for (text, supplier, expected, rule_id) in cases {
            let ctx = RuleContext::new(*supplier, "x.pdf");
            let m = net_amount_rules()
                .extract(text, &ctx)
                .unwrap_or_else(|| panic!("no net for {:?}", text));
            assert_eq!(m.value, dec(expected), "text {:?}", text);
            assert_eq!(m.rule_id, *rule_id, "text {:?}", text);
        }
    }

    #[test]
    fn test_net_label_beats_generic_total() {
        let ctx = RuleContext::new(None, "x.pdf");
        let text = "Total £687.60\nNET TOTAL £573.00";
        assert_eq!(net_amount_rules().extract(text, &ctx).unwrap().value, dec("573.00"));
        let total = total_amount_rules().extract(text, &ctx).unwrap();
        assert_eq!(total.value, dec("687.60"));
        assert_eq!(total.rule_id, "total.pound");
    }

    #[test]
    fn test_net_rejects_dates_and_integers() {
        let ctx = RuleContext::new(None, "x.pdf");
        assert!(net_amount_rules().extract("Net 14/01/2026", &ctx).is_none());
        assert!(net_amount_rules().extract("Net 573", &ctx).is_none());
    }

    #[test]
    fn test_vat_table() {
        let cases: &[(&str, Option<&str>, Option<&str>)] = &[
            ("VAT TOTAL 13.98", None, Some("13.98")),
            ("VAT at 20.00% 43.60", None, Some("43.60")),
            ("Total VAT 164.00", None, Some("164.00")),
            ("No VAT 26.27", None, Some("26.27")),
            ("20.00% £26.46", None, Some("26.46")),
            ("VAT 202.00", None, Some("202.00")),
            ("VAT 123456.00", None, None),
            ("VAT Reg 123456789", None, None),
            ("VAT @ 20.00% £ 23.30", Some("AAW"), Some("23.30")),
            ("Standard Rate (20%) 103.60", Some("CJL"), Some("103.60")),
            ("Total £19.96 £4.00", Some("AMAZON"), Some("4.00")),
            ("VAT @ 20% £ 114.60", Some("APS"), Some("114.60")),
        ];
        for (text, supplier, expected) in cases {
            let ctx = RuleContext::new(*supplier, "x.pdf");
            let got = vat_amount_rules().extract(text, &ctx).map(|m| m.value);
            assert_eq!(got, expected.map(dec), "text {:?}", text);
        }
    }

    #[test]
    fn test_total_table() {
        let cases: &[(&str, Option<&str>, &str)] = &[
            ("INVOICE TOTAL 83.88", None, "83.88"),
            ("TOTAL £984.00", None, "984.00"),
            ("Total Inc VAT 157.61", None, "157.61"),
            ("Invoice Totals\n£132.30 £26.46 £158.76", None, "158.76"),
            ("Grand Total: £250.00", None, "250.00"),
            ("Balance Due £75.00", None, "75.00"),
            ("This Invoice £ 139.80", Some("AAW"), "139.80"),
            ("Total payable £24.00", Some("AMAZON"), "24.00"),
            ("TOTAL DUE £ 687.60", Some("APS"), "687.60"),
            ("Total £621.60", Some("CJL"), "621.60"),
        ];
        for (text, supplier, expected) in cases {
            let ctx = RuleContext::new(*supplier, "x.pdf");
            let got = total_amount_rules().extract(text, &ctx).map(|m| m.value);
            assert_eq!(got, Some(dec(expected)), "text {:?}", text);
        }
    }

    #[test]
    fn test_total_skips_net_and_sub_totals() {
        let ctx = RuleContext::new(None, "x.pdf");
        assert!(total_amount_rules().extract("SUB TOTAL £100.00\nNET TOTAL £100.00", &ctx).is_none());
    }

    #[test]
    fn test_reconcile_fills_vat_and_total() {
        let r = reconcile_amounts(
            Some(SourcedAmount::new(dec("100.00"), "net.sub_total")),
            None,
            Some(SourcedAmount::new(dec("120.00"), "total.grand")),
            None,
        );
        assert_eq!(r.vat, Some(SourcedAmount::new(dec("20.00"), "derived.vat_from_total_minus_net")));

        let r = reconcile_amounts(
            Some(SourcedAmount::new(dec("100.00"), "net.sub_total")),
            Some(SourcedAmount::new(dec("20.00"), "vat.word")),
            None,
            None,
        );
        assert_eq!(r.total, Some(SourcedAmount::new(dec("120.00"), "derived.total_from_net_plus_vat")));
    }

    #[test]
    fn test_reconcile_net_from_total_minus_vat() {
        let r = reconcile_amounts(
            None,
            Some(SourcedAmount::new(dec("26.46"), "vat.rate_amount")),
            Some(SourcedAmount::new(dec("158.76"), "total.grand")),
            None,
        );
        assert_eq!(r.net, Some(SourcedAmount::new(dec("132.30"), "derived.net_from_total_minus_vat")));
    }

    #[test]
    fn test_reconcile_gross_only() {
        let r = reconcile_amounts(
            None,
            None,
            Some(SourcedAmount::new(dec("24.00"), "total.amazon.payable")),
            Some(dec("0.20")),
        );
        assert_eq!(r.net.as_ref().map(|a| a.value), Some(dec("20.00")));
        assert_eq!(r.vat.as_ref().map(|a| a.value), Some(dec("4.00")));

        let untouched = reconcile_amounts(
            None,
            None,
            Some(SourcedAmount::new(dec("24.00"), "total.grand")),
            None,
        );
        assert_eq!(untouched.net, None);
    }
}
