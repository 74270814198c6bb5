//! Invoice number and PO number rules.

use lazy_static::lazy_static;
use regex::Captures;

use super::patterns::*;
use super::{group, Rule, RuleCascade, RuleContext, RuleScope};
use crate::models::invoice::FieldKind;

/// Words Amazon layouts print after "Invoice #" that are not numbers.
const AMAZON_NON_NUMBERS: &[&str] = &["DATE", "NUMBER", "NO", "INVOICE"];

/// An invoice number must carry a digit and be at least two characters.
pub fn is_valid_invoice_number(candidate: &str) -> bool {
    candidate.chars().count() >= 2 && candidate.chars().any(|c| c.is_ascii_digit())
}

/// Reject person names, free-text markers and bare letters.
pub fn is_valid_po(candidate: &str) -> bool {
    if candidate.chars().count() < 2 {
        return false;
    }
    if PO_REJECT_PERSON.is_match(candidate)
        || PO_REJECT_WORDS.is_match(candidate)
        || PO_REJECT_LETTERS.is_match(candidate)
    {
        return false;
    }
    candidate.chars().any(|c| c.is_ascii_digit())
}

fn invoice_number(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    let value = group(caps, 1)?.trim_end_matches(['.', ',', ';', ':']);
    is_valid_invoice_number(value).then(|| value.to_string())
}

fn amazon_invoice_number(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<String> {
    let value = group(caps, 1)?;
    if AMAZON_NON_NUMBERS.contains(&value.to_uppercase().as_str()) {
        return None;
    }
    invoice_number(caps, ctx)
}

fn filename_inv(_text: &str, ctx: &RuleContext<'_>) -> Option<String> {
    FILENAME_INV
        .captures(ctx.filename)
        .map(|caps| format!("INV{}", &caps[1]))
}

fn filename_psi(_text: &str, ctx: &RuleContext<'_>) -> Option<String> {
    FILENAME_PSI
        .captures(ctx.filename)
        .map(|caps| caps[1].to_string())
}

fn aps_filename_stem(_text: &str, ctx: &RuleContext<'_>) -> Option<String> {
    let stem = ctx.filename_stem();
    (!stem.is_empty()).then(|| format!("APS_{}", stem))
}

fn po(caps: &Captures<'_>, _ctx: &RuleContext<'_>) -> Option<String> {
    let value = group(caps, 1)?;
    is_valid_po(value).then(|| value.to_string())
}

fn po_uppercase(caps: &Captures<'_>, ctx: &RuleContext<'_>) -> Option<String> {
    po(caps, ctx).map(|v| v.to_uppercase())
}

lazy_static! {
    static ref INVOICE_NUMBER_RULES: RuleCascade<String> = RuleCascade::new(
        FieldKind::InvoiceNumber,
        vec![
            Rule::pattern("invoice_number.aaw.invoice_no", RuleScope::Supplier("AAW"), 100, &AAW_INVOICE_NO, invoice_number),
            Rule::pattern("invoice_number.cjl.invoice", RuleScope::Supplier("CJL"), 100, &CJL_INVOICE, invoice_number),
            Rule::pattern("invoice_number.amazon.long", RuleScope::Supplier("AMAZON"), 100, &AMAZON_INVOICE_LONG, amazon_invoice_number),
            Rule::pattern("invoice_number.amazon.hash", RuleScope::Supplier("AMAZON"), 110, &AMAZON_INVOICE, amazon_invoice_number),
            Rule::pattern("invoice_number.aps.invoice", RuleScope::Supplier("APS"), 100, &APS_INVOICE, invoice_number),
            Rule::pattern("invoice_number.aps.no_dot", RuleScope::Supplier("APS"), 110, &APS_NO_DOT, invoice_number),
            Rule::pattern("invoice_number.invoice_no", RuleScope::Any, 200, &INVOICE_NO, invoice_number),
            Rule::pattern("invoice_number.number_colon", RuleScope::Any, 205, &INVOICE_NUMBER_COLON, invoice_number),
            Rule::pattern("invoice_number.number", RuleScope::Any, 210, &INVOICE_NUMBER_BARE, invoice_number),
            Rule::pattern("invoice_number.invoice_digits", RuleScope::Any, 215, &INVOICE_DIGITS, invoice_number),
            Rule::pattern("invoice_number.invoice_hash", RuleScope::Any, 220, &INVOICE_HASH, invoice_number),
            Rule::pattern("invoice_number.inv_hash", RuleScope::Any, 225, &INV_HASH, invoice_number),
            Rule::pattern("invoice_number.invoice_no_colon", RuleScope::Any, 230, &INVOICE_NO_COLON, invoice_number),
            Rule::pattern("invoice_number.ref", RuleScope::Any, 240, &REF_LONG, invoice_number),
            Rule::pattern("invoice_number.doc_no", RuleScope::Any, 245, &DOC_NO_LONG, invoice_number),
            Rule::derived("invoice_number.filename_inv", RuleScope::Any, 400, filename_inv),
            Rule::derived("invoice_number.filename_psi", RuleScope::Any, 410, filename_psi),
            Rule::derived("invoice_number.aps.filename_stem", RuleScope::Supplier("APS"), 900, aps_filename_stem),
        ],
    );

    static ref PO_NUMBER_RULES: RuleCascade<String> = RuleCascade::new(
        FieldKind::PoNumber,
        vec![
            Rule::pattern("po_number.aaw.order_no", RuleScope::Supplier("AAW"), 100, &AAW_ORDER_NO, po),
            Rule::pattern("po_number.aaw.ps_shape", RuleScope::Supplier("AAW"), 110, &AAW_PS_SHAPE, po),
            Rule::pattern("po_number.cjl.po", RuleScope::Supplier("CJL"), 100, &CJL_PO, po_uppercase),
            Rule::pattern("po_number.cjl.shape", RuleScope::Supplier("CJL"), 110, &CJL_SHAPE_ANY_CASE, po_uppercase),
            Rule::pattern("po_number.amazon.po_detail", RuleScope::Supplier("AMAZON"), 100, &AMAZON_PO_DETAIL, po_uppercase),
            Rule::pattern("po_number.amazon.po", RuleScope::Supplier("AMAZON"), 110, &AMAZON_PO, po_uppercase),
            Rule::pattern("po_number.aps.order", RuleScope::Supplier("APS"), 100, &APS_PO, po),
            Rule::pattern("po_number.aps.slash", RuleScope::Supplier("APS"), 110, &APS_PO_SLASH, po),
            Rule::pattern("po_number.dotted_shape", RuleScope::Any, 200, &PO_DOTTED_SHAPE, po),
            Rule::pattern("po_number.order_number_po", RuleScope::Any, 205, &ORDER_NUMBER_PO, po),
            Rule::pattern("po_number.order_number_shape", RuleScope::Any, 210, &ORDER_NUMBER_SHAPE, po),
            Rule::pattern("po_number.order_no_job", RuleScope::Any, 215, &ORDER_NO_JOB, po),
            Rule::pattern("po_number.shape.ot", RuleScope::Any, 300, &PO_SHAPE_OT, po),
            Rule::pattern("po_number.shape.sm", RuleScope::Any, 301, &PO_SHAPE_SM, po),
            Rule::pattern("po_number.shape.ord", RuleScope::Any, 302, &PO_SHAPE_ORD, po),
            Rule::pattern("po_number.shape.po", RuleScope::Any, 303, &PO_SHAPE_PO, po),
            Rule::pattern("po_number.shape.ps", RuleScope::Any, 304, &PO_SHAPE_PS, po),
            Rule::pattern("po_number.shape.cjl", RuleScope::Any, 305, &PO_SHAPE_CJL, po),
            Rule::pattern("po_number.shape.aa", RuleScope::Any, 306, &PO_SHAPE_AA, po),
            Rule::pattern("po_number.shape.aps", RuleScope::Any, 307, &PO_SHAPE_APS, po),
            Rule::pattern("po_number.shape.er", RuleScope::Any, 308, &PO_SHAPE_ER, po),
            Rule::pattern("po_number.po_label", RuleScope::Any, 400, &PO_LABEL, po),
            Rule::pattern("po_number.order_label", RuleScope::Any, 405, &ORDER_LABEL, po),
            Rule::pattern("po_number.purchase_order", RuleScope::Any, 410, &PURCHASE_ORDER_LABEL, po),
        ],
    );
}

pub fn invoice_number_rules() -> &'static RuleCascade<String> {
    &INVOICE_NUMBER_RULES
}

pub fn po_number_rules() -> &'static RuleCascade<String> {
    &PO_NUMBER_RULES
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::FieldExtractor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invoice_number_table() {
        // (text, supplier, filename, expected value, rule id)
        let cases: &[(&str, Option<&str>, &str, &str, &str)] = &[
            ("Invoice No. 577608", None, "x.pdf", "577608", "invoice_number.invoice_no"),
            ("Invoice No. 5771.", None, "x.pdf", "5771", "invoice_number.invoice_no"),
            ("Invoice Number :INV29453", None, "x.pdf", "INV29453", "invoice_number.number_colon"),
            ("Invoice Number SI-3276", None, "x.pdf", "SI-3276", "invoice_number.number"),
            ("INVOICE 3771211383", None, "x.pdf", "3771211383", "invoice_number.invoice_digits"),
            ("Invoice #: 12345", None, "x.pdf", "12345", "invoice_number.invoice_hash"),
            ("INV#12345", None, "x.pdf", "12345", "invoice_number.inv_hash"),
            ("Invoice No: 28439487", None, "x.pdf", "28439487", "invoice_number.invoice_no_colon"),
            ("Ref 0000031483", None, "x.pdf", "0000031483", "invoice_number.ref"),
            ("Doc No. 0000031483", None, "x.pdf", "0000031483", "invoice_number.doc_no"),
            ("nothing here", None, "INV29453.pdf", "INV29453", "invoice_number.filename_inv"),
            ("nothing here", None, "PSI577608.pdf", "577608", "invoice_number.filename_psi"),
            ("Invoice No 5002746", Some("AAW"), "x.pdf", "5002746", "invoice_number.aaw.invoice_no"),
            ("INVOICE # 1234", Some("CJL"), "x.pdf", "1234", "invoice_number.cjl.invoice"),
            ("Invoice #\nGB5ABCDEF12345", Some("AMAZON"), "x.pdf", "GB5ABCDEF12345", "invoice_number.amazon.long"),
            ("Invoice # AB123", Some("AMAZON"), "x.pdf", "AB123", "invoice_number.amazon.hash"),
            ("Invoice No: 71234", Some("APS"), "x.pdf", "71234", "invoice_number.aps.invoice"),
            ("NO. 8812", Some("APS"), "x.pdf", "8812", "invoice_number.aps.no_dot"),
            ("blank", Some("APS"), "scan 7.pdf", "APS_scan 7", "invoice_number.aps.filename_stem"),
        ];
        for (text, supplier, filename, expected, rule_id) in cases {
            let ctx = RuleContext::new(*supplier, filename);
            let m = invoice_number_rules()
                .extract(text, &ctx)
                .unwrap_or_else(|| panic!("no invoice number for {:?}", text));
            assert_eq!(m.value, *expected, "text {:?}", text);
            assert_eq!(m.rule_id, *rule_id, "text {:?}", text);
        }
    }

    #[test]
    fn test_invoice_number_absent() {
        let ctx = RuleContext::new(None, "scan.pdf");
        assert!(invoice_number_rules().extract("Invoice No. ABC", &ctx).is_none());
    }

    #[test]
    fn test_is_valid_po() {
        let cases = [
            ("CJL408", true),
            ("ER22/10808", true),
            ("77812", true),
            ("Sam Boyle", false),
            ("REPLACEMENT", false),
            ("EMAIL123", false),
            ("E-MAIL", false),
            ("CALLED THROUGH", false),
            ("P", false),
            ("PO", false),
            ("ABC", false),
            ("1", false),
        ];
        for (candidate, expected) in cases {
            assert_eq!(is_valid_po(candidate), expected, "candidate {:?}", candidate);
        }
    }

    #[test]
    fn test_po_number_table() {
        let cases: &[(&str, Option<&str>, &str, &str)] = &[
            ("P.O. OT0363", None, "OT0363", "po_number.dotted_shape"),
            ("Order Number: PO54047", None, "PO54047", "po_number.order_number_po"),
            ("Order No./Job ER22/10808", None, "ER22/10808", "po_number.order_no_job"),
            ("Your ref SM1234 thanks", None, "SM1234", "po_number.shape.sm"),
            ("PO No: 77812", None, "77812", "po_number.po_label"),
            ("Purchase Order: 5531", None, "5531", "po_number.purchase_order"),
            ("Order No PS0301111817", Some("AAW"), "PS0301111817", "po_number.aaw.order_no"),
            ("Ref PS0301111817", Some("AAW"), "PS0301111817", "po_number.aaw.ps_shape"),
            ("P.O.# : 12/cjl408", Some("CJL"), "CJL408", "po_number.cjl.po"),
            ("PO ORD816 (Leicester 7820)", Some("AMAZON"), "ORD816", "po_number.amazon.po_detail"),
            ("PO #ORD816", Some("AMAZON"), "ORD816", "po_number.amazon.po"),
            ("P/O No: 4411", Some("APS"), "4411", "po_number.aps.slash"),
        ];
        for (text, supplier, expected, rule_id) in cases {
            let ctx = RuleContext::new(*supplier, "x.pdf");
            let m = po_number_rules()
                .extract(text, &ctx)
                .unwrap_or_else(|| panic!("no PO for {:?}", text));
            assert_eq!(m.value, *expected, "text {:?}", text);
            assert_eq!(m.rule_id, *rule_id, "text {:?}", text);
        }
    }

    #[test]
    fn test_po_rejects() {
        let ctx = RuleContext::new(None, "x.pdf");
        for text in ["PO REPLACEMENT", "Order No: EMAIL123", "Clients Ord Ref. : Called through"] {
            assert!(po_number_rules().extract(text, &ctx).is_none(), "text {:?}", text);
        }
    }
}
