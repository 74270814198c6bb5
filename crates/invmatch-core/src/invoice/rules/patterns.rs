//! Regex patterns for supplier invoice extraction.
//!
//! Amount captures are deliberately loose (`[\d,]+(?:\.\d+)?`); the accepting
//! predicate decides whether the captured text is a currency amount.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Invoice numbers
    pub static ref INVOICE_NO: Regex = Regex::new(
        r"(?i)Invoice\s+No\.?\s+(\S+)"
    ).unwrap();

    pub static ref INVOICE_NUMBER_COLON: Regex = Regex::new(
        r"(?i)Invoice\s+Number\s*:\s*(\S+)"
    ).unwrap();

    pub static ref INVOICE_NUMBER_BARE: Regex = Regex::new(
        r"(?i)Invoice\s+Number\s+([A-Z0-9][\w-]+)"
    ).unwrap();

    pub static ref INVOICE_DIGITS: Regex = Regex::new(
        r"(?i)INVOICE\s+(\d[\d/.]+)"
    ).unwrap();

    pub static ref INVOICE_HASH: Regex = Regex::new(
        r"(?i)Invoice\s+#:?\s*(\S+)"
    ).unwrap();

    pub static ref INV_HASH: Regex = Regex::new(
        r"(?i)\bINV\s*#?\s*([A-Z0-9]+)"
    ).unwrap();

    pub static ref INVOICE_NO_COLON: Regex = Regex::new(
        r"(?i)Invoice\s+No\s*:\s*(\S+)"
    ).unwrap();

    pub static ref REF_LONG: Regex = Regex::new(
        r"(?i)\bRef\s+(\d{7,})"
    ).unwrap();

    pub static ref DOC_NO_LONG: Regex = Regex::new(
        r"(?i)Doc\s+No\.\s+(\d{7,})"
    ).unwrap();

    pub static ref FILENAME_INV: Regex = Regex::new(
        r"(?i)INV(\d+)"
    ).unwrap();

    pub static ref FILENAME_PSI: Regex = Regex::new(
        r"(?i)PSI(\d+)"
    ).unwrap();

    pub static ref AAW_INVOICE_NO: Regex = Regex::new(
        r"(?i)Invoice\s+No[:\s]+(\d+)"
    ).unwrap();

    pub static ref CJL_INVOICE: Regex = Regex::new(
        r"(?i)Invoice[^\d]*#?\s*(\d+)"
    ).unwrap();

    pub static ref AMAZON_INVOICE_LONG: Regex = Regex::new(
        r"(?i)Invoice\s*#\s*\n?\s*([A-Z0-9]{10,})"
    ).unwrap();

    pub static ref AMAZON_INVOICE: Regex = Regex::new(
        r"(?i)Invoice\s*#\s*([A-Z0-9]+)"
    ).unwrap();

    pub static ref APS_INVOICE: Regex = Regex::new(
        r"(?i)Invoice\s+(?:No\.?|#)?\s*:?\s*(\d+)"
    ).unwrap();

    pub static ref APS_NO_DOT: Regex = Regex::new(
        r"(?i)\bNO\.\s*(\d+)"
    ).unwrap();
}

lazy_static! {
    // PO numbers: labelled fields
    pub static ref PO_DOTTED_SHAPE: Regex = Regex::new(
        r"(?i)\bP\.?O\.?\s+([A-Z]{2,4}\d{3,6})"
    ).unwrap();

    pub static ref ORDER_NUMBER_PO: Regex = Regex::new(
        r"(?i)Order\s+(?:Number|No\.?)\s*:?\s*(PO\d{4,6})"
    ).unwrap();

    pub static ref ORDER_NUMBER_SHAPE: Regex = Regex::new(
        r"(?i)Order\s+(?:Number|No\.?)\s*:?\s*([A-Z]{2,4}\d{3,6})"
    ).unwrap();

    pub static ref ORDER_NO_JOB: Regex = Regex::new(
        r"(?i)Order\s+No\./Job\s+([A-Z0-9/]+)"
    ).unwrap();

    // PO numbers: known reference shapes, matched anywhere
    pub static ref PO_SHAPE_OT: Regex = Regex::new(r"\b(OT\d{3,4})\b").unwrap();
    pub static ref PO_SHAPE_SM: Regex = Regex::new(r"\b(SM\d{3,4})\b").unwrap();
    pub static ref PO_SHAPE_ORD: Regex = Regex::new(r"\b(ORD\d{3,4})\b").unwrap();
    pub static ref PO_SHAPE_PO: Regex = Regex::new(r"\b(PO\d{4,5})\b").unwrap();
    pub static ref PO_SHAPE_PS: Regex = Regex::new(r"\b(PS\d{4,12})\b").unwrap();
    pub static ref PO_SHAPE_CJL: Regex = Regex::new(r"\b(CJL\d{3})\b").unwrap();
    pub static ref PO_SHAPE_AA: Regex = Regex::new(r"\b(AA\d{4})\b").unwrap();
    pub static ref PO_SHAPE_APS: Regex = Regex::new(r"\b(APS\d{3,4})\b").unwrap();
    pub static ref PO_SHAPE_ER: Regex = Regex::new(r"\b(ER\d{2}/\d{5})\b").unwrap();

    // PO numbers: generic labels
    pub static ref PO_LABEL: Regex = Regex::new(
        r"(?i)\b(?:PO|P\.O\.)\s+(?:No\.?|#|Number)?\s*:?\s*([A-Z0-9/]+)"
    ).unwrap();

    pub static ref ORDER_LABEL: Regex = Regex::new(
        r"(?i)Order\s+(?:No\.?|#|Number)\s*:?\s*([A-Z0-9/]+)"
    ).unwrap();

    pub static ref PURCHASE_ORDER_LABEL: Regex = Regex::new(
        r"(?i)Purchase\s+Order\s*:?\s*([A-Z0-9/]+)"
    ).unwrap();

    // PO validity
    pub static ref PO_REJECT_PERSON: Regex = Regex::new(r"^[A-Z][a-z]+\s+[A-Z][a-z]+").unwrap();
    pub static ref PO_REJECT_WORDS: Regex = Regex::new(
        r"(?i)^(?:REPLACEMENT|E-?MAIL|CALLED\s+THROUGH)"
    ).unwrap();
    pub static ref PO_REJECT_LETTERS: Regex = Regex::new(r"(?i)^[A-Z]{1,2}$").unwrap();

    // PO numbers: supplier layouts
    pub static ref AAW_ORDER_NO: Regex = Regex::new(
        r"(?i)Order\s+No[:\s]+(PS\d{10,12})"
    ).unwrap();

    pub static ref AAW_PS_SHAPE: Regex = Regex::new(r"(PS\d{10,12})").unwrap();

    pub static ref CJL_PO: Regex = Regex::new(
        r"(?i)P\.O\.#?\s*:?\s*(?:\d+/)?(CJL\d{3})"
    ).unwrap();

    pub static ref CJL_SHAPE_ANY_CASE: Regex = Regex::new(r"(?i)(CJL\d{3})").unwrap();

    /// `PO ORD816 (Leicester 7820)`: PO, store, nominal code.
    pub static ref AMAZON_PO_DETAIL: Regex = Regex::new(
        r"(?i)PO #?\s*(ORD\d{3,4})\s*\(([^)]+?)\s*(\d{4})\)"
    ).unwrap();

    pub static ref AMAZON_PO: Regex = Regex::new(r"(?i)PO #?\s*(ORD\d{3,4})").unwrap();

    pub static ref APS_PO: Regex = Regex::new(
        r"(?i)(?:Order|\bPO|P\.O\.)\s*(?:No\.?|#)?\s*:?\s*([A-Z0-9/]+)"
    ).unwrap();

    pub static ref APS_PO_SLASH: Regex = Regex::new(
        r"(?i)P/O\s+(?:No\.?|#)?\s*:?\s*([A-Z0-9/]+)"
    ).unwrap();
}

lazy_static! {
    // Currency amounts
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(r"^\d+\.\d{2}$").unwrap();

    // Net amounts
    pub static ref NET_GOODS_TOTAL: Regex = Regex::new(
        r"(?i)GOODS\s+TOTAL\s+£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_TOTAL_NET: Regex = Regex::new(
        r"(?i)Total\s+Net\s*:?\s*£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_JOB_TOTALS: Regex = Regex::new(
        r"(?i)Job\s+Totals?\s+£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_INVOICE_TOTALS: Regex = Regex::new(
        r"(?i)Invoice\s+Totals?\s*\n\s*£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref NET_VAT_ANALYSIS: Regex = Regex::new(
        r"(?is)VAT Analysis.*?NET\s+([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_NET_TOTAL: Regex = Regex::new(
        r"(?i)NET\s+TOTAL\s*:?\s*£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_SUB_TOTAL: Regex = Regex::new(
        r"(?i)Sub\s*Total\s*:?\s*£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_EX_VAT: Regex = Regex::new(
        r"(?i)Total\s+(?:ex|before|excl)\w*\.?\s+VAT\s*:?\s*£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref NET_WORD: Regex = Regex::new(
        r"(?i)\bNet\b\s*:?\s*£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref AAW_TOTAL: Regex = Regex::new(
        r"Total\s+£\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref CJL_SUB_TOTAL: Regex = Regex::new(
        r"(?i)Sub Total\s+([\d,]+(?:\.\d+)?)"
    ).unwrap();

    /// `Total £19.96 £4.00`: net then VAT.
    pub static ref AMAZON_NET_VAT: Regex = Regex::new(
        r"(?i)Total\s+£([\d,]+(?:\.\d+)?)\s+£([\d,]+(?:\.\d+)?)"
    ).unwrap();

    /// `20.0 % £19.96 £4.00`: net then VAT.
    pub static ref AMAZON_RATE_TABLE: Regex = Regex::new(
        r"(?i)20\.0\s*%\s+£([\d,]+(?:\.\d+)?)\s+£([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref APS_NET_TOTAL: Regex = Regex::new(
        r"(?i)NET\s+TOTAL\s+£\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();
}

lazy_static! {
    // VAT amounts
    pub static ref VAT_TOTAL: Regex = Regex::new(
        r"(?i)VAT\s+TOTAL\s+£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref VAT_AT_RATE: Regex = Regex::new(
        r"(?i)VAT\s+(?:at|@)\s+[\d.]+%\s+£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref VAT_TOTAL_VAT: Regex = Regex::new(
        r"(?i)Total\s+VAT\s+£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref VAT_NO_VAT: Regex = Regex::new(
        r"(?i)No\s+VAT\s+£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref VAT_RATE_AMOUNT: Regex = Regex::new(
        r"20\.00%\s+£([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref VAT_WORD: Regex = Regex::new(
        r"(?i)\bVAT\b\s+£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref AAW_VAT: Regex = Regex::new(
        r"VAT[^£]*£\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref CJL_STANDARD_RATE: Regex = Regex::new(
        r"(?i)Standard Rate\s*(?:\(\s*[\d.]+\s*%\s*\))?\s*:?\s*£?\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref APS_VAT: Regex = Regex::new(
        r"(?i)VAT\s+@\s+\d+%\s+£\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();
}

lazy_static! {
    // Gross totals. The optional leading word lets predicates reject
    // "NET TOTAL", "SUB TOTAL" and the like.
    pub static ref TOTAL_INVOICE_TOTAL: Regex = Regex::new(
        r"(?i)INVOICE\s+TOTAL\s+£?\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_POUND: Regex = Regex::new(
        r"(?im)(?:^|(\w+)[ \t]+)TOTAL\s+£\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_INC_VAT: Regex = Regex::new(
        r"(?i)Total\s+Inc\s+VAT\s+£?\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_INVOICE_TOTALS: Regex = Regex::new(
        r"(?i)Invoice\s+Totals?\s*\n\s*£?[\d,]+\.\d{2}\s+£?[\d,]+\.\d{2}\s+£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_JOB_TOTALS: Regex = Regex::new(
        r"(?i)Job\s+Totals?\s+£?[\d,]+\.\d{2}\s+£?[\d,]+\.\d{2}\s+£?([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_GRAND: Regex = Regex::new(
        r"(?im)(?:^|(\w+)[ \t]+)Total\b\s*(?:(?:Amount|Due|Payable)\b)?\s*:?\s*£?\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_AMOUNT_DUE: Regex = Regex::new(
        r"(?i)Amount\s+Due\s*:?\s*£?\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref TOTAL_BALANCE_DUE: Regex = Regex::new(
        r"(?i)Balance\s+Due\s*:?\s*£?\s*([\d,]+\.\d{2})"
    ).unwrap();

    pub static ref AAW_THIS_INVOICE: Regex = Regex::new(
        r"(?i)This Invoice\s+£\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref AMAZON_TOTAL_PAYABLE: Regex = Regex::new(
        r"(?i)Total payable\s+£([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref APS_TOTAL_DUE: Regex = Regex::new(
        r"(?i)TOTAL\s+DUE\s+£\s*([\d,]+(?:\.\d+)?)"
    ).unwrap();

    pub static ref CJL_TOTAL: Regex = Regex::new(
        r"(?i)\bTotal\s+£([\d,]+(?:\.\d+)?)"
    ).unwrap();
}

lazy_static! {
    // Dates
    pub static ref DATE_LONG: Regex = Regex::new(
        r"\b(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]{3,9})\.?,?\s+(\d{4})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_INVOICE_LABEL: Regex = Regex::new(
        r"(?i)(?:Invoice|Tax)\s*(?:Date|Point)[/\s]*(?:Date)?\s*:?\s*(\d{1,2}[\s/.\-]\w+[\s/.\-]\d{2,4})"
    ).unwrap();

    pub static ref DATE_LABEL_NUMERIC: Regex = Regex::new(
        r"(?i)\bDate\s*:?\s*(\d{1,2}/\d{1,2}/\d{2,4})"
    ).unwrap();

    pub static ref DATE_LABEL_LONG: Regex = Regex::new(
        r"(?i)\bDate\s+(\d{1,2}\s+\w+\s+\d{4})"
    ).unwrap();

    pub static ref INVOICE_DATE_LONG: Regex = Regex::new(
        r"(?i)Invoice Date\s*:?\s*(\d{1,2}\s+\w+\s+\d{4})"
    ).unwrap();

    pub static ref INVOICE_DATE_NUMERIC: Regex = Regex::new(
        r"(?i)Invoice Date\s*:?\s*(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})"
    ).unwrap();
}

lazy_static! {
    // Store locations
    pub static ref SITE_ADDRESS_BLOCK: Regex = Regex::new(
        r"(?is)SITE\s+ADDRESS:\s*(.*?)(?:Site\s+Ref|Order\s+No|$)"
    ).unwrap();

    pub static ref SITE_NAME: Regex = Regex::new(
        r"(?i)Site\s+Name\s*:\s*(\S+)(?:[ \t]+(\S+))?"
    ).unwrap();

    pub static ref SHOPPING_CENTRE: Regex = Regex::new(
        r"(?i)(\w+)\s+Shopping\s+Centr"
    ).unwrap();

    pub static ref UNITS_LOCATION: Regex = Regex::new(
        r"(?i)Units?\s+[\d\w]+-\d+\s*,\s*(\w+)"
    ).unwrap();

    pub static ref REFERENCE_LOCATION: Regex = Regex::new(
        r"(?i)Reference\s+\w+\s*-\s*(\w+)"
    ).unwrap();

    /// City, UK postcode. Comma optional, same line only.
    pub static ref CITY_POSTCODE: Regex = Regex::new(
        r"\b([A-Z][a-z]{2,}),?[ \t]*([A-Z]{1,2}\d[A-Z\d]?[ \t]*\d[A-Z]{2})\b"
    ).unwrap();

    pub static ref UK_POSTCODE: Regex = Regex::new(
        r"[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}"
    ).unwrap();

    pub static ref VAR37_REFERENCE: Regex = Regex::new(r"##VAR37\s+(.+?)##").unwrap();

    pub static ref AAW_SITE: Regex = Regex::new(
        r"(?i)Site\s*:?\s*\w+\s+(?:Limited|Ltd)\s*-\s*([^-\n]+)"
    ).unwrap();

    pub static ref SUBJECT_BLOCK: Regex = Regex::new(
        r"(?is)Subject\s*:(.*?)(?:#\s*Item|$)"
    ).unwrap();

    pub static ref DELIVERY_ADDRESS_BLOCK: Regex = Regex::new(
        r"(?is)Delivery address(.*?)(?:Sold by|$)"
    ).unwrap();

    pub static ref INSTALL_ADDRESS_BLOCK: Regex = Regex::new(
        r"(?is)(?:INSTALL ADDRESS|REF:)(.*?)(?:\n\n|$)"
    ).unwrap();
}

lazy_static! {
    // Descriptions
    pub static ref DESCRIPTION_LABEL: Regex = Regex::new(
        r"(?is)Description\s*:\s*(.*?)(?:\n\n|Total|Visits|$)"
    ).unwrap();

    pub static ref WORK_DESCRIPTION: Regex = Regex::new(
        r"(?is)Work\s+Description\s*:?\s*(.*?)(?:\n\n|Total|$)"
    ).unwrap();

    pub static ref DETAILS_LABEL: Regex = Regex::new(
        r"(?is)Details\s*:?\s*(.*?)(?:\n\n|Total|$)"
    ).unwrap();

    pub static ref AAW_WORKS_DESCRIPTION: Regex = Regex::new(
        r"(?is)Works Description:(.*?)Works Completed:"
    ).unwrap();

    pub static ref CJL_ITEM_DESCRIPTION: Regex = Regex::new(
        r"(?is)Item & Description.*?\d+\s+(.+?)\s+\d+\.\d+\s+\d+\.\d+"
    ).unwrap();

    pub static ref AMAZON_ORDER_INFORMATION: Regex = Regex::new(
        r"(?is)Order information(.*?)(?:Remit to|Page \d)"
    ).unwrap();

    pub static ref TEMPLATE_MARKER: Regex = Regex::new(r"##\w+.*?##").unwrap();
}
