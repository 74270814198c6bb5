//! String canonicalization for display, comparison and PO lookup.

use serde::{Deserialize, Serialize};

/// A normalized value: the display string plus its comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Normalized {
    /// Whitespace-collapsed original.
    pub display: String,
    /// Lowercase, punctuation-free key for equality and similarity.
    pub key: String,
}

impl Normalized {
    pub fn new(raw: &str) -> Self {
        let display = normalize(raw);
        let key = comparison_key(&display);
        Self { display, key }
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }
}

/// Collapse control characters and whitespace runs to single spaces and trim.
///
/// Multi-line cell values become a single line. Idempotent.
pub fn normalize(raw: &str) -> String {
    raw.split(|c: char| c.is_whitespace() || c.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive, punctuation-stripped key.
pub fn comparison_key(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .flat_map(char::to_lowercase)
        .collect();
    normalize(&mapped)
}

/// Normalize each line of a document, keeping line structure.
///
/// Blank lines are kept as empty lines so block-terminating rules still see
/// paragraph breaks.
pub fn normalize_document(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace(['\r', '\u{000c}'], "\n")
        .lines()
        .map(normalize)
        .collect::<Vec<_>>()
        .join("\n")
}

/// PO token: every whitespace or control character removed, uppercased.
pub fn po_token(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Bidirectional containment of PO tokens. Empty tokens never match.
pub fn po_contains(a: &str, b: &str) -> bool {
    let a = po_token(a);
    let b = po_token(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// ISO code for a currency symbol or code.
pub fn currency_code(symbol: &str) -> Option<&'static str> {
    match symbol.trim().to_uppercase().as_str() {
        "£" | "GBP" => Some("GBP"),
        "€" | "EUR" => Some("EUR"),
        "$" | "USD" => Some("USD"),
        _ => None,
    }
}

/// Currency of a document, from the first currency symbol or code in it.
pub fn detect_currency(text: &str) -> Option<&'static str> {
    text.char_indices().find_map(|(i, c)| match c {
        '£' | '€' | '$' => currency_code(&text[i..i + c.len_utf8()]),
        _ => None,
    })
}
