//! Supplier identification from document text and filename markers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One registry entry. Markers are lowercase substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierEntry {
    pub text_markers: Vec<String>,
    pub filename_markers: Vec<String>,
    pub name: String,
    pub code: String,
}

impl SupplierEntry {
    pub fn new(text_markers: &[&str], filename_markers: &[&str], name: &str, code: &str) -> Self {
        Self {
            text_markers: text_markers.iter().map(|m| m.to_lowercase()).collect(),
            filename_markers: filename_markers.iter().map(|m| m.to_lowercase()).collect(),
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    fn matches(&self, text_lower: &str, filename_lower: &str) -> bool {
        self.text_markers.iter().any(|m| text_lower.contains(m.as_str()))
            || self
                .filename_markers
                .iter()
                .any(|m| filename_lower.contains(m.as_str()))
    }
}

/// Outcome of supplier identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Supplier {
    Known { name: String, code: String },
    Unknown,
}

impl Supplier {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Known { code, .. } => Some(code),
            Self::Unknown => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Known { name, .. } => Some(name),
            Self::Unknown => None,
        }
    }
}

/// Ordered supplier registry. The first matching entry wins, so specific
/// markers must precede broad ones.
#[derive(Debug, Clone)]
pub struct SupplierRegistry {
    entries: Vec<SupplierEntry>,
}

impl SupplierRegistry {
    pub fn new(entries: Vec<SupplierEntry>) -> Self {
        Self { entries }
    }

    /// Registry of the suppliers with known invoice layouts.
    pub fn builtin() -> Self {
        Self::new(vec![
            SupplierEntry::new(&["aaw national"], &["aaw"], "AAW National Maintenance", "AAW"),
            SupplierEntry::new(&["cjl group"], &["cjl"], "CJL Associates", "CJL"),
            SupplierEntry::new(&["amazon business"], &["amazon"], "Amazon", "AMAZON"),
            SupplierEntry::new(&["automatic protection"], &["aps"], "APS Fire Systems", "APS"),
            SupplierEntry::new(&["compco fire", "compco"], &["compco"], "Compco Fire Systems", "COMPCO"),
            SupplierEntry::new(&["sunbelt"], &["sunbelt"], "Sunbelt Rentals", "SUNBELT"),
            SupplierEntry::new(&["maxwell jones", "maxwelljones"], &[], "Maxwell Jones", "MAXWELL_JONES"),
            SupplierEntry::new(&["metro security"], &[], "Metro Security", "METRO_SECURITY"),
            SupplierEntry::new(&["metsafe"], &[], "MetSafe", "METRO_SECURITY"),
            SupplierEntry::new(
                &["store maintenance", "reactive on call"],
                &[],
                "Store Maintenance",
                "STORE_MAINTENANCE",
            ),
            SupplierEntry::new(&["lampshoponline", "lampshop"], &[], "LampShopOnline", "LAMPSHOP"),
            SupplierEntry::new(&["ilux"], &[], "ILUX Lighting", "ILUX"),
            SupplierEntry::new(&["aura"], &[], "Aura Air Conditioning", "AURA"),
        ])
    }

    pub fn entries(&self) -> &[SupplierEntry] {
        &self.entries
    }

    /// Classify a document by its text and file name.
    pub fn identify(&self, text: &str, filename: &str) -> Supplier {
        let text_lower = text.to_lowercase();
        let filename_lower = filename.to_lowercase();

        let found = self
            .entries
            .iter()
            .find(|entry| entry.matches(&text_lower, &filename_lower));

        match found {
            Some(entry) => {
                debug!("Identified supplier {} ({})", entry.name, entry.code);
                Supplier::Known {
                    name: entry.name.clone(),
                    code: entry.code.clone(),
                }
            }
            None => {
                debug!("No registry marker matched {}", filename);
                Supplier::Unknown
            }
        }
    }
}

impl Default for SupplierRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

lazy_static! {
    static ref LEGAL_NAME: Regex = Regex::new(
        r"(?m)^\s*([A-Z][A-Za-z0-9&'.\- ]{1,60}?\s(?:Ltd|Limited|LLP|PLC|plc))\b\.?"
    ).unwrap();
}

/// Registered legal name printed on a document from an unregistered supplier.
///
/// Lines naming the customer are skipped; the first remaining
/// "... Ltd/Limited/LLP/PLC" line is taken.
pub fn legal_name(text: &str, customer_marker: &str) -> Option<String> {
    let marker = customer_marker.to_lowercase();
    LEGAL_NAME
        .captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .find(|name| marker.is_empty() || !name.to_lowercase().contains(&marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn known(name: &str, code: &str) -> Supplier {
        Supplier::Known {
            name: name.into(),
            code: code.into(),
        }
    }

    #[test]
    fn test_identify_table() {
        let registry = SupplierRegistry::builtin();
        let cases = [
            ("AAW National Shutters Ltd\nInvoice No 5002746", "scan.pdf", known("AAW National Maintenance", "AAW")),
            ("Invoice 123", "AAW-5002746.pdf", known("AAW National Maintenance", "AAW")),
            ("CJL Group Ltd", "x.pdf", known("CJL Associates", "CJL")),
            ("Sold by Amazon Business EU", "x.pdf", known("Amazon", "AMAZON")),
            ("Automatic Protection Systems", "x.pdf", known("APS Fire Systems", "APS")),
            ("Compco Fire Systems Ltd", "x.pdf", known("Compco Fire Systems", "COMPCO")),
            ("www.metsafe.co.uk", "x.pdf", known("MetSafe", "METRO_SECURITY")),
            ("Reactive On Call FM", "x.pdf", known("Store Maintenance", "STORE_MAINTENANCE")),
            ("LampShopOnline Ltd", "x.pdf", known("LampShopOnline", "LAMPSHOP")),
            ("Aura Air Conditioning", "x.pdf", known("Aura Air Conditioning", "AURA")),
            ("Bright Sparks Electrical", "x.pdf", Supplier::Unknown),
        ];
        for (text, filename, expected) in cases {
            assert_eq!(registry.identify(text, filename), expected, "text {:?}", text);
        }
    }

    #[test]
    fn test_first_match_wins() {
        let registry = SupplierRegistry::builtin();
        // Both markers present: the earlier entry is chosen.
        let text = "Compco Fire Systems - parts supplied via Sunbelt";
        assert_eq!(registry.identify(text, ""), known("Compco Fire Systems", "COMPCO"));

        let reordered = SupplierRegistry::new(vec![
            SupplierEntry::new(&["sunbelt"], &[], "Sunbelt Rentals", "SUNBELT"),
            SupplierEntry::new(&["compco"], &[], "Compco Fire Systems", "COMPCO"),
        ]);
        assert_eq!(reordered.identify(text, ""), known("Sunbelt Rentals", "SUNBELT"));
    }

    #[test]
    fn test_supplier_accessors() {
        let s = known("Amazon", "AMAZON");
        assert_eq!(s.code(), Some("AMAZON"));
        assert_eq!(s.name(), Some("Amazon"));
        assert_eq!(Supplier::Unknown.code(), None);
    }

    #[test]
    fn test_legal_name() {
        let text = "Invoice To\nMenkind Limited\nBright Sparks Electrical Ltd\nUnit 4";
        assert_eq!(
            legal_name(text, "Menkind"),
            Some("Bright Sparks Electrical Ltd".to_string())
        );
        assert_eq!(legal_name("Menkind Limited\nUnit 4", "Menkind"), None);
        assert_eq!(legal_name("no company here", "Menkind"), None);
    }
}
