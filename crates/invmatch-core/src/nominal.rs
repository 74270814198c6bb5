//! Nominal-code assignment for matched invoices.
//!
//! A supplier may have several nominal codes, each tied to a kind of work.
//! The code whose work description shares the most words with the invoice
//! text wins; when nothing overlaps no code is guessed.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InvmatchError, Result};
use crate::models::invoice::InvoiceRecord;
use crate::normalize::comparison_key;

/// Words shorter than this never count towards overlap.
const MIN_TOKEN_LEN: usize = 3;

/// One row of the nominal-code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominalEntry {
    /// Supplier name or registry code.
    pub supplier: String,
    pub nominal_code: String,
    /// Kind of work the code covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NominalLookup {
    Found(String),
    /// Nothing registered for the supplier, or no candidate overlapped.
    NoMapping,
}

/// Supplier to nominal-code table.
#[derive(Debug, Clone, Default)]
pub struct NominalTable {
    entries: Vec<NominalEntry>,
}

impl NominalTable {
    pub fn new(entries: Vec<NominalEntry>) -> Self {
        Self { entries }
    }

    /// Parse a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<NominalEntry> =
            serde_json::from_str(json).map_err(|e| InvmatchError::Config(format!("nominal table: {}", e)))?;
        Ok(Self::new(entries))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn entries(&self) -> &[NominalEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries registered for the invoice's supplier, by name or code.
    fn candidates(&self, invoice: &InvoiceRecord) -> Vec<&NominalEntry> {
        let keys: Vec<String> = [Some(invoice.supplier_name.as_str()), invoice.supplier_code.as_deref()]
            .into_iter()
            .flatten()
            .map(comparison_key)
            .filter(|k| !k.is_empty())
            .collect();

        self.entries
            .iter()
            .filter(|entry| {
                let supplier = comparison_key(&entry.supplier);
                !supplier.is_empty() && keys.iter().any(|k| *k == supplier)
            })
            .collect()
    }

    /// Pick the nominal code for an invoice, scoring each candidate's work
    /// description against `text`.
    ///
    /// A supplier with a single code gets it without scoring. Ties go to
    /// the entry listed first.
    pub fn lookup(&self, invoice: &InvoiceRecord, text: &str) -> NominalLookup {
        let candidates = self.candidates(invoice);
        match candidates.as_slice() {
            [] => NominalLookup::NoMapping,
            [only] => NominalLookup::Found(only.nominal_code.clone()),
            _ => {
                let text_tokens = tokens(text);
                let mut best: Option<(&NominalEntry, usize)> = None;
                for entry in candidates {
                    let score = entry
                        .description
                        .as_deref()
                        .map(|d| overlap(&tokens(d), &text_tokens))
                        .unwrap_or(0);
                    debug!(
                        "Nominal {} for {} scored {}",
                        entry.nominal_code, invoice.supplier_name, score
                    );
                    if score > best.map_or(0, |(_, s)| s) {
                        best = Some((entry, score));
                    }
                }
                best.map(|(entry, _)| NominalLookup::Found(entry.nominal_code.clone()))
                    .unwrap_or(NominalLookup::NoMapping)
            }
        }
    }
}

fn tokens(text: &str) -> HashSet<String> {
    comparison_key(text)
        .split(' ')
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(String::from)
        .collect()
}

fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> usize {
    a.intersection(b).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    const TABLE: &str = r#"[
        {"supplier": "CJL", "nominal_code": "7820"},
        {"supplier": "Sunbelt Rentals", "nominal_code": "7400", "description": "Heater hire"},
        {"supplier": "Sunbelt Rentals", "nominal_code": "7410", "description": "Dehumidifier hire and delivery"},
        {"supplier": "Sunbelt Rentals", "nominal_code": "7420", "description": "Access platform"}
    ]"#;

    fn invoice(name: &str, code: Option<&str>) -> InvoiceRecord {
        InvoiceRecord {
            document_id: "doc-1".into(),
            supplier_name: name.into(),
            supplier_code: code.map(String::from),
            invoice_number: None,
            po_number: None,
            net_amount: Decimal::new(100, 0),
            vat_amount: None,
            total_amount: None,
            currency: "GBP".into(),
            store_name: None,
            invoice_date: None,
            description: None,
            provenance: BTreeMap::new(),
        }
    }

    #[test]
    fn test_single_code_needs_no_scoring() {
        let table = NominalTable::from_json(TABLE).unwrap();
        assert_eq!(
            table.lookup(&invoice("CJL Associates", Some("CJL")), "anything"),
            NominalLookup::Found("7820".into())
        );
    }

    #[test]
    fn test_highest_overlap_wins() {
        let table = NominalTable::from_json(TABLE).unwrap();
        let sunbelt = invoice("Sunbelt Rentals", Some("SUNBELT"));
        assert_eq!(
            table.lookup(&sunbelt, "Hire of DEHUMIDIFIER, delivery to store"),
            NominalLookup::Found("7410".into())
        );
        assert_eq!(
            table.lookup(&sunbelt, "Access platform hire, 2 days"),
            NominalLookup::Found("7420".into())
        );
    }

    #[test]
    fn test_zero_overlap_is_no_mapping() {
        let table = NominalTable::from_json(TABLE).unwrap();
        let sunbelt = invoice("Sunbelt Rentals", Some("SUNBELT"));
        assert_eq!(table.lookup(&sunbelt, "Generator rental"), NominalLookup::NoMapping);
        assert_eq!(
            table.lookup(&invoice("Maxwell Jones", None), "Heater hire"),
            NominalLookup::NoMapping
        );
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            NominalTable::from_json("{not json"),
            Err(InvmatchError::Config(_))
        ));
    }
}
