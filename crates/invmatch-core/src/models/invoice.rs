//! Extracted invoice record.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields the extractor knows how to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Supplier,
    InvoiceNumber,
    PoNumber,
    NetAmount,
    VatAmount,
    TotalAmount,
    StoreName,
    InvoiceDate,
    Description,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supplier => "supplier",
            Self::InvoiceNumber => "invoice_number",
            Self::PoNumber => "po_number",
            Self::NetAmount => "net_amount",
            Self::VatAmount => "vat_amount",
            Self::TotalAmount => "total_amount",
            Self::StoreName => "store_name",
            Self::InvoiceDate => "invoice_date",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An invoice as extracted from a single document.
///
/// `supplier_name` and `net_amount` are always present; every other field is
/// optional. `provenance` names the rule that produced each populated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Id of the document this record came from.
    pub document_id: String,

    /// Canonical supplier name.
    pub supplier_name: String,

    /// Registry code of the supplier, `None` when the supplier is not registered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,

    /// Invoice value excluding VAT.
    pub net_amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_amount: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    /// ISO currency code.
    pub currency: String,

    /// Store or delivery location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,

    /// Work description, at most 500 characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Rule id per extracted field.
    pub provenance: BTreeMap<FieldKind, String>,
}

impl InvoiceRecord {
    /// Rule that produced the given field, if it was extracted.
    pub fn rule_for(&self, field: FieldKind) -> Option<&str> {
        self.provenance.get(&field).map(String::as_str)
    }

    /// Label used in logs and reports.
    pub fn display_label(&self) -> String {
        match &self.invoice_number {
            Some(number) => format!("{} {}", self.supplier_name, number),
            None => format!("{} ({})", self.supplier_name, self.document_id),
        }
    }
}
