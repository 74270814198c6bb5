//! Purchase-order ledger rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifies a ledger row across sheets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowKey {
    pub sheet_id: String,
    pub row_index: usize,
}

impl RowKey {
    pub fn new(sheet_id: impl Into<String>, row_index: usize) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            row_index,
        }
    }
}

/// One data row of a ledger sheet.
///
/// `row_index` is the zero-based position of the row in the raw sheet grid,
/// header and decoration rows included, so the writer can address the cell
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub sheet_id: String,
    pub row_index: usize,

    /// PO cell, whitespace-collapsed.
    pub po_number: String,

    /// Store cell, whitespace-collapsed.
    pub store_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal_code: Option<String>,

    /// Authorisation reference, if recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorised: Option<String>,

    /// Quote reference for work over the quote threshold, if recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_over_threshold: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_amount: Option<Decimal>,

    /// Supplier column, when the sheet carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// Quoted or ordered value, when the sheet carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_amount: Option<Decimal>,
}

impl LedgerRow {
    /// An otherwise empty row keyed by sheet and index.
    pub fn new(sheet_id: impl Into<String>, row_index: usize) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            row_index,
            po_number: String::new(),
            store_name: String::new(),
            nominal_code: None,
            authorised: None,
            quote_over_threshold: None,
            invoice_number: None,
            invoice_amount: None,
            supplier: None,
            po_amount: None,
        }
    }

    pub fn key(&self) -> RowKey {
        RowKey::new(self.sheet_id.clone(), self.row_index)
    }

    /// Whether the row already carries an invoice number.
    pub fn is_invoiced(&self) -> bool {
        self.invoice_number
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty())
    }

    /// One-based row number as shown by spreadsheet tools.
    pub fn display_row(&self) -> usize {
        self.row_index + 1
    }
}
