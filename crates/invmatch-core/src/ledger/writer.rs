//! Write-back of matched invoices into a ledger sheet grid.

use tracing::debug;

use crate::error::LedgerError;
use crate::models::result::LedgerUpdate;

use super::index::{Column, LedgerIndex};

/// Format of the invoice-signed date cell.
pub const SIGNED_DATE_FORMAT: &str = "%d/%m/%Y";

/// Apply updates addressed to `index`'s sheet onto its raw grid.
///
/// Exactly three cells change per update: invoice number, invoice amount
/// and invoice-signed date. Every update is checked before any cell is
/// written, so an error leaves the grid untouched. Updates for other sheets
/// are ignored. Returns the number of rows written.
pub fn apply_updates(
    grid: &mut [Vec<String>],
    index: &LedgerIndex,
    updates: &[LedgerUpdate],
) -> Result<usize, LedgerError> {
    let sheet = index.sheet_id();
    let ours: Vec<&LedgerUpdate> = updates
        .iter()
        .filter(|u| u.sheet_id.eq_ignore_ascii_case(sheet))
        .collect();
    if ours.is_empty() {
        return Ok(0);
    }

    let columns = index.columns();
    let number_col = columns.require(sheet, Column::InvoiceNumber)?;
    let amount_col = columns.require(sheet, Column::InvoiceAmount)?;
    let signed_col = columns.require(sheet, Column::InvoiceSigned)?;

    for update in &ours {
        if update.row_index >= grid.len() || index.row(update.row_index).is_none() {
            return Err(LedgerError::RowOutOfRange {
                sheet: sheet.to_string(),
                row: update.row_index + 1,
            });
        }
    }

    let width = number_col.max(amount_col).max(signed_col) + 1;
    for update in &ours {
        let row = &mut grid[update.row_index];
        if row.len() < width {
            row.resize(width, String::new());
        }
        row[number_col] = update.invoice_number.clone();
        row[amount_col] = format!("{:.2}", update.invoice_amount);
        row[signed_col] = update.signed_on.format(SIGNED_DATE_FORMAT).to_string();
        debug!("Wrote invoice to sheet '{}' row {}", sheet, update.row_index + 1);
    }

    Ok(ours.len())
}
