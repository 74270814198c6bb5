//! Ledger sheet index: header detection, column mapping and row lookup.

use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::models::config::LedgerConfig;
use crate::models::ledger::LedgerRow;
use crate::normalize::{comparison_key, normalize, po_contains, po_token};

/// Ledger columns the pipeline reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Po,
    Store,
    NominalCode,
    Authorised,
    QuoteOver,
    InvoiceNumber,
    InvoiceAmount,
    InvoiceSigned,
    Supplier,
    PoAmount,
}

impl Column {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Po => "PO",
            Self::Store => "STORE",
            Self::NominalCode => "NOMINAL CODE",
            Self::Authorised => "AUTHORISED",
            Self::QuoteOver => "QUOTE OVER",
            Self::InvoiceNumber => "INVOICE NO",
            Self::InvoiceAmount => "INVOICE AMOUNT",
            Self::InvoiceSigned => "INVOICE SIGNED",
            Self::Supplier => "SUPPLIER",
            Self::PoAmount => "PO VALUE",
        }
    }
}

/// Header keys per column. Longer keys come first so "PO VALUE" is not
/// taken for the PO column.
const HEADER_KEYS: &[(&str, Column)] = &[
    ("po value", Column::PoAmount),
    ("invoice amount", Column::InvoiceAmount),
    ("invoice signed", Column::InvoiceSigned),
    ("invoice number", Column::InvoiceNumber),
    ("invoice no", Column::InvoiceNumber),
    ("nominal code", Column::NominalCode),
    ("quote over", Column::QuoteOver),
    ("authorised", Column::Authorised),
    ("store", Column::Store),
    ("supplier", Column::Supplier),
    ("po", Column::Po),
];

/// Cell key equals the token key, or starts with it as a whole word.
fn key_matches(cell_key: &str, token_key: &str) -> bool {
    cell_key == token_key
        || cell_key
            .strip_prefix(token_key)
            .is_some_and(|rest| rest.starts_with(' '))
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    positions: IndexMap<Column, usize>,
}

impl ColumnMap {
    /// Map header cells to columns. The first cell naming a column wins.
    pub fn from_header(cells: &[String]) -> Self {
        let mut positions = IndexMap::new();
        for (i, cell) in cells.iter().enumerate() {
            let key = comparison_key(cell);
            if key.is_empty() {
                continue;
            }
            if let Some((_, column)) = HEADER_KEYS.iter().find(|(k, _)| key_matches(&key, k)) {
                positions.entry(*column).or_insert(i);
            }
        }
        Self { positions }
    }

    pub fn get(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    /// Position of a column, or `ColumnNotFound` for the sheet.
    pub fn require(&self, sheet_id: &str, column: Column) -> Result<usize, LedgerError> {
        self.get(column).ok_or_else(|| LedgerError::ColumnNotFound {
            sheet: sheet_id.to_string(),
            column: column.label().to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Parse a ledger amount cell such as "573", "£1,234.50" or " 68.2 ".
pub fn parse_ledger_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '£' | ','))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Find the header row: the first row within the scan bound with enough
/// recognized column names. A cell counts only when its whole key is a
/// header token, so legend text such as "PO pending" is not a hit.
pub fn detect_header(sheet_id: &str, rows: &[Vec<String>], config: &LedgerConfig) -> Result<usize, LedgerError> {
    let token_keys: Vec<String> = config
        .header_tokens
        .iter()
        .map(|t| comparison_key(t))
        .filter(|k| !k.is_empty())
        .collect();

    let scanned = rows.len().min(config.header_scan_rows);
    rows.iter()
        .take(scanned)
        .position(|row| {
            let hits = row
                .iter()
                .map(|cell| comparison_key(cell))
                .filter(|key| !key.is_empty() && token_keys.iter().any(|t| t == key))
                .count();
            hits >= config.min_header_tokens
        })
        .ok_or_else(|| LedgerError::HeaderNotFound {
            sheet: sheet_id.to_string(),
            scanned_rows: scanned,
        })
}

fn cell(row: &[String], column: Option<usize>) -> &str {
    column
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

fn optional_cell(row: &[String], column: Option<usize>) -> Option<String> {
    let value = normalize(cell(row, column));
    (!value.is_empty()).then_some(value)
}

/// Read-only index over one ledger sheet.
#[derive(Debug, Clone)]
pub struct LedgerIndex {
    sheet_id: String,
    header_row: usize,
    columns: ColumnMap,
    rows: Vec<LedgerRow>,
}

impl LedgerIndex {
    /// Build the index from raw sheet rows.
    ///
    /// Rows above the header are title decoration and are dropped; blank
    /// rows below it are skipped. Row indices stay those of the raw grid.
    pub fn build(sheet_id: &str, rows: &[Vec<String>], config: &LedgerConfig) -> Result<Self, LedgerError> {
        let header_row = detect_header(sheet_id, rows, config)?;
        let columns = ColumnMap::from_header(&rows[header_row]);
        columns.require(sheet_id, Column::Po)?;

        debug!(
            "Sheet '{}': header at row {}, {} columns mapped",
            sheet_id,
            header_row + 1,
            columns.len()
        );

        let ledger_rows: Vec<LedgerRow> = rows
            .iter()
            .enumerate()
            .skip(header_row + 1)
            .filter(|(_, row)| row.iter().any(|c| !c.trim().is_empty()))
            .map(|(row_index, row)| LedgerRow {
                sheet_id: sheet_id.to_string(),
                row_index,
                po_number: normalize(cell(row, columns.get(Column::Po))),
                store_name: normalize(cell(row, columns.get(Column::Store))),
                nominal_code: optional_cell(row, columns.get(Column::NominalCode)),
                authorised: optional_cell(row, columns.get(Column::Authorised)),
                quote_over_threshold: optional_cell(row, columns.get(Column::QuoteOver)),
                invoice_number: optional_cell(row, columns.get(Column::InvoiceNumber)),
                invoice_amount: parse_ledger_amount(cell(row, columns.get(Column::InvoiceAmount))),
                supplier: optional_cell(row, columns.get(Column::Supplier)),
                po_amount: parse_ledger_amount(cell(row, columns.get(Column::PoAmount))),
            })
            .collect();

        info!("Indexed {} rows from sheet '{}'", ledger_rows.len(), sheet_id);

        Ok(Self {
            sheet_id: sheet_id.to_string(),
            header_row,
            columns,
            rows: ledger_rows,
        })
    }

    pub fn sheet_id(&self) -> &str {
        &self.sheet_id
    }

    /// Zero-based index of the header row in the raw grid.
    pub fn header_row(&self) -> usize {
        self.header_row
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn row(&self, row_index: usize) -> Option<&LedgerRow> {
        self.rows.iter().find(|r| r.row_index == row_index)
    }

    /// Rows whose PO cell contains the PO token, or is contained by it.
    pub fn find_by_po(&self, po_number: &str) -> Vec<&LedgerRow> {
        self.rows
            .iter()
            .filter(|r| po_contains(&r.po_number, po_number))
            .collect()
    }

    /// Rows already carrying this invoice number.
    pub fn find_by_invoice_number(&self, invoice_number: &str) -> Vec<&LedgerRow> {
        let wanted = po_token(invoice_number);
        if wanted.is_empty() {
            return Vec::new();
        }
        self.rows
            .iter()
            .filter(|r| r.invoice_number.as_deref().is_some_and(|n| po_token(n) == wanted))
            .collect()
    }

    /// Rows still open for fuzzy matching.
    pub fn candidates(&self) -> impl Iterator<Item = &LedgerRow> {
        self.rows.iter().filter(|r| !r.is_invoiced())
    }
}

/// Every loaded sheet, in load order.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    sheets: IndexMap<String, LedgerIndex>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: LedgerIndex) {
        self.sheets.insert(index.sheet_id().to_string(), index);
    }

    /// Index raw rows as a sheet. A missing header fails the load.
    pub fn load_sheet(
        &mut self,
        sheet_id: &str,
        rows: &[Vec<String>],
        config: &LedgerConfig,
    ) -> Result<&LedgerIndex, LedgerError> {
        let index = LedgerIndex::build(sheet_id, rows, config)?;
        self.insert(index);
        self.sheet(sheet_id)
            .ok_or_else(|| LedgerError::SheetNotFound(sheet_id.to_string()))
    }

    /// Look up a sheet by id, ignoring ASCII case.
    pub fn sheet(&self, sheet_id: &str) -> Option<&LedgerIndex> {
        self.sheets.get(sheet_id).or_else(|| {
            self.sheets
                .values()
                .find(|s| s.sheet_id().eq_ignore_ascii_case(sheet_id))
        })
    }

    pub fn sheets(&self) -> impl Iterator<Item = &LedgerIndex> {
        self.sheets.values()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample() -> Vec<Vec<String>> {
        grid(&[
            &["CJL MAINTENANCE LOG 2025", "", ""],
            &["Legend: red = overdue", "", ""],
            &[],
            &["PO", "STORE", "JOB DESCRIPTION", "INVOICE NO", "INVOICE AMOUNT", "INVOICE SIGNED", "NOMINAL CODE"],
            &["\nCJL408\n", "Portsmouth", "Lighting", "", "", "", "7820"],
            &["CJL409", "Maidstone\nFremlin Walk", "Doors", "1001", "£1,250.00", "02/01/2026", ""],
            &["", "", "", "", "", "", ""],
            &["CJL410", "Brighton", "Signage", "", "", "", ""],
        ])
    }

    #[test]
    fn test_detect_header_skips_decoration() {
        let config = LedgerConfig::default();
        assert_eq!(detect_header("CJL", &sample(), &config), Ok(3));
    }

    #[test]
    fn test_detect_header_skips_legend_row() {
        let rows = grid(&[
            &["Store closed", "PO pending", "Date TBC"],
            &["PO", "STORE", "DATE", "INVOICE NO."],
            &["CJL411", "Leeds", "03/02/2026", ""],
        ]);
        assert_eq!(detect_header("CJL", &rows, &LedgerConfig::default()), Ok(1));

        let index = LedgerIndex::build("CJL", &rows, &LedgerConfig::default()).unwrap();
        assert_eq!(index.columns().get(Column::InvoiceNumber), Some(3));
        assert_eq!(index.rows()[0].po_number, "CJL411");
    }

    #[test]
    fn test_header_not_found() {
        let config = LedgerConfig::default();
        let rows = grid(&[&["Title"], &["PO", "notes"], &["a", "b"]]);
        assert_eq!(
            detect_header("CJL", &rows, &config),
            Err(LedgerError::HeaderNotFound {
                sheet: "CJL".into(),
                scanned_rows: 3
            })
        );
    }

    #[test]
    fn test_header_beyond_scan_bound() {
        let config = LedgerConfig {
            header_scan_rows: 2,
            ..LedgerConfig::default()
        };
        let err = LedgerIndex::build("CJL", &sample(), &config).unwrap_err();
        assert_eq!(
            err,
            LedgerError::HeaderNotFound {
                sheet: "CJL".into(),
                scanned_rows: 2
            }
        );
    }

    #[test]
    fn test_column_map() {
        let header = grid(&[&["PO Number", "PO VALUE", "Store Name", "Invoice No.", "Supplier", "PO"]]).remove(0);
        let map = ColumnMap::from_header(&header);
        assert_eq!(map.get(Column::Po), Some(0));
        assert_eq!(map.get(Column::PoAmount), Some(1));
        assert_eq!(map.get(Column::Store), Some(2));
        assert_eq!(map.get(Column::InvoiceNumber), Some(3));
        assert_eq!(map.get(Column::Supplier), Some(4));
        assert_eq!(map.get(Column::InvoiceSigned), None);
    }

    #[test]
    fn test_build_rows() {
        let index = LedgerIndex::build("CJL", &sample(), &LedgerConfig::default()).unwrap();
        assert_eq!(index.header_row(), 3);
        assert_eq!(index.rows().len(), 3);

        let first = &index.rows()[0];
        assert_eq!(first.row_index, 4);
        assert_eq!(first.po_number, "CJL408");
        assert_eq!(first.nominal_code.as_deref(), Some("7820"));
        assert_eq!(first.invoice_number, None);

        let second = index.row(5).unwrap();
        assert_eq!(second.store_name, "Maidstone Fremlin Walk");
        assert_eq!(second.invoice_number.as_deref(), Some("1001"));
        assert_eq!(second.invoice_amount, Some(Decimal::from_str("1250.00").unwrap()));
    }

    #[test]
    fn test_missing_po_column() {
        let rows = grid(&[&["STORE", "INVOICE NO", "INVOICE AMOUNT"], &["Leeds", "", ""]]);
        let err = LedgerIndex::build("OTHER", &rows, &LedgerConfig::default()).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ColumnNotFound {
                sheet: "OTHER".into(),
                column: "PO".into()
            }
        );
    }

    #[test]
    fn test_find_by_po_containment() {
        let index = LedgerIndex::build("CJL", &sample(), &LedgerConfig::default()).unwrap();
        let hits = index.find_by_po("cjl408");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].row_index, 4);
        assert!(index.find_by_po("").is_empty());
        assert!(index.find_by_po("XYZ999").is_empty());
    }

    #[test]
    fn test_find_by_invoice_number() {
        let index = LedgerIndex::build("CJL", &sample(), &LedgerConfig::default()).unwrap();
        assert_eq!(index.find_by_invoice_number(" 1001 ").len(), 1);
        assert!(index.find_by_invoice_number("1002").is_empty());
    }

    #[test]
    fn test_candidates_exclude_invoiced_rows() {
        let index = LedgerIndex::build("CJL", &sample(), &LedgerConfig::default()).unwrap();
        let open: Vec<usize> = index.candidates().map(|r| r.row_index).collect();
        assert_eq!(open, vec![4, 7]);
    }

    #[test]
    fn test_parse_ledger_amount() {
        let cases = [
            ("573", Some("573")),
            ("£1,234.50", Some("1234.50")),
            (" 68.2 ", Some("68.2")),
            ("", None),
            ("TBC", None),
        ];
        for (raw, expected) in cases {
            let expected = expected.map(|e| Decimal::from_str(e).unwrap());
            assert_eq!(parse_ledger_amount(raw), expected, "raw {:?}", raw);
        }
    }

    #[test]
    fn test_ledger_sheet_lookup_ignores_case() {
        let mut ledger = Ledger::new();
        ledger
            .load_sheet("AAW NATIONAL (PANDA)", &sample(), &LedgerConfig::default())
            .unwrap();
        assert!(ledger.sheet("aaw national (panda)").is_some());
        assert!(ledger.sheet("CJL").is_none());
        assert_eq!(ledger.len(), 1);
    }
}
