//! Purchase-order ledger: indexing raw sheet rows and writing matches back.

pub mod index;
pub mod writer;

pub use index::{detect_header, parse_ledger_amount, Column, ColumnMap, Ledger, LedgerIndex};
pub use writer::{apply_updates, SIGNED_DATE_FORMAT};
