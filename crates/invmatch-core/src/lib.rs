//! Core library for matching supplier invoices against a purchase-order ledger.
//!
//! This crate provides:
//! - Document text sources (PDF via lopdf/pdf-extract, pre-extracted text)
//! - Supplier identification and rule-cascade field extraction
//! - Purchase-order ledger indexing and write-back
//! - Exact, invoice-number and fuzzy matching with a per-batch claim set
//! - Nominal-code disambiguation and post-match validation
//! - A batch pipeline that isolates per-document failures

pub mod batch;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod matching;
pub mod models;
pub mod nominal;
pub mod normalize;
pub mod source;
pub mod validation;

pub use batch::{DocumentInput, Pipeline};
pub use error::{DocumentError, ExtractionError, InvmatchError, LedgerError, Result};
pub use invoice::{ExtractionResult, InvoiceParser, RuleInvoiceParser, Supplier, SupplierRegistry};
pub use ledger::{apply_updates, Ledger, LedgerIndex};
pub use matching::{ClaimSet, Matcher};
pub use models::config::InvmatchConfig;
pub use models::document::RawDocument;
pub use models::invoice::{FieldKind, InvoiceRecord};
pub use models::ledger::{LedgerRow, RowKey};
pub use models::result::{
    BatchReport, BatchSummary, DocumentResult, DocumentStatus, DocumentWarning, LedgerUpdate, MatchOutcome,
    MatchResult, MatchStrategy, Severity, Validation,
};
pub use nominal::{NominalLookup, NominalTable};
pub use source::{read_path, TextSource};
pub use validation::Validator;
