//! Error types for the invmatch-core library.

use thiserror::Error;

use crate::models::invoice::FieldKind;

/// Main error type for the invmatch library.
#[derive(Error, Debug)]
pub enum InvmatchError {
    /// Document text source error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Ledger loading or write-back error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by the text-extraction collaborator.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Failed to open/parse the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Failed to extract text from the document.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The document is encrypted and cannot be processed.
    #[error("document is encrypted")]
    Encrypted,

    /// The document has no pages.
    #[error("document has no pages")]
    NoPages,

    /// The document yielded no text at all (scanned images are not supported).
    #[error("no text found in document {0}")]
    NoText(String),
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A field every invoice must carry could not be extracted.
    #[error("mandatory field missing: {0}")]
    MandatoryFieldMissing(FieldKind),
}

/// Errors related to the purchase-order ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No row within the scan bound carried enough recognized column names.
    #[error("header row not found in sheet '{sheet}' (scanned {scanned_rows} rows)")]
    HeaderNotFound { sheet: String, scanned_rows: usize },

    /// A column needed for write-back is not present in the header.
    #[error("column '{column}' not found in sheet '{sheet}'")]
    ColumnNotFound { sheet: String, column: String },

    /// An update addressed a row outside the sheet.
    #[error("row {row} out of range in sheet '{sheet}'")]
    RowOutOfRange { sheet: String, row: usize },

    /// An update addressed a sheet that is not loaded.
    #[error("sheet '{0}' not loaded")]
    SheetNotFound(String),
}

/// Result type for the invmatch library.
pub type Result<T> = std::result::Result<T, InvmatchError>;
