//! Invoice field extraction module.

mod parser;
pub mod rules;
pub mod supplier;

pub use parser::{ExtractionResult, InvoiceParser, RuleInvoiceParser};
pub use supplier::{legal_name, Supplier, SupplierEntry, SupplierRegistry};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
