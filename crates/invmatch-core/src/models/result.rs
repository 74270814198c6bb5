//! Match results, per-document outcomes and batch reports.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::{FieldKind, InvoiceRecord};
use super::ledger::LedgerRow;

/// Final state of a match attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched,
    Ambiguous,
    NotFound,
}

/// Strategy that produced the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ExactPo,
    InvoiceNumber,
    Fuzzy,
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ExactPo => "exact PO",
            Self::InvoiceNumber => "invoice number",
            Self::Fuzzy => "fuzzy",
        };
        f.write_str(name)
    }
}

/// A ledger row scored by the fuzzy strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub row_index: usize,
    pub po_number: String,
    pub store_name: String,
    /// Store similarity in [0, 100].
    pub store_score: f64,
    /// Amount closeness in [0, 100], absent when the row has no amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_score: Option<f64>,
    /// Weighted aggregate in [0, 100].
    pub score: f64,
}

/// Structured diagnostics attached to a match result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchNote {
    /// A candidate row already carries an invoice number.
    DuplicateInvoiceGuard {
        row_index: usize,
        existing_invoice: String,
    },
    /// A candidate row was claimed earlier in the same batch.
    AlreadyClaimed { row_index: usize, claimed_by: String },
    /// More than one row qualified and none was chosen.
    AmbiguousMatch {
        strategy: MatchStrategy,
        rows: Vec<usize>,
    },
    /// The routed sheet is not part of the loaded ledger.
    SheetNotLoaded { sheet_id: String },
}

/// Result of matching one invoice against the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_row: Option<LedgerRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<MatchStrategy>,
    /// Certainty in [0, 1].
    pub confidence: f64,
    /// Human-readable trail, in evaluation order.
    pub reasons: Vec<String>,
    /// Fuzzy candidates, best first.
    pub candidates: Vec<ScoredCandidate>,
    pub notes: Vec<MatchNote>,
}

impl MatchResult {
    pub fn matched(
        row: LedgerRow,
        strategy: MatchStrategy,
        confidence: f64,
        reasons: Vec<String>,
        candidates: Vec<ScoredCandidate>,
        notes: Vec<MatchNote>,
    ) -> Self {
        Self {
            outcome: MatchOutcome::Matched,
            matched_row: Some(row),
            strategy_used: Some(strategy),
            confidence,
            reasons,
            candidates,
            notes,
        }
    }

    pub fn ambiguous(
        strategy: MatchStrategy,
        confidence: f64,
        reasons: Vec<String>,
        candidates: Vec<ScoredCandidate>,
        notes: Vec<MatchNote>,
    ) -> Self {
        Self {
            outcome: MatchOutcome::Ambiguous,
            matched_row: None,
            strategy_used: Some(strategy),
            confidence,
            reasons,
            candidates,
            notes,
        }
    }

    pub fn not_found(
        strategy: Option<MatchStrategy>,
        reasons: Vec<String>,
        candidates: Vec<ScoredCandidate>,
        notes: Vec<MatchNote>,
    ) -> Self {
        Self {
            outcome: MatchOutcome::NotFound,
            matched_row: None,
            strategy_used: strategy,
            confidence: 0.0,
            reasons,
            candidates,
            notes,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.outcome == MatchOutcome::Matched
    }

    /// Whether the duplicate-invoice guard rejected a row.
    pub fn guard_triggered(&self) -> bool {
        self.notes
            .iter()
            .any(|n| matches!(n, MatchNote::DuplicateInvoiceGuard { .. }))
    }
}

/// Post-match check category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCheck {
    Store,
    QuoteAuthorisation,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A diagnostic produced after matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub check: ValidationCheck,
    pub severity: Severity,
    pub message: String,
}

impl Validation {
    pub fn new(check: ValidationCheck, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check,
            severity,
            message: message.into(),
        }
    }
}

/// Non-fatal issues on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentWarning {
    /// The nominal-code table has nothing for the supplier, or every
    /// candidate scored zero.
    NoNominalMapping { supplier: String },
    /// An optional field could not be extracted.
    MissingField { field: FieldKind },
}

impl std::fmt::Display for DocumentWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoNominalMapping { supplier } => {
                write!(f, "no nominal mapping found for {}", supplier)
            }
            Self::MissingField { field } => write!(f, "{} not found", field),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Matched,
    NeedsReview,
    Failed,
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Matched => "matched",
            Self::NeedsReview => "needs_review",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything known about one processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub document_id: String,
    pub source_filename: String,
    pub status: DocumentStatus,
    pub invoice: Option<InvoiceRecord>,
    pub sheet_id: Option<String>,
    pub match_result: Option<MatchResult>,
    pub nominal_code: Option<String>,
    pub validations: Vec<Validation>,
    pub warnings: Vec<DocumentWarning>,
    pub error: Option<String>,
}

impl DocumentResult {
    /// Result for a document whose extraction failed.
    pub fn failed(
        document_id: impl Into<String>,
        source_filename: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            source_filename: source_filename.into(),
            status: DocumentStatus::Failed,
            invoice: None,
            sheet_id: None,
            match_result: None,
            nominal_code: None,
            validations: Vec::new(),
            warnings: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Highest validation severity, if any validation ran.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.validations.iter().map(|v| v.severity).max()
    }
}

/// A write-back instruction for one matched ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerUpdate {
    pub sheet_id: String,
    pub row_index: usize,
    pub invoice_number: String,
    /// Net amount written to the invoice-amount column.
    pub invoice_amount: Decimal,
    /// Date written to the invoice-signed column.
    pub signed_on: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub matched: usize,
    pub needs_review: usize,
    pub failed: usize,
    pub ambiguous: usize,
    pub not_found: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[DocumentResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.status {
                DocumentStatus::Matched => summary.matched += 1,
                DocumentStatus::NeedsReview => summary.needs_review += 1,
                DocumentStatus::Failed => summary.failed += 1,
            }
            match result.match_result.as_ref().map(|m| m.outcome) {
                Some(MatchOutcome::Ambiguous) => summary.ambiguous += 1,
                Some(MatchOutcome::NotFound) => summary.not_found += 1,
                _ => {}
            }
        }
        summary
    }
}

/// Output of a batch run, results in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<DocumentResult>,
    pub updates: Vec<LedgerUpdate>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new(results: Vec<DocumentResult>, updates: Vec<LedgerUpdate>) -> Self {
        let summary = BatchSummary::from_results(&results);
        Self {
            results,
            updates,
            summary,
        }
    }
}
