//! Batch pipeline: extract, route, match, validate and collect write-backs.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::DocumentError;
use crate::invoice::{InvoiceParser, RuleInvoiceParser};
use crate::ledger::Ledger;
use crate::matching::{ClaimSet, Matcher};
use crate::models::config::InvmatchConfig;
use crate::models::document::RawDocument;
use crate::models::result::{
    BatchReport, DocumentResult, DocumentStatus, DocumentWarning, LedgerUpdate, MatchResult, Severity,
};
use crate::nominal::{NominalLookup, NominalTable};
use crate::normalize::normalize_document;
use crate::validation::Validator;

/// One batch input: a document with text, or one the text source could
/// not read.
#[derive(Debug)]
pub enum DocumentInput {
    Text(RawDocument),
    Unreadable {
        id: String,
        source_filename: String,
        error: DocumentError,
    },
}

impl From<RawDocument> for DocumentInput {
    fn from(document: RawDocument) -> Self {
        Self::Text(document)
    }
}

/// Sequential batch pipeline over a read-only ledger.
pub struct Pipeline<P: InvoiceParser = RuleInvoiceParser> {
    config: InvmatchConfig,
    parser: P,
    matcher: Matcher,
    validator: Validator,
    nominal: NominalTable,
}

impl Pipeline<RuleInvoiceParser> {
    pub fn new(config: InvmatchConfig) -> Self {
        let parser = RuleInvoiceParser::new().with_config(config.extraction.clone());
        Self::with_parser(config, parser)
    }
}

impl<P: InvoiceParser> Pipeline<P> {
    pub fn with_parser(config: InvmatchConfig, parser: P) -> Self {
        let matcher = Matcher::new(config.matching.clone());
        let validator =
            Validator::new(config.validation.clone()).with_store_threshold(config.matching.store_threshold);
        Self {
            config,
            parser,
            matcher,
            validator,
            nominal: NominalTable::default(),
        }
    }

    pub fn with_nominal_table(mut self, table: NominalTable) -> Self {
        self.nominal = table;
        self
    }

    pub fn config(&self) -> &InvmatchConfig {
        &self.config
    }

    /// Process every input in order. A failing document is recorded and
    /// the batch carries on.
    pub fn run<I>(&self, inputs: I, ledger: &Ledger, signed_on: NaiveDate) -> BatchReport
    where
        I: IntoIterator<Item = DocumentInput>,
    {
        let mut claims = ClaimSet::new();
        let mut results = Vec::new();
        let mut updates = Vec::new();

        for input in inputs {
            let result = match input {
                DocumentInput::Text(document) => {
                    let (result, update) = self.process_document(&document, ledger, &mut claims, signed_on);
                    updates.extend(update);
                    result
                }
                DocumentInput::Unreadable {
                    id,
                    source_filename,
                    error,
                } => {
                    warn!("{}: {}", source_filename, error);
                    DocumentResult::failed(id, source_filename, error.to_string())
                }
            };
            results.push(result);
        }

        let report = BatchReport::new(results, updates);
        info!(
            "Batch complete: {} documents, {} matched, {} need review, {} failed",
            report.summary.total, report.summary.matched, report.summary.needs_review, report.summary.failed
        );
        report
    }

    /// Process a single document against the ledger.
    ///
    /// A confirmed match claims its row and yields the write-back. A match
    /// with an error-level validation, or without an invoice number to
    /// write, is held for review instead.
    pub fn process_document(
        &self,
        document: &RawDocument,
        ledger: &Ledger,
        claims: &mut ClaimSet,
        signed_on: NaiveDate,
    ) -> (DocumentResult, Option<LedgerUpdate>) {
        let extraction = match self.parser.parse(document) {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("{}: extraction failed: {}", document.source_filename, e);
                return (
                    DocumentResult::failed(document.id.clone(), document.source_filename.clone(), e.to_string()),
                    None,
                );
            }
        };
        let invoice = extraction.invoice;
        let mut warnings = extraction.warnings;

        let sheet_id = self.config.sheet_for(invoice.supplier_code.as_deref()).to_string();
        debug!("{} routed to sheet '{}'", document.id, sheet_id);

        let match_result = self.matcher.match_in_ledger(&invoice, ledger, &sheet_id, claims);

        let mut validations = Vec::new();
        let mut nominal_code = None;
        let mut status = DocumentStatus::NeedsReview;
        let mut update = None;

        if let Some(row) = match_result.matched_row.as_ref() {
            validations = self.validator.validate(&invoice, row);

            nominal_code = row.nominal_code.clone();
            if nominal_code.is_none() && !self.nominal.is_empty() {
                let text = normalize_document(&document.text());
                match self.nominal.lookup(&invoice, &text) {
                    NominalLookup::Found(code) => nominal_code = Some(code),
                    NominalLookup::NoMapping => {
                        let warning = DocumentWarning::NoNominalMapping {
                            supplier: invoice.supplier_name.clone(),
                        };
                        warn!("{}: {}", document.source_filename, warning);
                        warnings.push(warning);
                    }
                }
            }

            let blocked = validations.iter().any(|v| v.severity == Severity::Error);
            if blocked {
                warn!(
                    "{}: match to row {} held for review after failed validation",
                    document.source_filename,
                    row.display_row()
                );
            } else if let Some(invoice_number) = invoice.invoice_number.clone() {
                if claims.try_claim(row.key(), &document.id) {
                    status = DocumentStatus::Matched;
                    update = Some(LedgerUpdate {
                        sheet_id: row.sheet_id.clone(),
                        row_index: row.row_index,
                        invoice_number,
                        invoice_amount: invoice.net_amount,
                        signed_on,
                    });
                    info!(
                        "{} matched to sheet '{}' row {}",
                        invoice.display_label(),
                        row.sheet_id,
                        row.display_row()
                    );
                } else {
                    warn!("{}: row {} was claimed concurrently", document.source_filename, row.display_row());
                }
            } else {
                // The invoice-number cell marks a row as invoiced; without it
                // a written row would still look open to the next run.
                warn!(
                    "{}: match to row {} held for review, no invoice number to write",
                    document.source_filename,
                    row.display_row()
                );
            }
        } else {
            log_unmatched(&document.source_filename, &match_result);
        }

        let result = DocumentResult {
            document_id: document.id.clone(),
            source_filename: document.source_filename.clone(),
            status,
            invoice: Some(invoice),
            sheet_id: Some(sheet_id),
            match_result: Some(match_result),
            nominal_code,
            validations,
            warnings,
            error: None,
        };
        (result, update)
    }
}

fn log_unmatched(filename: &str, result: &MatchResult) {
    let reason = result.reasons.last().map(String::as_str).unwrap_or("no reason recorded");
    if result.guard_triggered() {
        warn!("{}: already invoiced: {}", filename, reason);
    } else {
        info!("{}: {:?}: {}", filename, result.outcome, reason);
    }
}
