//! Post-match checks on a matched invoice and its ledger row.
//!
//! Checks are diagnostics only: they never change the match outcome. The
//! batch pipeline decides what an `Error` severity means for write-back.

use rust_decimal::Decimal;

use crate::models::config::{MatchingConfig, ValidationConfig};
use crate::models::invoice::InvoiceRecord;
use crate::models::ledger::LedgerRow;
use crate::models::result::{Severity, Validation, ValidationCheck};
use crate::matching::store_score;

fn has_value(cell: Option<&str>) -> bool {
    cell.is_some_and(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
    store_threshold: f64,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            store_threshold: MatchingConfig::default().store_threshold,
        }
    }

    /// Store similarity at or above which the store check passes.
    pub fn with_store_threshold(mut self, threshold: f64) -> Self {
        self.store_threshold = threshold;
        self
    }

    /// Run every check against a matched row.
    pub fn validate(&self, invoice: &InvoiceRecord, row: &LedgerRow) -> Vec<Validation> {
        let mut validations = Vec::new();
        if let Some(store) = self.check_store(invoice, row) {
            validations.push(store);
        }
        validations.push(self.check_quote(invoice, row));
        validations.push(self.check_amount(invoice));
        validations
    }

    /// Skipped when either side has no store name.
    pub fn check_store(&self, invoice: &InvoiceRecord, row: &LedgerRow) -> Option<Validation> {
        let store = invoice.store_name.as_deref().filter(|s| !s.trim().is_empty())?;
        if row.store_name.trim().is_empty() {
            return None;
        }

        let score = store_score(store, &row.store_name);
        let validation = if score >= self.store_threshold {
            Validation::new(
                ValidationCheck::Store,
                Severity::Info,
                format!("store matches: '{}' ~ '{}' ({:.0}%)", store, row.store_name, score),
            )
        } else {
            let severity = if score >= self.config.store_error_below {
                Severity::Warning
            } else {
                Severity::Error
            };
            Validation::new(
                ValidationCheck::Store,
                severity,
                format!(
                    "store mismatch: invoice '{}', ledger '{}' ({:.0}%) (sheet '{}', row {})",
                    store,
                    row.store_name,
                    score,
                    row.sheet_id,
                    row.display_row()
                ),
            )
        };
        Some(validation)
    }

    /// Work above the quote threshold needs a quote reference and an
    /// authorisation on the ledger row.
    pub fn check_quote(&self, invoice: &InvoiceRecord, row: &LedgerRow) -> Validation {
        let threshold = self.config.quote_threshold;
        if invoice.net_amount <= threshold {
            return Validation::new(
                ValidationCheck::QuoteAuthorisation,
                Severity::Info,
                format!(
                    "net {} not above {}; no quote authorisation required",
                    money(invoice.net_amount),
                    money(threshold)
                ),
            );
        }

        let quote = row.quote_over_threshold.as_deref();
        let authorised = row.authorised.as_deref();
        let location = format!("(sheet '{}', row {})", row.sheet_id, row.display_row());
        let over = format!("over {}", money(threshold));

        match (has_value(quote), has_value(authorised)) {
            (true, true) => Validation::new(
                ValidationCheck::QuoteAuthorisation,
                Severity::Info,
                format!(
                    "quote '{}' authorised by '{}'",
                    quote.unwrap_or_default(),
                    authorised.unwrap_or_default()
                ),
            ),
            (true, false) => Validation::new(
                ValidationCheck::QuoteAuthorisation,
                Severity::Warning,
                format!(
                    "{}: quote '{}' present but AUTHORISED is empty {}",
                    over,
                    quote.unwrap_or_default(),
                    location
                ),
            ),
            (false, true) => Validation::new(
                ValidationCheck::QuoteAuthorisation,
                Severity::Warning,
                format!(
                    "{}: authorised by '{}' but QUOTE OVER is empty {}",
                    over,
                    authorised.unwrap_or_default(),
                    location
                ),
            ),
            (false, false) => Validation::new(
                ValidationCheck::QuoteAuthorisation,
                Severity::Warning,
                format!("{}: QUOTE OVER and AUTHORISED are both empty {}", over, location),
            ),
        }
    }

    pub fn check_amount(&self, invoice: &InvoiceRecord) -> Validation {
        let net = invoice.net_amount;
        if net <= Decimal::ZERO {
            Validation::new(
                ValidationCheck::Amount,
                Severity::Error,
                format!("net amount {} is not positive; check the document", money(net)),
            )
        } else if net > self.config.high_amount {
            Validation::new(
                ValidationCheck::Amount,
                Severity::Warning,
                format!("high amount: {} exceeds {}", money(net), money(self.config.high_amount)),
            )
        } else {
            Validation::new(ValidationCheck::Amount, Severity::Info, format!("amount {}", money(net)))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

fn money(amount: Decimal) -> String {
    format!("£{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn invoice(store: Option<&str>, net: &str) -> InvoiceRecord {
        InvoiceRecord {
            document_id: "doc-1".into(),
            supplier_name: "APS Fire Systems".into(),
            supplier_code: Some("APS".into()),
            invoice_number: None,
            po_number: None,
            net_amount: Decimal::from_str(net).unwrap(),
            vat_amount: None,
            total_amount: None,
            currency: "GBP".into(),
            store_name: store.map(String::from),
            invoice_date: None,
            description: None,
            provenance: BTreeMap::new(),
        }
    }

    fn row(store: &str, quote: Option<&str>, authorised: Option<&str>) -> LedgerRow {
        let mut row = LedgerRow::new("APS", 6);
        row.store_name = store.into();
        row.quote_over_threshold = quote.map(String::from);
        row.authorised = authorised.map(String::from);
        row
    }

    #[test]
    fn test_store_severity_bands() {
        let validator = Validator::default();
        let cases = [
            ("Maidstone", "MAIDSTONE", Severity::Info),
            ("Portsmouth", "Plymouth", Severity::Warning),
            ("Bluewater", "Cardiff", Severity::Error),
        ];
        for (invoice_store, ledger_store, expected) in cases {
            let check = validator
                .check_store(&invoice(Some(invoice_store), "10"), &row(ledger_store, None, None))
                .unwrap();
            assert_eq!(check.severity, expected, "{} vs {}", invoice_store, ledger_store);
        }
    }

    #[test]
    fn test_store_check_skipped_without_store() {
        let validator = Validator::default();
        assert_eq!(validator.check_store(&invoice(None, "10"), &row("Maidstone", None, None)), None);
        assert_eq!(validator.check_store(&invoice(Some("Maidstone"), "10"), &row("", None, None)), None);
    }

    #[test]
    fn test_quote_authorisation() {
        let validator = Validator::default();
        let cases = [
            ("200.00", None, None, Severity::Info),
            ("250.00", Some("Q-17"), Some("JB"), Severity::Info),
            ("250.00", Some("Q-17"), None, Severity::Warning),
            ("250.00", None, Some("JB"), Severity::Warning),
            ("250.00", None, None, Severity::Warning),
        ];
        for (net, quote, authorised, expected) in cases {
            let check = validator.check_quote(&invoice(None, net), &row("Maidstone", quote, authorised));
            assert_eq!(check.severity, expected, "net {} quote {:?} auth {:?}", net, quote, authorised);
        }

        let missing = validator.check_quote(&invoice(None, "250.00"), &row("Maidstone", None, None));
        assert!(missing.message.contains("sheet 'APS', row 7"));
    }

    #[test]
    fn test_amount_sanity() {
        let validator = Validator::default();
        assert_eq!(validator.check_amount(&invoice(None, "573.00")).severity, Severity::Info);
        assert_eq!(validator.check_amount(&invoice(None, "10000.01")).severity, Severity::Warning);
        assert_eq!(validator.check_amount(&invoice(None, "0")).severity, Severity::Error);
    }

    #[test]
    fn test_validate_runs_all_checks() {
        let checks: Vec<ValidationCheck> = Validator::default()
            .validate(&invoice(Some("Maidstone"), "50"), &row("Maidstone", None, None))
            .into_iter()
            .map(|v| v.check)
            .collect();
        assert_eq!(
            checks,
            vec![ValidationCheck::Store, ValidationCheck::QuoteAuthorisation, ValidationCheck::Amount]
        );
    }
}
