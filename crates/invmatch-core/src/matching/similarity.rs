//! Field similarity scores on a 0-100 scale.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::config::MatchingConfig;
use crate::models::invoice::InvoiceRecord;
use crate::models::ledger::LedgerRow;
use crate::models::result::ScoredCandidate;
use crate::normalize::comparison_key;

/// Comparison key with its words sorted, so word order does not count.
fn token_sorted(raw: &str) -> String {
    let key = comparison_key(raw);
    let mut tokens: Vec<&str> = key.split(' ').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Normalized edit-distance ratio of two store names.
pub fn store_score(a: &str, b: &str) -> f64 {
    let a = token_sorted(a);
    let b = token_sorted(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(&a, &b) * 100.0
}

/// Closeness of an invoice amount to a ledger amount.
///
/// 100 when equal, falling linearly to 0 at `tolerance` relative difference
/// from the ledger figure.
pub fn amount_score(invoice: Decimal, ledger: Decimal, tolerance: f64) -> f64 {
    let (Some(invoice), Some(ledger)) = (invoice.to_f64(), ledger.to_f64()) else {
        return 0.0;
    };
    if ledger <= 0.0 {
        return 0.0;
    }
    let relative = (invoice - ledger).abs() / ledger;
    if tolerance <= 0.0 {
        return if relative == 0.0 { 100.0 } else { 0.0 };
    }
    ((1.0 - relative / tolerance).max(0.0) * 100.0).min(100.0)
}

/// Whether a row's supplier cell allows the invoice's supplier.
///
/// Rows without a supplier cell accept any supplier. A named supplier must
/// contain, or be contained in, the invoice's supplier name or code.
pub fn supplier_compatible(invoice: &InvoiceRecord, row_supplier: Option<&str>) -> bool {
    let Some(row) = row_supplier.map(comparison_key).filter(|k| !k.is_empty()) else {
        return true;
    };
    [Some(invoice.supplier_name.as_str()), invoice.supplier_code.as_deref()]
        .into_iter()
        .flatten()
        .map(comparison_key)
        .filter(|k| !k.is_empty())
        .any(|k| k.contains(&row) || row.contains(&k))
}

/// Weighted multi-field scorer for fuzzy candidates.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    config: MatchingConfig,
}

impl SimilarityScorer {
    pub fn new(config: MatchingConfig) -> Self {
        Self { config }
    }

    /// Score a ledger row against an invoice.
    ///
    /// Rows without an amount are scored on the store alone.
    pub fn score(&self, invoice: &InvoiceRecord, row: &LedgerRow) -> ScoredCandidate {
        let store = invoice
            .store_name
            .as_deref()
            .map(|s| store_score(s, &row.store_name))
            .unwrap_or(0.0);

        let amount = row
            .po_amount
            .map(|ledger| amount_score(invoice.net_amount, ledger, self.config.amount_tolerance));

        let score = match amount {
            Some(amount) => {
                let total_weight = self.config.store_weight + self.config.amount_weight;
                if total_weight > 0.0 {
                    (store * self.config.store_weight + amount * self.config.amount_weight) / total_weight
                } else {
                    store
                }
            }
            None => store,
        };

        ScoredCandidate {
            row_index: row.row_index,
            po_number: row.po_number.clone(),
            store_name: row.store_name.clone(),
            store_score: store,
            amount_score: amount,
            score,
        }
    }
}

impl Default for SimilarityScorer {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}
