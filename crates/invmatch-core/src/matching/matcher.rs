//! Invoice-to-ledger matcher: exact PO, then invoice number, then fuzzy.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::ledger::{Ledger, LedgerIndex};
use crate::models::config::MatchingConfig;
use crate::models::invoice::InvoiceRecord;
use crate::models::ledger::LedgerRow;
use crate::models::result::{MatchNote, MatchResult, MatchStrategy, ScoredCandidate};
use crate::normalize::po_token;

use super::claims::ClaimSet;
use super::similarity::{supplier_compatible, SimilarityScorer};

/// Fuzzy candidates kept on a result for diagnostics.
const MAX_REPORTED_CANDIDATES: usize = 5;

/// Outcome of screening the rows a lookup strategy returned.
enum Screened<'a> {
    /// Exactly one usable row.
    One(&'a LedgerRow),
    /// Several usable rows.
    Many(Vec<&'a LedgerRow>),
    /// Rows were found but every one was invoiced or claimed.
    Blocked,
}

/// Decision over ranked fuzzy candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum FuzzyDecision {
    /// Index into the ranked list of the accepted candidate.
    Accept(usize),
    /// Top candidates too close to call.
    Ambiguous(Vec<usize>),
    /// Best candidate below the acceptance bar.
    Rejected,
    NoCandidates,
}

/// Read-only matcher. Claims are consulted, never updated.
#[derive(Debug, Clone)]
pub struct Matcher {
    config: MatchingConfig,
    scorer: SimilarityScorer,
}

impl Matcher {
    pub fn new(config: MatchingConfig) -> Self {
        Self {
            scorer: SimilarityScorer::new(config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Match against the routed sheet of a multi-sheet ledger.
    pub fn match_in_ledger(
        &self,
        invoice: &InvoiceRecord,
        ledger: &Ledger,
        sheet_id: &str,
        claims: &ClaimSet,
    ) -> MatchResult {
        match ledger.sheet(sheet_id) {
            Some(index) => self.match_invoice(invoice, index, claims),
            None => MatchResult::not_found(
                None,
                vec![format!("sheet '{}' is not loaded", sheet_id)],
                Vec::new(),
                vec![MatchNote::SheetNotLoaded {
                    sheet_id: sheet_id.to_string(),
                }],
            ),
        }
    }

    /// Run the strategies in order; each is tried only if the previous one
    /// found no rows at all.
    pub fn match_invoice(&self, invoice: &InvoiceRecord, index: &LedgerIndex, claims: &ClaimSet) -> MatchResult {
        let sheet = index.sheet_id();
        let mut reasons = Vec::new();
        let mut notes = Vec::new();

        // Strategy 1: exact PO
        match invoice.po_number.as_deref().filter(|po| !po_token(po).is_empty()) {
            Some(po) => {
                let hits = index.find_by_po(po);
                if hits.is_empty() {
                    reasons.push(format!("PO '{}' not found in sheet '{}'", po, sheet));
                } else {
                    debug!("PO '{}' found on {} row(s) of '{}'", po, hits.len(), sheet);
                    return self.resolve(MatchStrategy::ExactPo, hits, index, claims, reasons, notes);
                }
            }
            None => reasons.push("no PO on invoice; exact PO lookup skipped".to_string()),
        }

        // Strategy 2: invoice number already recorded (resubmission)
        if let Some(number) = invoice.invoice_number.as_deref() {
            let hits = index.find_by_invoice_number(number);
            if hits.is_empty() {
                reasons.push(format!("invoice number '{}' not recorded in sheet '{}'", number, sheet));
            } else {
                return self.resolve(MatchStrategy::InvoiceNumber, hits, index, claims, reasons, notes);
            }
        }

        // Strategy 3: fuzzy multi-field
        let mut ranked: Vec<ScoredCandidate> = index
            .candidates()
            .filter(|row| supplier_compatible(invoice, row.supplier.as_deref()))
            .filter(|row| {
                let claimed = claims.is_claimed(&row.key());
                if claimed {
                    notes.push(MatchNote::AlreadyClaimed {
                        row_index: row.row_index,
                        claimed_by: claims.claimed_by(&row.key()).unwrap_or_default().to_string(),
                    });
                }
                !claimed
            })
            .map(|row| self.scorer.score(invoice, row))
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.row_index.cmp(&b.row_index))
        });

        let decision = self.decide(&ranked);
        let reported: Vec<ScoredCandidate> = ranked.iter().take(MAX_REPORTED_CANDIDATES).cloned().collect();

        match decision {
            FuzzyDecision::Accept(i) => {
                let best = &ranked[i];
                match index.row(best.row_index) {
                    Some(row) => {
                        reasons.push(format!(
                            "fuzzy match to PO '{}' row {} (store '{}', score {:.1})",
                            best.po_number,
                            best.row_index + 1,
                            best.store_name,
                            best.score
                        ));
                        info!("Fuzzy matched {} to row {}", invoice.display_label(), best.row_index + 1);
                        MatchResult::matched(
                            row.clone(),
                            MatchStrategy::Fuzzy,
                            best.score / 100.0,
                            reasons,
                            reported,
                            notes,
                        )
                    }
                    None => {
                        reasons.push(format!("row {} vanished from index", best.row_index + 1));
                        MatchResult::not_found(Some(MatchStrategy::Fuzzy), reasons, reported, notes)
                    }
                }
            }
            FuzzyDecision::Ambiguous(tied) => {
                let rows: Vec<usize> = tied.iter().map(|&i| ranked[i].row_index).collect();
                reasons.push(format!(
                    "fuzzy candidates within {:.0} points of each other: rows {}",
                    self.config.min_margin,
                    display_rows(&rows)
                ));
                notes.push(MatchNote::AmbiguousMatch {
                    strategy: MatchStrategy::Fuzzy,
                    rows,
                });
                MatchResult::ambiguous(MatchStrategy::Fuzzy, ranked[0].score / 100.0, reasons, reported, notes)
            }
            FuzzyDecision::Rejected => {
                let best = &ranked[0];
                reasons.push(format!(
                    "best fuzzy candidate PO '{}' (store '{}') scored {:.1}, store {:.1}; below threshold",
                    best.po_number, best.store_name, best.score, best.store_score
                ));
                MatchResult::not_found(Some(MatchStrategy::Fuzzy), reasons, reported, notes)
            }
            FuzzyDecision::NoCandidates => {
                reasons.push(format!("no open candidate rows in sheet '{}'", sheet));
                MatchResult::not_found(Some(MatchStrategy::Fuzzy), reasons, reported, notes)
            }
        }
    }

    /// Accept the top candidate only if it clears the acceptance threshold,
    /// its store agrees, and it leads the runner-up by the minimum margin.
    pub fn decide(&self, ranked: &[ScoredCandidate]) -> FuzzyDecision {
        let Some(top) = ranked.first() else {
            return FuzzyDecision::NoCandidates;
        };
        if top.score < self.config.acceptance_threshold || top.store_score < self.config.store_threshold {
            return FuzzyDecision::Rejected;
        }
        let tied: Vec<usize> = ranked
            .iter()
            .enumerate()
            .skip(1)
            .take_while(|(_, c)| top.score - c.score < self.config.min_margin)
            .map(|(i, _)| i)
            .collect();
        if tied.is_empty() {
            FuzzyDecision::Accept(0)
        } else {
            FuzzyDecision::Ambiguous(std::iter::once(0).chain(tied).collect())
        }
    }

    /// Apply the duplicate-invoice guard and the claim set to looked-up
    /// rows, then decide.
    fn resolve(
        &self,
        strategy: MatchStrategy,
        hits: Vec<&LedgerRow>,
        index: &LedgerIndex,
        claims: &ClaimSet,
        mut reasons: Vec<String>,
        mut notes: Vec<MatchNote>,
    ) -> MatchResult {
        let screened = screen(strategy, hits, claims, &mut reasons, &mut notes);
        match screened {
            Screened::One(row) => {
                reasons.push(format!(
                    "{}: PO '{}' row {} in sheet '{}'",
                    strategy,
                    row.po_number,
                    row.display_row(),
                    index.sheet_id()
                ));
                MatchResult::matched(row.clone(), strategy, 1.0, reasons, Vec::new(), notes)
            }
            Screened::Many(rows) => {
                let indices: Vec<usize> = rows.iter().map(|r| r.row_index).collect();
                reasons.push(format!(
                    "{}: {} open rows qualify: rows {}",
                    strategy,
                    rows.len(),
                    display_rows(&indices)
                ));
                notes.push(MatchNote::AmbiguousMatch { strategy, rows: indices });
                MatchResult::ambiguous(strategy, 0.0, reasons, Vec::new(), notes)
            }
            Screened::Blocked => MatchResult::not_found(Some(strategy), reasons, Vec::new(), notes),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(MatchingConfig::default())
    }
}

/// Drop invoiced and claimed rows, recording why.
fn screen<'a>(
    strategy: MatchStrategy,
    hits: Vec<&'a LedgerRow>,
    claims: &ClaimSet,
    reasons: &mut Vec<String>,
    notes: &mut Vec<MatchNote>,
) -> Screened<'a> {
    let mut open = Vec::new();
    for row in hits {
        if let Some(existing) = row.invoice_number.as_deref().filter(|_| row.is_invoiced()) {
            reasons.push(format!(
                "{}: PO '{}' row {} already invoiced as '{}'",
                strategy,
                row.po_number,
                row.display_row(),
                existing
            ));
            notes.push(MatchNote::DuplicateInvoiceGuard {
                row_index: row.row_index,
                existing_invoice: existing.to_string(),
            });
        } else if let Some(by) = claims.claimed_by(&row.key()) {
            reasons.push(format!(
                "{}: PO '{}' row {} already claimed by {} in this batch",
                strategy,
                row.po_number,
                row.display_row(),
                by
            ));
            notes.push(MatchNote::AlreadyClaimed {
                row_index: row.row_index,
                claimed_by: by.to_string(),
            });
        } else {
            open.push(row);
        }
    }

    match open.len() {
        0 => Screened::Blocked,
        1 => Screened::One(open[0]),
        _ => Screened::Many(open),
    }
}

fn display_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| (r + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
