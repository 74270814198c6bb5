//! Matching invoices to ledger rows.

pub mod claims;
pub mod matcher;
pub mod similarity;

pub use claims::ClaimSet;
pub use matcher::{FuzzyDecision, Matcher};
pub use similarity::{amount_score, store_score, supplier_compatible, SimilarityScorer};
