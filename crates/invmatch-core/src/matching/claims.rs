//! Per-batch record of ledger rows already assigned to a document.

use indexmap::IndexMap;

use crate::models::ledger::RowKey;

/// Rows claimed during the current batch, in claim order.
///
/// Passed explicitly into matching so a batch can be replayed
/// deterministically.
#[derive(Debug, Clone, Default)]
pub struct ClaimSet {
    claims: IndexMap<RowKey, String>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a row for a document. Returns false, leaving the existing
    /// claim in place, when the row is already taken.
    pub fn try_claim(&mut self, key: RowKey, document_id: &str) -> bool {
        match self.claims.entry(key) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(document_id.to_string());
                true
            }
        }
    }

    pub fn is_claimed(&self, key: &RowKey) -> bool {
        self.claims.contains_key(key)
    }

    /// Document that holds the claim on a row.
    pub fn claimed_by(&self, key: &RowKey) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowKey, &str)> {
        self.claims.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_claim_wins() {
        let mut claims = ClaimSet::new();
        let key = RowKey::new("CJL", 4);

        assert!(claims.try_claim(key.clone(), "doc-1"));
        assert!(!claims.try_claim(key.clone(), "doc-2"));
        assert_eq!(claims.claimed_by(&key), Some("doc-1"));
        assert_eq!(claims.len(), 1);
    }

    #[test]
    fn test_rows_in_other_sheets_are_distinct() {
        let mut claims = ClaimSet::new();
        assert!(claims.try_claim(RowKey::new("CJL", 4), "doc-1"));
        assert!(claims.try_claim(RowKey::new("APS", 4), "doc-2"));
        assert!(!claims.is_claimed(&RowKey::new("AAW", 4)));

        let order: Vec<&str> = claims.iter().map(|(_, doc)| doc).collect();
        assert_eq!(order, vec!["doc-1", "doc-2"]);
    }
}
