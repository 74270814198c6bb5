//! Raw document text as handed over by the text-extraction collaborator.

use serde::{Deserialize, Serialize};

/// A source document reduced to its ordered page texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Stable identifier of the document within a batch.
    pub id: String,

    /// File name the document was loaded from.
    pub source_filename: String,

    /// Page texts in reading order.
    pub page_texts: Vec<String>,
}

impl RawDocument {
    pub fn new(
        id: impl Into<String>,
        source_filename: impl Into<String>,
        page_texts: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_filename: source_filename.into(),
            page_texts,
        }
    }

    /// Full document text, pages separated by a blank line.
    pub fn text(&self) -> String {
        self.page_texts.join("\n\n")
    }

    /// Whether every page is blank.
    pub fn is_blank(&self) -> bool {
        self.page_texts.iter().all(|p| p.trim().is_empty())
    }
}
