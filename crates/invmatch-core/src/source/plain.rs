//! Pre-extracted text files, pages separated by form feeds.

use crate::error::DocumentError;
use crate::models::document::RawDocument;

use super::{require_text, Result, TextSource};

const PAGE_BREAK: char = '\u{000c}';

/// Text source for `.txt` files produced by an external extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn read(&self, id: &str, source_filename: &str, data: &[u8]) -> Result<RawDocument> {
        let text = std::str::from_utf8(data)
            .map_err(|e| DocumentError::TextExtraction(format!("{} is not UTF-8: {}", source_filename, e)))?;

        let mut pages: Vec<String> = text.split(PAGE_BREAK).map(String::from).collect();
        // A trailing form feed does not open a page.
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }

        require_text(RawDocument::new(id, source_filename, pages))
    }
}
