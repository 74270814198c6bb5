//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace, warn};

use crate::error::DocumentError;
use crate::models::document::RawDocument;

use super::{require_text, Result, TextSource};

/// PDF text source.
///
/// Text is read page by page with lopdf. When that yields nothing,
/// pdf-extract reads the whole document as a single page.
#[derive(Debug, Clone, Default)]
pub struct PdfTextSource;

impl PdfTextSource {
    pub fn new() -> Self {
        Self
    }

    /// Parse the document, opening empty-password encryption. Returns the
    /// document and the bytes pdf-extract should read.
    fn load(&self, data: &[u8]) -> Result<(Document, Vec<u8>)> {
        let mut doc = Document::load_mem(data).map_err(|e| DocumentError::Parse(e.to_string()))?;

        let raw = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| DocumentError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if doc.get_pages().is_empty() {
            return Err(DocumentError::NoPages);
        }
        Ok((doc, raw))
    }

    fn page_texts(&self, doc: &Document) -> Vec<String> {
        doc.get_pages()
            .keys()
            .map(|&page| match doc.extract_text(&[page]) {
                Ok(text) => text,
                Err(e) => {
                    trace!("No text on page {}: {}", page, e);
                    String::new()
                }
            })
            .collect()
    }
}

impl TextSource for PdfTextSource {
    fn read(&self, id: &str, source_filename: &str, data: &[u8]) -> Result<RawDocument> {
        let (doc, raw) = self.load(data)?;

        let mut pages = self.page_texts(&doc);
        debug!("Read {} pages from {}", pages.len(), source_filename);

        if pages.iter().all(|p| p.trim().is_empty()) {
            warn!("{}: no per-page text, trying whole-document extraction", source_filename);
            let text = pdf_extract::extract_text_from_mem(&raw)
                .map_err(|e| DocumentError::TextExtraction(e.to_string()))?;
            pages = vec![text];
        }

        require_text(RawDocument::new(id, source_filename, pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_parse_error() {
        let err = PdfTextSource::new().read("d", "bad.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }
}
