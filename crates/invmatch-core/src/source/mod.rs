//! Document text sources: turn document bytes into page texts.

#[cfg(feature = "pdf")]
mod pdf;
mod plain;

#[cfg(feature = "pdf")]
pub use pdf::PdfTextSource;
pub use plain::PlainTextSource;

use std::path::Path;

use tracing::debug;

use crate::error::DocumentError;
use crate::models::document::RawDocument;

/// Result type for text-source operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// A facility that reads a document's page texts.
pub trait TextSource {
    /// Read one document from its raw bytes.
    fn read(&self, id: &str, source_filename: &str, data: &[u8]) -> Result<RawDocument>;
}

/// File extensions `read_path` accepts.
pub fn supported_extension(path: &Path) -> bool {
    matches!(extension(path).as_str(), "pdf" | "txt")
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Read a document from disk, choosing the source by file extension.
pub fn read_path(id: &str, path: &Path) -> Result<RawDocument> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let data = std::fs::read(path)
        .map_err(|e| DocumentError::Parse(format!("failed to read {}: {}", path.display(), e)))?;

    debug!("Read {} bytes from {}", data.len(), path.display());

    match extension(path).as_str() {
        #[cfg(feature = "pdf")]
        "pdf" => PdfTextSource::new().read(id, &filename, &data),
        "txt" => PlainTextSource.read(id, &filename, &data),
        other => Err(DocumentError::Parse(format!("unsupported file type: '{}'", other))),
    }
}

/// Reject documents without any text.
fn require_text(document: RawDocument) -> Result<RawDocument> {
    if document.is_blank() {
        return Err(DocumentError::NoText(document.source_filename));
    }
    Ok(document)
}
