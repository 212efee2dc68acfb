use std::path::Path;

use thiserror::Error;

use crate::ExtractedDocument;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Opening is separate from page access so that callers can look at the
/// page count before paying for any text extraction.
pub trait PdfBackend: Send + Sync {
    /// Open the document at `path`.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument + '_>, BackendError>;
}

/// An opened document.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Plain text of the page at `index` (0-based). Pages without a text
    /// layer yield an empty string.
    fn page_text(&self, index: usize) -> Result<String, BackendError>;
}

/// Concatenate the text of the first `min(max_pages, page_count)` pages.
pub fn extract(doc: &dyn PdfDocument, max_pages: usize) -> Result<ExtractedDocument, BackendError> {
    let page_count = doc.page_count();
    let mut sampled_text = String::new();
    for index in 0..page_count.min(max_pages) {
        sampled_text.push_str(&doc.page_text(index)?);
    }
    Ok(ExtractedDocument {
        page_count,
        sampled_text,
    })
}
