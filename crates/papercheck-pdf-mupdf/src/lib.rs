use std::path::Path;

use mupdf::{Document, TextPageFlags};

use papercheck_core::{BackendError, PdfBackend, PdfDocument};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// so that the validator and the rest of the workspace do not link it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

/// A document opened by MuPDF. Pages are loaded on demand.
pub struct MupdfDocument {
    document: Document,
    page_count: usize,
}

impl PdfBackend for MupdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument + '_>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;
        let page_count = document
            .page_count()
            .map_err(|e| BackendError::OpenError(e.to_string()))?;

        Ok(Box::new(MupdfDocument {
            document,
            page_count: usize::try_from(page_count).unwrap_or(0),
        }))
    }
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let page_no = i32::try_from(index)
            .map_err(|_| BackendError::ExtractionError(format!("page index {index} out of range")))?;
        let page = self
            .document
            .load_page(page_no)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_file_yields_no_pages() {
        let dir = std::env::temp_dir().join(format!("papercheck-mupdf-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("garbage.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        // MuPDF may either refuse the file or "repair" it into an empty document.
        if let Ok(doc) = MupdfBackend::new().open(&path) {
            assert_eq!(doc.page_count(), 0);
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_fails_to_open() {
        let result = MupdfBackend::new().open(Path::new("/nonexistent/papercheck/input.pdf"));
        assert!(result.is_err());
    }
}
