//! Validator behaviour through the public API, using a plain-text backend
//! where each line of the input file is one page.

use std::path::Path;

use papercheck_core::{BackendError, PdfBackend, PdfDocument, validate_bytes, validate_path};

struct LinePages;

struct Lines(Vec<String>);

impl PdfBackend for LinePages {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument + '_>, BackendError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Box::new(Lines(text.lines().map(String::from).collect())))
    }
}

impl PdfDocument for Lines {
    fn page_count(&self) -> usize {
        self.0.len()
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        self.0
            .get(index)
            .cloned()
            .ok_or_else(|| BackendError::ExtractionError(format!("no page {index}")))
    }
}

#[test]
fn accepts_a_paper_shaped_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.pdf");
    std::fs::write(
        &path,
        "Abstract: we study X.\nIntroduction\nMethods and Results, see arXiv:2101.00001\n",
    )
    .unwrap();

    let result = validate_path(&path, &LinePages);
    assert!(result.is_valid(), "unexpected rejection: {:?}", result.reason());
    assert_eq!(result.reason(), None);
}

#[test]
fn missing_file_is_a_read_error() {
    let result = validate_path(Path::new("/definitely/not/here.pdf"), &LinePages);
    assert!(!result.is_valid());
    assert!(result.reason().unwrap().starts_with("Error reading PDF: IO error:"));
}

#[test]
fn short_upload_is_rejected() {
    let result = validate_bytes(b"Abstract [1]\nIntroduction\n", &LinePages);
    assert_eq!(result.reason(), Some("Too few pages (<3)"));
}

#[test]
fn keywords_without_references_are_rejected() {
    let bytes = b"Abstract\nIntroduction\nDiscussion\nConclusion\n";
    let result = validate_bytes(bytes, &LinePages);
    assert_eq!(
        result.reason(),
        Some("No DOI, arXiv, or citation references found")
    );
}

#[test]
fn non_utf8_upload_never_panics() {
    let result = validate_bytes(&[0xff, 0xfe, 0x00, 0x25, 0x50, 0x44, 0x46], &LinePages);
    assert!(!result.is_valid());
    assert!(result.reason().unwrap().starts_with("Error reading PDF:"));
}
