//! Heuristic check that a PDF looks like an academic paper.
//!
//! Rules run in a fixed order and stop at the first failure:
//! 1. the document must open,
//! 2. it must have at least [`MIN_PAGES`] pages,
//! 3. the leading pages must mention at least [`MIN_SECTION_HITS`] section keywords,
//! 4. the leading pages must contain a DOI, an arXiv id, or a `[n]` citation marker.
//!
//! Keyword matching is plain substring search on lower-cased text, so
//! "introductionary" counts as "introduction".

use std::io::Write;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::backend::{self, PdfBackend};
use crate::{
    ACADEMIC_KEYWORDS, ExtractedDocument, MIN_PAGES, MIN_SECTION_HITS, Rejection, SAMPLE_PAGES,
    ValidationResult,
};

static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"doi:\s*10\.\d{4,9}/[-._;()/:a-z0-9]+").unwrap());
static ARXIV_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"arxiv:\s*\d{4}\.\d{4,5}").unwrap());
static CITATION_MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

/// Validate the PDF at `path`. Never fails: every problem becomes a negative result.
pub fn validate_path(path: &Path, backend: &dyn PdfBackend) -> ValidationResult {
    let outcome = run_checks(path, backend);
    if let Err(ref rejection) = outcome {
        tracing::debug!(path = %path.display(), reason = %rejection, "document rejected");
    }
    outcome.into()
}

/// Validate an in-memory PDF.
///
/// The bytes are spooled to a temporary `.pdf` file that is removed when this
/// function returns, whatever the outcome.
pub fn validate_bytes(bytes: &[u8], backend: &dyn PdfBackend) -> ValidationResult {
    validate_bytes_in(bytes, backend, &std::env::temp_dir())
}

fn validate_bytes_in(bytes: &[u8], backend: &dyn PdfBackend, dir: &Path) -> ValidationResult {
    let mut file = match tempfile::Builder::new()
        .prefix("papercheck-")
        .suffix(".pdf")
        .tempfile_in(dir)
    {
        Ok(f) => f,
        Err(e) => return Rejection::Unreadable(e.to_string()).into(),
    };
    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        return Rejection::Unreadable(e.to_string()).into();
    }

    validate_path(file.path(), backend)
}

fn run_checks(path: &Path, backend: &dyn PdfBackend) -> Result<(), Rejection> {
    let doc = backend
        .open(path)
        .map_err(|e| Rejection::Unreadable(e.to_string()))?;

    // Short documents are rejected before any page text is read.
    check_page_count(doc.page_count())?;

    let extracted = backend::extract(doc.as_ref(), SAMPLE_PAGES)
        .map_err(|e| Rejection::Unreadable(e.to_string()))?;
    check_document(&extracted)
}

/// Apply the page, section, and citation rules to already-extracted text.
pub fn check_document(doc: &ExtractedDocument) -> Result<(), Rejection> {
    check_page_count(doc.page_count)?;

    let text = doc.sampled_text.to_lowercase();

    let hits = section_hits(&text);
    if hits.len() < MIN_SECTION_HITS {
        return Err(Rejection::MissingSections(hits));
    }

    if !has_citations(&text) {
        return Err(Rejection::NoCitations);
    }

    Ok(())
}

fn check_page_count(page_count: usize) -> Result<(), Rejection> {
    if page_count < MIN_PAGES {
        Err(Rejection::TooFewPages)
    } else {
        Ok(())
    }
}

/// Keywords found in `text`, which must already be lower-cased.
fn section_hits(text: &str) -> Vec<&'static str> {
    ACADEMIC_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| text.contains(kw))
        .collect()
}

fn has_citations(text: &str) -> bool {
    DOI_RE.is_match(text) || ARXIV_RE.is_match(text) || CITATION_MARKER_RE.is_match(text)
}
