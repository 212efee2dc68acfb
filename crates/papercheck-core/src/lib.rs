use std::fmt;

use serde::Serialize;

pub mod backend;
pub mod config;
pub mod config_file;
pub mod validator;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend, PdfDocument};
pub use config::{Config, ScoringConfig, ServerConfig, StorageConfig};
pub use validator::{check_document, validate_bytes, validate_path};

/// Documents shorter than this are rejected before any text is extracted.
pub const MIN_PAGES: usize = 3;

/// Number of leading pages whose text is sampled for the heuristics.
pub const SAMPLE_PAGES: usize = 5;

/// Minimum number of distinct section keywords a paper must mention.
pub const MIN_SECTION_HITS: usize = 3;

/// Section headings looked for in the sampled text, in reporting order.
pub const ACADEMIC_KEYWORDS: [&str; 9] = [
    "abstract",
    "introduction",
    "methodology",
    "methods",
    "results",
    "discussion",
    "conclusion",
    "references",
    "bibliography",
];

/// Page count plus the concatenated text of the leading pages of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub page_count: usize,
    /// Text of the first `min(SAMPLE_PAGES, page_count)` pages, joined with no separator.
    pub sampled_text: String,
}

/// Why a document was judged not to be an academic paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The document could not be opened or its text could not be read.
    Unreadable(String),
    TooFewPages,
    /// Fewer than [`MIN_SECTION_HITS`] keywords matched; holds the ones that did.
    MissingSections(Vec<&'static str>),
    NoCitations,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Unreadable(msg) => write!(f, "Error reading PDF: {msg}"),
            Rejection::TooFewPages => write!(f, "Too few pages (<{MIN_PAGES})"),
            Rejection::MissingSections(found) => write!(
                f,
                "Missing common academic sections: found only {}",
                found.join(", ")
            ),
            Rejection::NoCitations => write!(f, "No DOI, arXiv, or citation references found"),
        }
    }
}

/// Verdict returned for every validated document.
///
/// `reason` is present exactly when `valid` is false; the private fields and
/// the two constructors keep it that way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

impl From<Rejection> for ValidationResult {
    fn from(rejection: Rejection) -> Self {
        Self {
            valid: false,
            reason: Some(rejection.to_string()),
        }
    }
}

impl From<Result<(), Rejection>> for ValidationResult {
    fn from(outcome: Result<(), Rejection>) -> Self {
        match outcome {
            Ok(()) => Self::valid(),
            Err(rejection) => rejection.into(),
        }
    }
}
