//! Paper quality scoring.
//!
//! Each adapter wraps one remote call (a grammar-correction model or a
//! chat-completion API) and reshapes its reply. Clients are constructed
//! explicitly and passed in; nothing talks to the network at import time.

use thiserror::Error;

pub mod chat;
pub mod diff;
pub mod grammar;
pub mod report;
pub mod structure;
pub mod style;

pub use chat::{ChatClient, ChatCompletion};
pub use diff::count_text_differences;
pub use grammar::{
    CorrectionServiceClient, GrammarCheck, GrammarCorrector, HostedModelCorrector, grammar_check,
};
pub use report::{PaperRecord, ScoreReport, load_record, score_paper};
pub use structure::{StructureScores, structure_check};
pub use style::style_check;

/// Errors from the scoring adapters. None of them are retried.
#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("malformed reply from {service}: {source} (reply: {reply:?})")]
    MalformedReply {
        service: &'static str,
        reply: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0} returned an empty reply")]
    EmptyReply(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset error: {0}")]
    Dataset(String),
}

/// Parse `reply` as JSON, keeping the raw text on failure.
pub(crate) fn parse_reply<T: serde::de::DeserializeOwned>(
    service: &'static str,
    reply: &str,
) -> Result<T, ScoringError> {
    serde_json::from_str(reply).map_err(|source| ScoringError::MalformedReply {
        service,
        reply: reply.to_string(),
        source,
    })
}

/// Turn a non-2xx response into [`ScoringError::Api`].
pub(crate) async fn check_status(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ScoringError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ScoringError::Api {
        service,
        status: status.as_u16(),
        body,
    })
}
