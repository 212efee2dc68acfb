//! Grammar correction and the word-level difference score.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use papercheck_core::ScoringConfig;

use crate::diff::count_text_differences;
use crate::{ScoringError, check_status, parse_reply};

/// Instruction the correction model is trained on.
pub const CORRECTION_PREFIX: &str = "Fix grammatical errors in this sentence: ";

/// Generation limit passed to hosted models.
pub const MAX_LENGTH: u32 = 512;

/// Something that returns a grammatically corrected copy of a text.
pub trait GrammarCorrector: Send + Sync {
    fn correct<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>>;
}

/// Corrected text and the number of word edits it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrammarCheck {
    pub corrected: String,
    pub differences: usize,
}

/// Correct `text` and score how much it changed.
pub async fn grammar_check(
    corrector: &dyn GrammarCorrector,
    text: &str,
) -> Result<GrammarCheck, ScoringError> {
    let corrected = corrector.correct(text).await?;
    let differences = count_text_differences(text, &corrected);
    Ok(GrammarCheck {
        corrected,
        differences,
    })
}

#[derive(Serialize)]
struct CorrectRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CorrectResponse {
    corrected: String,
}

/// Client for a correction service exposing `POST /correct`.
#[derive(Clone)]
pub struct CorrectionServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl CorrectionServiceClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &ScoringConfig) -> Self {
        Self::new(http, &config.grammar_service_url)
    }
}

impl GrammarCorrector for CorrectionServiceClient {
    fn correct<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        Box::pin(async move {
            const SERVICE: &str = "grammar service";

            let resp = self
                .http
                .post(format!("{}/correct", self.base_url))
                .json(&CorrectRequest { text })
                .send()
                .await?;
            let body = check_status(SERVICE, resp).await?.text().await?;
            let parsed: CorrectResponse = parse_reply(SERVICE, &body)?;
            Ok(parsed.corrected)
        })
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    inputs: String,
    parameters: GenerateParameters,
}

#[derive(Serialize)]
struct GenerateParameters {
    max_length: u32,
}

#[derive(Deserialize)]
struct Generated {
    generated_text: String,
}

/// Inference endpoints answer with either a list or a single object.
#[derive(Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Batch(Vec<Generated>),
    Single(Generated),
}

/// Text-to-text correction model behind a hosted inference endpoint.
///
/// This is what backs `POST /correct` on the web server.
#[derive(Clone)]
pub struct HostedModelCorrector {
    http: reqwest::Client,
    endpoint: Option<String>,
    token: Option<String>,
}

impl HostedModelCorrector {
    pub fn new(http: reqwest::Client, endpoint: Option<String>, token: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            token,
        }
    }

    pub fn from_config(http: reqwest::Client, config: &ScoringConfig) -> Self {
        Self::new(
            http,
            config.grammar_model_url.clone(),
            config.grammar_model_token.clone(),
        )
    }
}

impl GrammarCorrector for HostedModelCorrector {
    fn correct<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        Box::pin(async move {
            const SERVICE: &str = "grammar model";

            let endpoint = self
                .endpoint
                .as_deref()
                .ok_or(ScoringError::NotConfigured("GRAMMAR_MODEL_URL"))?;

            let body = GenerateRequest {
                inputs: format!("{CORRECTION_PREFIX}{text}"),
                parameters: GenerateParameters {
                    max_length: MAX_LENGTH,
                },
            };
            let mut req = self.http.post(endpoint).json(&body);
            if let Some(ref token) = self.token {
                req = req.bearer_auth(token);
            }

            let resp = req.send().await?;
            let body = check_status(SERVICE, resp).await?.text().await?;
            let generated = match parse_reply::<GenerateResponse>(SERVICE, &body)? {
                GenerateResponse::Batch(items) => items
                    .into_iter()
                    .next()
                    .ok_or(ScoringError::EmptyReply(SERVICE))?,
                GenerateResponse::Single(item) => item,
            };

            tracing::debug!(input_len = text.len(), output_len = generated.generated_text.len(), "grammar model reply");
            Ok(generated.generated_text.trim().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    impl GrammarCorrector for Fixed {
        fn correct<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
            Box::pin(async move { Ok(self.0.to_string()) })
        }
    }

    #[tokio::test]
    async fn grammar_check_counts_word_edits() {
        let check = grammar_check(
            &Fixed("This is a test sentence with grammatical errors."),
            "This are a test sentence with a grammatical errors.",
        )
        .await
        .unwrap();
        assert_eq!(check.differences, 1);
        assert_eq!(check.corrected, "This is a test sentence with grammatical errors.");
    }

    #[tokio::test]
    async fn unchanged_text_scores_zero() {
        let check = grammar_check(&Fixed("All good here."), "All good here.")
            .await
            .unwrap();
        assert_eq!(check.differences, 0);
    }

    #[tokio::test]
    async fn hosted_model_without_endpoint_fails_at_call_time() {
        let corrector = HostedModelCorrector::new(reqwest::Client::new(), None, None);
        let err = corrector.correct("text").await.unwrap_err();
        assert!(matches!(err, ScoringError::NotConfigured("GRAMMAR_MODEL_URL")));
    }

    #[test]
    fn generate_response_accepts_list_or_object() {
        let list: GenerateResponse =
            serde_json::from_str(r#"[{"generated_text": "Fixed."}]"#).unwrap();
        assert!(matches!(list, GenerateResponse::Batch(ref v) if v[0].generated_text == "Fixed."));

        let single: GenerateResponse =
            serde_json::from_str(r#"{"generated_text": "Fixed."}"#).unwrap();
        assert!(matches!(single, GenerateResponse::Single(ref g) if g.generated_text == "Fixed."));
    }
}
