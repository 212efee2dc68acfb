//! Chat-completion client for OpenAI-compatible APIs.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use papercheck_core::ScoringConfig;
use papercheck_core::config::{DEFAULT_CHAT_API_BASE, DEFAULT_CHAT_MODEL};

use crate::{ScoringError, check_status, parse_reply};

const SERVICE: &str = "chat completion API";

/// A model that answers a single prompt.
pub trait ChatCompletion: Send + Sync {
    /// Send `prompt` as one user message and return the trimmed reply.
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `POST {base_url}/chat/completions` at temperature 0.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: DEFAULT_CHAT_API_BASE.to_string(),
            api_key,
            model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &ScoringConfig) -> Self {
        Self::new(http, config.openai_api_key.clone())
            .with_base_url(&config.chat_api_base)
            .with_model(&config.chat_model)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ChatCompletion for ChatClient {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        max_tokens: u32,
    ) -> Pin<Box<dyn Future<Output = Result<String, ScoringError>> + Send + 'a>> {
        Box::pin(async move {
            let api_key = self
                .api_key
                .as_deref()
                .ok_or(ScoringError::NotConfigured("OPENAI_API_KEY"))?;

            let body = ChatRequest {
                model: &self.model,
                messages: [Message {
                    role: "user",
                    content: prompt,
                }],
                temperature: 0.0,
                max_tokens,
            };

            let resp = self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await?;
            let text = check_status(SERVICE, resp).await?.text().await?;

            let parsed: ChatResponse = parse_reply(SERVICE, &text)?;
            let content = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or(ScoringError::EmptyReply(SERVICE))?;

            tracing::debug!(model = %self.model, max_tokens, reply_len = content.len(), "chat completion");
            Ok(content.trim().to_string())
        })
    }
}
