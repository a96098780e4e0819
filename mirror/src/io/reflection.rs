//! Reflection collaborator abstraction.
//!
//! The [`Reflector`] trait decouples the journaling flow from the text
//! generation backend. Production uses [`ChatCompletionsReflector`], which
//! talks to an OpenAI-compatible `/chat/completions` endpoint; tests use the
//! scripted reflectors in `test_support`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::io::config::ReflectionConfig;

/// Why a reflection could not be produced.
///
/// Callers treat every variant the same way; the distinction exists for logs
/// and for the text that ends up in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectionError {
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("network error: {0}")]
    Network(String),
    #[error("authentication rejected (status {0})")]
    Unauthorized(u16),
    #[error("rate limited or out of quota")]
    RateLimited,
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },
    #[error("unexpected response: {0}")]
    MalformedResponse(String),
}

/// A text generation service that answers one instruction with one reply.
#[async_trait]
pub trait Reflector: Send + Sync {
    async fn reflect(&self, prompt: &str) -> Result<String, ReflectionError>;
}

/// Client for an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct ChatCompletionsReflector {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl ChatCompletionsReflector {
    /// Build a client from config and an already-resolved API key.
    pub fn new(cfg: &ReflectionConfig, api_key: impl Into<String>) -> Result<Self, ReflectionError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|err| ReflectionError::Network(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            api_key: api_key.into(),
            timeout_secs: cfg.timeout_secs,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify_send_error(&self, err: reqwest::Error) -> ReflectionError {
        if err.is_timeout() {
            ReflectionError::Timeout(self.timeout_secs)
        } else {
            ReflectionError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Reflector for ChatCompletionsReflector {
    #[instrument(skip_all, fields(model = %self.model, prompt_bytes = prompt.len()))]
    async fn reflect(&self, prompt: &str) -> Result<String, ReflectionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await
            .map_err(|err| self.classify_send_error(err))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.classify_send_error(err))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "chat completion request failed");
            return Err(classify_status(status, body));
        }

        let content = parse_completion_content(&body)?;
        debug!(bytes = content.len(), "chat completion received");
        Ok(content)
    }
}

fn classify_status(status: StatusCode, body: String) -> ReflectionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ReflectionError::Unauthorized(status.as_u16())
        }
        StatusCode::TOO_MANY_REQUESTS => ReflectionError::RateLimited,
        _ => ReflectionError::Api {
            status: status.as_u16(),
            body: truncate(&body, 500),
        },
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Extract `choices[0].message.content` from a chat completions body.
pub fn parse_completion_content(body: &str) -> Result<String, ReflectionError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|err| ReflectionError::MalformedResponse(err.to_string()))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ReflectionError::MalformedResponse("no message content".to_string()))?;
    let content = content.trim();
    if content.is_empty() {
        return Err(ReflectionError::MalformedResponse(
            "empty message content".to_string(),
        ));
    }
    Ok(content.to_string())
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
