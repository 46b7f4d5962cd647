//! Thin client for the completion API that powers the insight screen.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("malformed completion: {0}")]
    Malformed(String),
    #[error("missing api key: ANTHROPIC_API_KEY environment variable not set")]
    MissingApiKey,
}

impl CompletionError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: Vec<ContentBlock>,
}

impl CompletionResponse {
    fn into_text(self) -> Option<String> {
        self.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: Client,
    api_key: String,
    model: String,
}

impl CompletionClient {
    /// Client configured from the ANTHROPIC_API_KEY environment
    /// variable.
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key =
            std::env::var("ANTHROPIC_API_KEY").map_err(|_| CompletionError::MissingApiKey)?;
        Self::new(api_key, None)
    }

    pub fn new(api_key: String, model: Option<String>) -> Result<Self, CompletionError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("prodtrack/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    /// Send a prompt and return the completion text. Transient
    /// failures are retried with exponential backoff.
    pub async fn complete(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
            system,
        };

        let response = (|| async { self.send(&request).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(3)
                    .with_jitter(),
            )
            .when(CompletionError::is_transient)
            .notify(|e, dur| {
                warn!(
                    "completion request failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await?;

        response
            .into_text()
            .ok_or_else(|| CompletionError::Malformed("no text content in response".to_string()))
    }

    /// Send a prompt and parse the completion as JSON, tolerating
    /// markdown code fences around the payload.
    pub async fn complete_json<T: for<'de> Deserialize<'de>>(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<T, CompletionError> {
        let text = self.complete(prompt, system).await?;
        let json = extract_json(&text);
        if json.trim().is_empty() {
            return Err(CompletionError::Malformed(
                "empty completion text".to_string(),
            ));
        }
        serde_json::from_str(json).map_err(|e| {
            warn!(
                preview = %json.chars().take(200).collect::<String>(),
                "failed to parse completion as JSON"
            );
            CompletionError::Malformed(e.to_string())
        })
    }

    async fn send(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, CompletionError> {
        let res = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Transport(e.to_string())
                }
            })?;

        match res.status() {
            s if s.is_success() => res
                .json::<CompletionResponse>()
                .await
                .map_err(|e| CompletionError::Malformed(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(CompletionError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(CompletionError::RateLimited),
            s => Err(CompletionError::Http {
                status: s.as_u16(),
                body: res.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Strip a markdown code fence around a JSON payload, if present.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content = start + "```json".len();
        if let Some(end) = text[content..].find("```") {
            return text[content..content + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content = start + 3;
        let content = text[content..]
            .find('\n')
            .map(|i| content + i + 1)
            .unwrap_or(content);
        if let Some(end) = text[content..].find("```") {
            return text[content..content + end].trim();
        }
    }

    text
}
