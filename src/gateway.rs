//! Model gateway: the transport boundary to the hosted Gemini API.
//!
//! Uses reqwest for the HTTP exchange. The reply text is returned as-is;
//! interpreting it is the parser's job.

use crate::config::Config;
use crate::prompt::{Prompt, RequestMode};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("bookwise/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("model request timed out")]
    Timeout,
    #[error("model request failed: {0}")]
    Transport(reqwest::Error),
    #[error("model service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("model returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(err)
        }
    }
}

/// Sends a prompt to a language model and returns the raw reply text.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(&self, prompt: &Prompt) -> Result<String, GatewayError>;
}

/// Gateway backed by the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGateway")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiGateway {
    /// Build a gateway from explicit settings
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a gateway from the loaded configuration
    pub fn from_config(config: &Config, api_key: &str) -> Result<Self, GatewayError> {
        Self::new(
            &config.agent.base_url,
            &config.agent.model,
            api_key,
            Duration::from_secs(config.agent.timeout_secs),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn invoke(&self, prompt: &Prompt) -> Result<String, GatewayError> {
        let body = GenerateContentRequest::from_prompt(prompt);
        log::debug!(
            "sending {:?} request to model {} ({} prompt chars)",
            prompt.mode,
            self.model,
            prompt.text.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: error_message(&raw),
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        reply.into_text().ok_or(GatewayError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a Prompt) -> Self {
        let (generation_config, tools) = match prompt.mode {
            RequestMode::Structured => (
                Some(GenerationConfig {
                    response_mime_type: "application/json",
                    response_schema: &prompt.shape,
                }),
                None,
            ),
            RequestMode::SearchGrounded => (
                None,
                Some(vec![Tool {
                    google_search: GoogleSearch {},
                }]),
            ),
        };

        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: &prompt.text }],
            }],
            generation_config,
            tools,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Pull `error.message` out of a Gemini error body, falling back to the raw body
fn error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| raw.trim().to_string())
}
