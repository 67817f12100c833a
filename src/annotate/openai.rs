//! OpenAI-compatible chat completions annotator
//!
//! Sends one stateless request per declaration: a fixed system prompt, the
//! instruction, and the declaration's source. Works with any server exposing
//! `/chat/completions` in the OpenAI format.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Annotator;
use crate::error::AnnotationError;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 64;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SYSTEM_PROMPT: &str = "You are an expert Python developer.";
const INSTRUCTION: &str =
    "Explain what the following code does in 50 characters or fewer. Reply with the explanation only.";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Annotator backed by a chat completions endpoint.
pub struct OpenAiAnnotator {
    /// Never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    max_tokens: u32,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for OpenAiAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAnnotator")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiAnnotator {
    pub fn new(config: OpenAiConfig) -> Result<Self, AnnotationError> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AnnotationError::MissingApiKey)?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            api_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: config.max_tokens,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, source: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("{}\n\n{}", INSTRUCTION, source),
                },
            ],
            max_tokens: self.max_tokens,
        }
    }
}

impl Annotator for OpenAiAnnotator {
    fn explain(&mut self, source: &str) -> Result<String, AnnotationError> {
        let url = format!("{}/chat/completions", self.api_base);
        let request = self.build_request(source);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = api_error_message(response.text().unwrap_or_default());
            return Err(AnnotationError::Status { status, body });
        }

        let body: ChatCompletionResponse = response.json()?;
        debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "received explanation"
        );

        body.into_content().ok_or(AnnotationError::EmptyResponse)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// The `error.message` of an API error body, or the body itself.
fn api_error_message(body: String) -> String {
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body,
    }
}
