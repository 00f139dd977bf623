//! Completion client: the external LLM behind the chat pipeline.
//!
//! The pipeline only knows the [`CompletionClient`] trait. The HTTP
//! implementation speaks the OpenAI-compatible `/chat/completions` protocol
//! (xAI by default) and is wired in by the server binary.
//!
//! Providers disagree on the shape of a completion: some return a bare string,
//! some `{ "response": ... }`, some `{ "text": ... }`, OpenAI-style APIs a
//! `choices` array. [`CompletionOutput`] captures all of them and
//! [`CompletionOutput::into_text`] is the one place they are unwrapped.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Message types
// ============================================================================

/// Role of a message in the completion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        })
    }
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Everything the LLM needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// The full system instruction.
    pub system_prompt: String,
    /// Conversation turns, oldest first, ending with the current user message.
    pub messages: Vec<ChatMessage>,
    /// Whether the model may ground its answer with live web search.
    pub web_search: bool,
}

// ============================================================================
// Output adapter
// ============================================================================

/// Raw completion payload as returned by a provider.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CompletionOutput {
    Text(String),
    Response { response: String },
    Wrapped { text: String },
    Choices { choices: Vec<Choice> },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionOutput {
    /// Unwrap the reply text. Blank replies are an error.
    pub fn into_text(self) -> Result<String, CompletionError> {
        let text = match self {
            Self::Text(text) => Some(text),
            Self::Response { response } => Some(response),
            Self::Wrapped { text } => Some(text),
            Self::Choices { choices } => choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
        };
        match text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(CompletionError::EmptyResponse),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure of the completion call. Always fatal to the chat request.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed completion payload: {0}")]
    Decode(String),

    #[error("No content in completion response")]
    EmptyResponse,
}

// ============================================================================
// Client trait
// ============================================================================

/// An LLM that turns a composed prompt plus conversation into a reply.
#[async_trait]
pub trait CompletionClient: Send + Sync + fmt::Debug {
    /// Model identifier, for logs.
    fn model(&self) -> &str;

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionOutput, CompletionError>;
}

// ============================================================================
// OpenAI-compatible HTTP client
// ============================================================================

/// Calls `{base_url}/chat/completions` with bearer auth.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: Option<f64>,
}

impl OpenAiCompatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: Some(0.7),
        })
    }

    pub fn temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Request body for one completion.
    pub fn build_body(&self, request: &CompletionRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(serde_json::json!({
            "role": Role::System,
            "content": request.system_prompt,
        }));
        for message in &request.messages {
            messages.push(serde_json::json!({
                "role": message.role,
                "content": message.content,
            }));
        }

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });
        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if request.web_search {
            body["search_parameters"] = serde_json::json!({ "mode": "auto" });
        }
        body
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompatClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionOutput, CompletionError> {
        let body = self.build_body(&request);
        log::debug!(
            "completion call (model={}, messages={}, web_search={})",
            self.model,
            request.messages.len(),
            request.web_search
        );

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let json: Value = resp.json().await?;
        serde_json::from_value(json).map_err(|e| CompletionError::Decode(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================
