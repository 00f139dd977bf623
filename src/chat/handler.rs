//! Chat handler: POST /chat endpoint implementation.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ChatError;
use super::pipeline::{ChatInput, ChatTurn};
use crate::classifier::{LanguageCode, Tradition};
use crate::profile::DEFAULT_SPIRITUAL_LEVEL;
use crate::server::AppState;

// ============================================================================
// Request / Response types
// ============================================================================

/// Incoming chat request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// The user's message text. Required; optional here so a missing field
    /// becomes a 400 rather than an extractor rejection.
    #[serde(default)]
    pub message: Option<String>,
    /// Page context from the platform. Accepted and not used.
    #[serde(default)]
    pub context: Option<Value>,
    /// Recent turns, oldest first.
    #[serde(default, rename = "conversationHistory", alias = "conversation_history")]
    pub conversation_history: Vec<ChatTurn>,
}

/// Summary of how the request was understood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMetadata {
    pub detected_religion: Tradition,
    pub detected_language: LanguageCode,
    pub confidence: f64,
    pub spiritual_level: String,
    pub scriptures_included: bool,
}

/// Successful chat response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub message: String,
    pub metadata: ChatMetadata,
}

// ============================================================================
// Handler
// ============================================================================

/// POST /chat: run one message through the pipeline.
pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected chat body");
        ChatError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    if request.context.is_some() {
        tracing::trace!("chat context supplied");
    }

    let input = ChatInput {
        message: request.message.unwrap_or_default(),
        history: request.conversation_history,
        bearer_token: bearer_token(&headers),
    };
    let outcome = state.pipeline.run(input).await?;

    let spiritual_level = outcome
        .user
        .as_ref()
        .map(|u| u.spiritual_level().to_string())
        .unwrap_or_else(|| DEFAULT_SPIRITUAL_LEVEL.to_string());

    Ok(Json(ChatResponse {
        success: true,
        message: outcome.reply,
        metadata: ChatMetadata {
            detected_religion: outcome.classification.tradition,
            detected_language: outcome.classification.language,
            confidence: outcome.classification.overall_confidence,
            spiritual_level,
            scriptures_included: !outcome.enriched.is_empty(),
        },
    }))
}

/// Token from an `Authorization: Bearer <token>` header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then(|| token.to_string())
}

// ============================================================================
// Tests
// ============================================================================
