//! Request-level failures of the chat endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::llm::CompletionError;

/// Shown to users whenever the completion call fails, whatever the cause.
pub const FALLBACK_APOLOGY: &str = "Lo siento, en este momento no puedo responder. \
Por favor, inténtalo de nuevo en unos minutos. Que Dios te bendiga.";

/// Errors that abort a chat request.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or unusable input. Never retried.
    #[error("{0}")]
    InvalidInput(String),

    /// The LLM call failed; the only hard upstream failure.
    #[error("Completion failed: {0}")]
    Completion(#[from] CompletionError),
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Completion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::InvalidInput(message) => serde_json::json!({ "error": message }),
            Self::Completion(_) => serde_json::json!({
                "error": "Failed to generate response",
                "message": FALLBACK_APOLOGY,
            }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ChatError::InvalidInput("Message is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ChatError::from(CompletionError::EmptyResponse).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_completion_failure_hides_cause() {
        let err = ChatError::from(CompletionError::Status {
            status: 401,
            body: "invalid api key".into(),
        });
        let response = err.into_response();
        let body = axum::body::to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], FALLBACK_APOLOGY);
        assert!(!json.to_string().contains("invalid api key"));
    }
}
