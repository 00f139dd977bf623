//! Axum route handlers for the faith-chat HTTP server.
//!
//! # Routes
//!
//! - `GET /health`: Returns `{"status": "ok", "version": ..., "service": "faith-chat"}`
//! - `POST /chat`: Accepts `ChatRequest`, returns `ChatResponse`

use std::sync::Arc;
use std::time::Duration;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::{chat_handler, ChatPipeline};
use crate::classifier::PatternClassifier;
use crate::config::ChatConfig;
use crate::llm::{CompletionError, OpenAiCompatClient};
use crate::profile::{AuditSink, ProfileStore};
use crate::scripture::{BibleApiSource, QuranApiSource, ScriptureEnricher};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

impl AppState {
    pub fn new(pipeline: ChatPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Wire the HTTP collaborators described by `config` around the given
    /// profile store and audit sink.
    pub fn from_config(
        config: &ChatConfig,
        profiles: Arc<dyn ProfileStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, CompletionError> {
        let llm = OpenAiCompatClient::new(
            config.llm_base_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            config.llm_timeout,
        )?;

        // Shared by both scripture sources; per-lookup bounds come from the
        // enricher's timeout.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        let enricher = ScriptureEnricher::new(
            Arc::new(BibleApiSource::new(http.clone(), config.bible_api_url.clone())),
            Arc::new(QuranApiSource::new(http, config.quran_api_url.clone())),
        )
        .with_timeout(config.scripture_timeout);

        let pipeline = ChatPipeline::new(
            Arc::new(PatternClassifier::new()),
            Arc::new(llm),
            enricher,
            profiles,
            audit,
        )
        .with_web_search(config.web_search);

        Ok(Self::new(pipeline))
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health: liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "faith-chat",
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::chat::pipeline::tests::{pipeline_with, ScriptedLlm};
    use crate::chat::FALLBACK_APOLOGY;
    use crate::profile::{InMemoryAuditSink, InMemoryProfileStore, UserProfile};

    fn app(llm: ScriptedLlm, profiles: InMemoryProfileStore) -> Router {
        let pipeline = pipeline_with(
            Arc::new(llm),
            Arc::new(profiles),
            Arc::new(InMemoryAuditSink::new()),
            vec![],
        );
        app_router(AppState::new(pipeline))
    }

    fn post_chat(body: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/chat")
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = app(ScriptedLlm::replying("x"), InMemoryProfileStore::new());
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "faith-chat");
    }

    #[tokio::test]
    async fn test_anonymous_bible_question() {
        let app = app(
            ScriptedLlm::replying("La Biblia enseña que Dios es amor (1 Juan 4:8)."),
            InMemoryProfileStore::new(),
        );
        let response = app
            .oneshot(post_chat(r#"{"message": "¿Qué dice la Biblia del amor?"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["metadata"]["detected_religion"], "christianity");
        assert_eq!(json["metadata"]["detected_language"], "es");
        assert_eq!(json["metadata"]["spiritual_level"], "seeker");
        assert_eq!(json["metadata"]["scriptures_included"], true);
        let message = json["message"].as_str().unwrap();
        assert!(message.contains("Complete Sacred Texts"));
        assert!(message.contains("passage 1 Juan 4:8"));
    }

    #[tokio::test]
    async fn test_missing_message_is_bad_request() {
        let app = app(ScriptedLlm::replying("x"), InMemoryProfileStore::new());
        let response = app
            .oneshot(post_chat(r#"{"context": {}}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Message is required");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app(ScriptedLlm::replying("x"), InMemoryProfileStore::new());
        let response = app.oneshot(post_chat("{not json", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_completion_failure_returns_apology() {
        let app = app(ScriptedLlm::failing(), InMemoryProfileStore::new());
        let response = app
            .oneshot(post_chat(r#"{"message": "Hola"}"#, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["message"], FALLBACK_APOLOGY);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn test_authenticated_spiritual_level() {
        let profiles = InMemoryProfileStore::new();
        let mut user = UserProfile::new("u-7", "David", "david@example.org");
        user.spiritual_level = Some("mature".into());
        profiles.insert("secret", user);

        let app = app(ScriptedLlm::replying("Shalom."), profiles);
        let response = app
            .oneshot(post_chat(
                r#"{"message": "What does the Torah say about Shabbat?"}"#,
                Some("secret"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["metadata"]["detected_religion"], "judaism");
        assert_eq!(json["metadata"]["detected_language"], "en");
        assert_eq!(json["metadata"]["spiritual_level"], "mature");
        assert_eq!(json["metadata"]["scriptures_included"], false);
        assert_eq!(json["message"], "Shalom.");
    }

    #[tokio::test]
    async fn test_unknown_token_runs_anonymously() {
        let app = app(ScriptedLlm::replying("Paz."), InMemoryProfileStore::new());
        let response = app
            .oneshot(post_chat(r#"{"message": "Hola"}"#, Some("stale")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["metadata"]["spiritual_level"], "seeker");
    }

    #[test]
    fn test_from_config_wires_pipeline() {
        let state = AppState::from_config(
            &ChatConfig::default(),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(InMemoryAuditSink::new()),
        );
        assert!(state.is_ok());
    }
}
