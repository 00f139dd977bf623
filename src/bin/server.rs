//! faith-chat HTTP server binary.
//!
//! Starts an axum HTTP server exposing the chat endpoint the radio
//! platform's front end talks to.
//!
//! # Environment Variables
//!
//! - `PORT`: HTTP port (default: 8080)
//! - `LLM_API_KEY` / `XAI_API_KEY`: Bearer key for the completion endpoint
//! - `LLM_BASE_URL`, `LLM_MODEL`, `LLM_WEB_SEARCH`, `LLM_TIMEOUT_SECS`
//! - `BIBLE_API_URL`, `QURAN_API_URL`, `SCRIPTURE_TIMEOUT_SECS`
//! - `RUST_LOG`: Tracing filter (default: "info,faith_chat=debug")
//!
//! # Usage
//!
//! ```bash
//! XAI_API_KEY=... cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use faith_chat::config::ChatConfig;
use faith_chat::profile::{InMemoryProfileStore, TracingAuditSink};
use faith_chat::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,faith_chat=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    let config = ChatConfig::from_env();
    if config.llm_api_key.is_empty() {
        tracing::warn!("LLM_API_KEY / XAI_API_KEY not set; completions will be rejected upstream");
    }

    let state = AppState::from_config(
        &config,
        Arc::new(InMemoryProfileStore::new()),
        Arc::new(TracingAuditSink),
    )
    .context("failed to build HTTP clients")?;

    let app = app_router(state);

    tracing::info!(model = %config.llm_model, "faith-chat server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health: liveness probe");
    tracing::info!("  POST /chat: classify, answer, enrich");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
