//! # faith-chat
//!
//! Chat backend for a multi-faith religious radio platform.
//!
//! Each message is classified by religious tradition and language, answered
//! by an LLM under a tradition-specific system prompt, and enriched with the
//! full text of any scripture passages the answer cites.
//!
//! - [`classifier`]: pattern-based tradition + language detection
//! - [`prompt`]: system prompt composition
//! - [`citations`]: Bible / Quran reference extraction
//! - [`scripture`]: passage lookup and reply enrichment
//! - [`chat`] + [`server`]: the `POST /chat` pipeline and its axum router

pub mod chat;
pub mod citations;
pub mod classifier;
pub mod config;
pub mod llm;
pub mod profile;
pub mod prompt;
pub mod scripture;
pub mod server;

pub use chat::{ChatPipeline, ChatRequest, ChatResponse};
pub use citations::{extract_citations, Citation};
pub use classifier::{
    ClassificationRequest, ClassificationResult, Classifier, LanguageCode, PatternClassifier,
    Tradition,
};
pub use config::ChatConfig;
pub use prompt::compose_prompt;
pub use scripture::{EnrichedCitation, ScriptureEnricher};

/// Crate version, reported by `GET /health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
