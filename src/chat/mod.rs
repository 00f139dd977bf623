//! Chat module: POST /chat endpoint for the spiritual assistant.
//!
//! ```text
//! User message
//!   → Classify tradition + language (pattern classifier)
//!   → Compose tradition-specific system prompt
//!   → Call the LLM
//!   → Extract scripture citations from the reply
//!   → Resolve and append the cited passages
//!   → Return reply + classification metadata
//!   ↳ (background) profile write-back, audit entry
//! ```

pub mod error;
pub mod handler;
pub mod pipeline;

pub use error::{ChatError, FALLBACK_APOLOGY};
pub use handler::{chat_handler, ChatMetadata, ChatRequest, ChatResponse};
pub use pipeline::{ChatInput, ChatOutcome, ChatPipeline, ChatTurn, PROFILE_UPDATE_THRESHOLD};
