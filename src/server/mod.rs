//! HTTP server for the chat pipeline.
//!
//! The platform's web front end calls this service and renders its JSON.
//!
//! # Endpoints
//!
//! - `GET /health`: Liveness probe
//! - `POST /chat`: Classify, answer and enrich one chat message

pub mod routes;

pub use routes::{app_router, AppState};
