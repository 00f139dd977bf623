//! User profiles and the audit trail.
//!
//! Both live outside this service. The pipeline talks to them through the
//! [`ProfileStore`] and [`AuditSink`] traits; writes are fire-and-forget and
//! their failures never reach the caller.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::classifier::{ClassificationResult, DeclaredPreferences, Intent, LanguageCode, Tradition};

/// Spiritual level reported for anonymous users and profiles without one.
pub const DEFAULT_SPIRITUAL_LEVEL: &str = "seeker";

/// Classification summary written back onto a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub religion: Tradition,
    pub religion_confidence: f64,
    pub language: LanguageCode,
    pub language_confidence: f64,
    pub detected_at: DateTime<Utc>,
}

impl DetectionSummary {
    pub fn from_result(result: &ClassificationResult) -> Self {
        Self {
            religion: result.tradition,
            religion_confidence: result.tradition_confidence,
            language: result.language,
            language_confidence: result.language_confidence,
            detected_at: Utc::now(),
        }
    }
}

/// A platform user as seen by the chat pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub declared_religion: Option<Tradition>,
    #[serde(default)]
    pub declared_language: Option<LanguageCode>,
    #[serde(default = "default_verification_level")]
    pub verification_level: String,
    #[serde(default)]
    pub spiritual_level: Option<String>,
    #[serde(default)]
    pub detection: Option<DetectionSummary>,
}

fn default_verification_level() -> String {
    "unverified".to_string()
}

impl UserProfile {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: email.into(),
            declared_religion: None,
            declared_language: None,
            verification_level: default_verification_level(),
            spiritual_level: None,
            detection: None,
        }
    }

    pub fn declared(&self) -> DeclaredPreferences {
        DeclaredPreferences {
            religion: self.declared_religion,
            language: self.declared_language,
        }
    }

    pub fn spiritual_level(&self) -> &str {
        self.spiritual_level
            .as_deref()
            .unwrap_or(DEFAULT_SPIRITUAL_LEVEL)
    }
}

/// One processed chat request, as recorded in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub tradition: Tradition,
    pub language: LanguageCode,
    pub confidence: f64,
    pub intent: Intent,
    pub message_length: usize,
    pub response_length: usize,
    pub scriptures_included: usize,
    pub created_at: DateTime<Utc>,
}

/// Failure of an external store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Profile not found: {0}")]
    NotFound(String),
}

/// The platform's user-profile store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Resolve a bearer token to its user. `Ok(None)` for unknown tokens.
    async fn find_by_token(&self, token: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn update_detection(
        &self,
        user_id: &str,
        summary: DetectionSummary,
    ) -> Result<(), StoreError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

// ============================================================================
// In-memory implementations
// ============================================================================

/// Token-indexed profiles held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    // token -> user id
    tokens: Arc<RwLock<HashMap<String, String>>>,
    profiles: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, profile: UserProfile) {
        self.tokens.write().insert(token.into(), profile.id.clone());
        self.profiles.write().insert(profile.id.clone(), profile);
    }

    pub fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.read().get(user_id).cloned()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find_by_token(&self, token: &str) -> Result<Option<UserProfile>, StoreError> {
        let user_id = self.tokens.read().get(token).cloned();
        Ok(user_id.and_then(|id| self.get(&id)))
    }

    async fn update_detection(
        &self,
        user_id: &str,
        summary: DetectionSummary,
    ) -> Result<(), StoreError> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        profile.detection = Some(summary);
        Ok(())
    }
}

/// Keeps audit entries in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.entries.write().push(entry);
        Ok(())
    }
}

/// Emits audit entries as structured `audit` log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
        tracing::info!(
            target: "audit",
            id = %entry.id,
            user_id = entry.user_id.as_deref().unwrap_or("anonymous"),
            tradition = %entry.tradition,
            language = %entry.language,
            confidence = entry.confidence,
            intent = %entry.intent,
            message_length = entry.message_length,
            response_length = entry.response_length,
            scriptures_included = entry.scriptures_included,
            "chat request processed"
        );
        Ok(())
    }
}
