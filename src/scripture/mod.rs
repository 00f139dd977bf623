//! Scripture lookup and reply enrichment.
//!
//! Citations extracted from an assistant reply are resolved against external
//! scripture APIs and the retrieved passages are appended to the reply.
//! Lookups are best-effort: a citation that fails to resolve is dropped.

pub mod bible;
pub mod enricher;
pub mod quran;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::citations::Citation;
use crate::classifier::LanguageCode;

pub use bible::BibleApiSource;
pub use enricher::{splice, ScriptureEnricher, SACRED_TEXTS_HEADING};
pub use quran::QuranApiSource;

/// A citation together with the text it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCitation {
    pub citation: Citation,
    pub resolved_text: String,
    /// Name of the source that produced the text.
    pub source: String,
}

/// Text returned by a source, with the reference it actually covers. This
/// can be narrower than the requested citation when a range was cut short.
#[derive(Debug, Clone, PartialEq)]
pub struct Passage {
    pub citation: Citation,
    pub text: String,
}

impl Passage {
    pub fn new(citation: Citation, text: impl Into<String>) -> Self {
        Self {
            citation,
            text: text.into(),
        }
    }
}

/// Why a single lookup produced no text.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scripture API returned {0}")]
    Status(u16),

    #[error("Malformed scripture payload: {0}")]
    Decode(String),

    #[error("Lookup timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("{0} cannot resolve this citation kind")]
    Unsupported(String),
}

/// An external source of scripture text.
///
/// `Ok(None)` means the source answered but has no passage for the citation.
/// Sources may narrow the returned [`Passage::citation`] to what they fetched.
#[async_trait]
pub trait ScriptureSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        citation: &Citation,
        language: LanguageCode,
    ) -> Result<Option<Passage>, LookupError>;
}
