//! Concurrent, failure-tolerant citation resolution and reply splicing.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use super::{EnrichedCitation, LookupError, Passage, ScriptureSource};
use crate::citations::Citation;
use crate::classifier::LanguageCode;

/// Heading separating the assistant reply from the appended passages.
pub const SACRED_TEXTS_HEADING: &str = "Complete Sacred Texts";

/// Default per-lookup timeout.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(8);

/// Routes each citation to the matching source and keeps the ones that
/// resolve.
#[derive(Clone)]
pub struct ScriptureEnricher {
    bible: Arc<dyn ScriptureSource>,
    quran: Arc<dyn ScriptureSource>,
    timeout: Duration,
}

impl ScriptureEnricher {
    pub fn new(bible: Arc<dyn ScriptureSource>, quran: Arc<dyn ScriptureSource>) -> Self {
        Self {
            bible,
            quran,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn source_for(&self, citation: &Citation) -> &Arc<dyn ScriptureSource> {
        match citation {
            Citation::Bible(_) => &self.bible,
            Citation::Quran(_) => &self.quran,
        }
    }

    /// Resolve every citation concurrently. Output keeps input order and
    /// omits citations whose lookup failed, timed out or found nothing. Each
    /// entry carries the reference the source actually resolved.
    pub async fn enrich(
        &self,
        citations: &[Citation],
        language: LanguageCode,
    ) -> Vec<EnrichedCitation> {
        let lookups = citations.iter().map(|citation| self.resolve(citation, language));
        join_all(lookups).await.into_iter().flatten().collect()
    }

    async fn resolve(&self, citation: &Citation, language: LanguageCode) -> Option<EnrichedCitation> {
        let source = self.source_for(citation);
        let outcome = match tokio::time::timeout(self.timeout, source.fetch(citation, language)).await
        {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(Some(Passage { citation, text })) => Some(EnrichedCitation {
                citation,
                resolved_text: text,
                source: source.name().to_string(),
            }),
            Ok(None) => {
                log::debug!("{} has no text for {}", source.name(), citation);
                None
            }
            Err(e) => {
                log::debug!("lookup of {} via {} failed: {}", citation, source.name(), e);
                None
            }
        }
    }
}

/// Append the resolved passages to `reply`. With nothing resolved the reply
/// is returned unchanged.
pub fn splice(reply: &str, enriched: &[EnrichedCitation]) -> String {
    if enriched.is_empty() {
        return reply.to_string();
    }

    let mut out = String::with_capacity(reply.len() + enriched.len() * 256);
    out.push_str(reply);
    let _ = write!(out, "\n\n---\n\n**{}:**\n", SACRED_TEXTS_HEADING);
    for (index, item) in enriched.iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. **{}**\n> \"{}\"\n",
            index + 1,
            item.citation,
            item.resolved_text
        );
    }
    out
}
