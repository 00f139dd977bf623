//! Bible text lookups against a bible-api.com compatible service.
//!
//! `GET {base}/{book}+{chapter}:{verse}[-{end}]?translation={id}` returning
//! `{ "reference": ..., "text": ... }`.

use async_trait::async_trait;
use serde::Deserialize;

use super::{LookupError, Passage, ScriptureSource};
use crate::citations::{BibleCitation, Citation};
use crate::classifier::LanguageCode;

/// Default public endpoint.
pub const DEFAULT_BIBLE_API_URL: &str = "https://bible-api.com";

#[derive(Debug, Deserialize)]
struct PassageResponse {
    #[serde(default)]
    text: String,
}

/// Bible-text provider client.
#[derive(Debug, Clone)]
pub struct BibleApiSource {
    http: reqwest::Client,
    base_url: String,
}

impl BibleApiSource {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Translation id for a UI language, when the provider carries one.
    pub fn translation_for(language: LanguageCode) -> Option<&'static str> {
        match language {
            LanguageCode::En => Some("web"),
            LanguageCode::Pt => Some("almeida"),
            _ => None,
        }
    }

    /// Passage path segment, e.g. `1%20Juan+3:16-18`.
    pub fn passage_path(citation: &BibleCitation) -> String {
        let mut path = format!(
            "{}+{}:{}",
            citation.book.replace(' ', "%20"),
            citation.chapter,
            citation.verse
        );
        if let Some(end) = citation.end_verse {
            path.push_str(&format!("-{}", end));
        }
        path
    }
}

#[async_trait]
impl ScriptureSource for BibleApiSource {
    fn name(&self) -> &str {
        "bible-api"
    }

    async fn fetch(
        &self,
        citation: &Citation,
        language: LanguageCode,
    ) -> Result<Option<Passage>, LookupError> {
        let Citation::Bible(bible) = citation else {
            return Err(LookupError::Unsupported(self.name().to_string()));
        };

        let url = format!("{}/{}", self.base_url, Self::passage_path(bible));
        let mut request = self.http.get(&url);
        if let Some(translation) = Self::translation_for(language) {
            request = request.query(&[("translation", translation)]);
        }

        let resp = request.send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status().as_u16()));
        }

        let passage: PassageResponse = resp
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;
        let text = passage.text.trim();
        Ok((!text.is_empty()).then(|| Passage::new(citation.clone(), text)))
    }
}
