//! Quran text lookups against an alquran.cloud compatible service.
//!
//! `GET {base}/ayah/{surah}:{ayah}/{edition}` returning
//! `{ "code": 200, "data": { "text": ... } }`. The service resolves one ayah
//! per call, so ranges are fetched ayah by ayah.

use async_trait::async_trait;
use serde::Deserialize;

use super::{LookupError, Passage, ScriptureSource};
use crate::citations::{Citation, QuranCitation};
use crate::classifier::LanguageCode;

/// Default public endpoint.
pub const DEFAULT_QURAN_API_URL: &str = "https://api.alquran.cloud/v1";

/// Longest ayah range fetched for a single citation.
pub const MAX_AYAH_RANGE: u32 = 10;

#[derive(Debug, Deserialize)]
struct AyahEnvelope {
    data: AyahData,
}

#[derive(Debug, Deserialize)]
struct AyahData {
    #[serde(default)]
    text: String,
}

/// Multi-edition Quran provider client.
#[derive(Debug, Clone)]
pub struct QuranApiSource {
    http: reqwest::Client,
    base_url: String,
}

impl QuranApiSource {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Edition for a language: Arabic original, Spanish, or English.
    pub fn edition_for(language: LanguageCode) -> &'static str {
        match language {
            LanguageCode::Ar => "quran-uthmani",
            LanguageCode::Es => "es.cortes",
            _ => "en.asad",
        }
    }

    /// Ayah numbers covered by a citation. Reversed ranges collapse to the
    /// first ayah; long ranges are capped at [`MAX_AYAH_RANGE`].
    pub fn ayah_numbers(citation: &QuranCitation) -> Vec<u32> {
        let first = citation.ayah;
        let last = citation
            .end_ayah
            .filter(|end| *end > first)
            .map(|end| end.min(first + MAX_AYAH_RANGE - 1))
            .unwrap_or(first);
        (first..=last).collect()
    }

    /// The part of `citation` that was actually fetched, ending at `last`.
    pub fn fetched_citation(citation: &QuranCitation, last: u32) -> QuranCitation {
        QuranCitation {
            surah: citation.surah,
            ayah: citation.ayah,
            end_ayah: (last > citation.ayah).then_some(last),
        }
    }

    async fn fetch_ayah(
        &self,
        surah: u32,
        ayah: u32,
        edition: &str,
    ) -> Result<Option<String>, LookupError> {
        let url = format!("{}/ayah/{}:{}/{}", self.base_url, surah, ayah, edition);
        let resp = self.http.get(&url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(LookupError::Status(resp.status().as_u16()));
        }

        let envelope: AyahEnvelope = resp
            .json()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))?;
        let text = envelope.data.text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

#[async_trait]
impl ScriptureSource for QuranApiSource {
    fn name(&self) -> &str {
        "alquran-cloud"
    }

    async fn fetch(
        &self,
        citation: &Citation,
        language: LanguageCode,
    ) -> Result<Option<Passage>, LookupError> {
        let Citation::Quran(quran) = citation else {
            return Err(LookupError::Unsupported(self.name().to_string()));
        };

        let edition = Self::edition_for(language);
        let mut verses = Vec::new();
        let mut last = quran.ayah;
        for ayah in Self::ayah_numbers(quran) {
            // A missing ayah ends the range; whatever was gathered stands.
            match self.fetch_ayah(quran.surah, ayah, edition).await? {
                Some(text) => {
                    verses.push(text);
                    last = ayah;
                }
                None => break,
            }
        }

        if verses.is_empty() {
            return Ok(None);
        }
        let fetched = Self::fetched_citation(quran, last);
        if fetched != *quran {
            log::debug!("{} shortened to {}", quran, fetched);
        }
        Ok(Some(Passage::new(Citation::Quran(fetched), verses.join(" "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(ayah: u32, end_ayah: Option<u32>) -> QuranCitation {
        QuranCitation {
            surah: 2,
            ayah,
            end_ayah,
        }
    }

    #[test]
    fn test_edition_for_language() {
        assert_eq!(QuranApiSource::edition_for(LanguageCode::Ar), "quran-uthmani");
        assert_eq!(QuranApiSource::edition_for(LanguageCode::Es), "es.cortes");
        assert_eq!(QuranApiSource::edition_for(LanguageCode::En), "en.asad");
        assert_eq!(QuranApiSource::edition_for(LanguageCode::Fr), "en.asad");
    }

    #[test]
    fn test_ayah_numbers() {
        assert_eq!(QuranApiSource::ayah_numbers(&citation(255, None)), vec![255]);
        assert_eq!(QuranApiSource::ayah_numbers(&citation(255, Some(257))), vec![255, 256, 257]);
        assert_eq!(QuranApiSource::ayah_numbers(&citation(5, Some(3))), vec![5]);
        assert_eq!(QuranApiSource::ayah_numbers(&citation(1, Some(100))).len(), 10);
    }

    #[test]
    fn test_fetched_citation_reports_capped_range() {
        let requested = citation(1, Some(100));
        let last = *QuranApiSource::ayah_numbers(&requested).last().unwrap();
        let fetched = QuranApiSource::fetched_citation(&requested, last);
        assert_eq!(fetched.to_string(), "Corán 2:1-10");

        assert_eq!(
            QuranApiSource::fetched_citation(&citation(255, Some(257)), 255).to_string(),
            "Corán 2:255"
        );
        assert_eq!(
            QuranApiSource::fetched_citation(&citation(255, None), 255),
            citation(255, None)
        );
    }

    #[test]
    fn test_envelope_decoding() {
        let json = r#"{"code":200,"status":"OK","data":{"number":262,"text":"Allah - there is no deity except Him"}}"#;
        let envelope: AyahEnvelope = serde_json::from_str(json).unwrap();
        assert!(envelope.data.text.starts_with("Allah"));
    }
}
