//! Service configuration, read from the environment.
//!
//! | Variable                 | Default                          |
//! |--------------------------|----------------------------------|
//! | `LLM_API_KEY`            | `XAI_API_KEY`, else empty        |
//! | `LLM_BASE_URL`           | `https://api.x.ai/v1`            |
//! | `LLM_MODEL`              | `grok-3`                         |
//! | `LLM_WEB_SEARCH`         | `true`                           |
//! | `LLM_TIMEOUT_SECS`       | `60`                             |
//! | `BIBLE_API_URL`          | `https://bible-api.com`          |
//! | `QURAN_API_URL`          | `https://api.alquran.cloud/v1`   |
//! | `SCRIPTURE_TIMEOUT_SECS` | `8`                              |

use std::time::Duration;

use crate::scripture::bible::DEFAULT_BIBLE_API_URL;
use crate::scripture::quran::DEFAULT_QURAN_API_URL;

/// Configuration for the chat service.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// API key for the completion provider.
    pub llm_api_key: String,
    /// OpenAI-compatible API base URL.
    pub llm_base_url: String,
    /// Model used for replies.
    pub llm_model: String,
    /// Allow the model to ground answers with live web search.
    pub web_search: bool,
    pub llm_timeout: Duration,
    pub bible_api_url: String,
    pub quran_api_url: String,
    /// Upper bound for a single scripture lookup.
    pub scripture_timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            llm_base_url: "https://api.x.ai/v1".into(),
            llm_model: "grok-3".into(),
            web_search: true,
            llm_timeout: Duration::from_secs(60),
            bible_api_url: DEFAULT_BIBLE_API_URL.into(),
            quran_api_url: DEFAULT_QURAN_API_URL.into(),
            scripture_timeout: Duration::from_secs(8),
        }
    }
}

impl ChatConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            llm_api_key: lookup("LLM_API_KEY")
                .or_else(|| lookup("XAI_API_KEY"))
                .unwrap_or(defaults.llm_api_key),
            llm_base_url: lookup("LLM_BASE_URL").unwrap_or(defaults.llm_base_url),
            llm_model: lookup("LLM_MODEL").unwrap_or(defaults.llm_model),
            web_search: lookup("LLM_WEB_SEARCH")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.web_search),
            llm_timeout: lookup("LLM_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.llm_timeout),
            bible_api_url: lookup("BIBLE_API_URL").unwrap_or(defaults.bible_api_url),
            quran_api_url: lookup("QURAN_API_URL").unwrap_or(defaults.quran_api_url),
            scripture_timeout: lookup("SCRIPTURE_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.scripture_timeout),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
