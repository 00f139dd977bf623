//! Supported UI languages and their detection patterns.
//!
//! Latin-script languages are recognised by a stop-word vocabulary; the rest
//! by runs of characters from their Unicode block.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Closed set of supported languages, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    Es,
    En,
    Ar,
    He,
    Hi,
    Fr,
    Pt,
    De,
    It,
    Ja,
    Zh,
    Ko,
    Ru,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 13] = [
        LanguageCode::Es,
        LanguageCode::En,
        LanguageCode::Ar,
        LanguageCode::He,
        LanguageCode::Hi,
        LanguageCode::Fr,
        LanguageCode::Pt,
        LanguageCode::De,
        LanguageCode::It,
        LanguageCode::Ja,
        LanguageCode::Zh,
        LanguageCode::Ko,
        LanguageCode::Ru,
    ];

    /// The platform's primary audience is Spanish-speaking.
    pub const DEFAULT: LanguageCode = LanguageCode::Es;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
            Self::Ar => "ar",
            Self::He => "he",
            Self::Hi => "hi",
            Self::Fr => "fr",
            Self::Pt => "pt",
            Self::De => "de",
            Self::It => "it",
            Self::Ja => "ja",
            Self::Zh => "zh",
            Self::Ko => "ko",
            Self::Ru => "ru",
        }
    }

    /// Number of pattern matches for this language in a lowercased corpus.
    pub fn score(&self, corpus: &str) -> usize {
        PATTERNS[*self as usize].find_iter(corpus).count()
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept region-tagged codes such as "es-MX" or "pt_BR".
        let primary = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == primary)
            .ok_or_else(|| format!("Unsupported language: {s}"))
    }
}

// Indexed by `LanguageCode as usize`.
static PATTERNS: Lazy<[Regex; 13]> = Lazy::new(|| {
    [
        r"\b(el|la|los|las|de|del|que|qué|y|en|un|una|por|para|con|es|está|dice|cómo|como|porque|pero|mi|tu|sobre)\b",
        r"\b(the|and|is|are|what|how|does|of|to|in|that|it|with|for|about|my|your|this|be)\b",
        r"[\x{0600}-\x{06FF}]+",
        r"[\x{0590}-\x{05FF}]+",
        r"[\x{0900}-\x{097F}]+",
        r"\b(le|les|des|du|et|est|une|qui|pour|avec|dans|je|vous|nous|ce|pas|où)\b",
        r"\b(o|os|do|da|dos|das|não|em|um|uma|com|é|você|isso|está|muito|seu|sua)\b",
        r"\b(der|die|das|und|ist|nicht|ein|eine|ich|sie|mit|auf|für|wie|was|gott)\b",
        r"\b(il|lo|gli|di|che|è|sono|per|non|una|come|della|nel|anche|perché)\b",
        r"[\x{3040}-\x{30FF}]+",
        r"[\x{4E00}-\x{9FFF}]+",
        r"[\x{AC00}-\x{D7AF}]+",
        r"[\x{0400}-\x{04FF}]+",
    ]
    .map(|pattern| Regex::new(pattern).unwrap())
});
