//! Keyword heuristic for the request intent recorded in the audit log.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Coarse intent of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Prayer,
    ScriptureStudy,
    Guidance,
    Greeting,
    Question,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prayer => "prayer",
            Self::ScriptureStudy => "scripture_study",
            Self::Guidance => "guidance",
            Self::Greeting => "greeting",
            Self::Question => "question",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static PRAYER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(ora(r|ci[oó]n|ciones)|reza(r)?|pray(er|ing)?|ruega|intercede|bendice)\b").unwrap()
});
static SCRIPTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(vers[ií]culos?|verses?|cap[ií]tulos?|chapters?|pasajes?|passages?|escrituras?|scriptures?|suras?|aleyas?)\b|\d+:\d+")
        .unwrap()
});
static GUIDANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(consejo|ayuda|ay[uú]dame|necesito|advice|help|guidance|triste|sad|ansiedad|anxiety|miedo|fear|perd[oó]n|forgive(ness)?)\b")
        .unwrap()
});
static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(hola|buenos d[ií]as|buenas (tardes|noches)|hello|hi|hey|shalom|salam|namaste)\b").unwrap()
});

/// Pick the first matching intent, in priority order.
pub fn detect_intent(message: &str) -> Intent {
    let text = message.to_lowercase();
    if PRAYER.is_match(&text) {
        Intent::Prayer
    } else if SCRIPTURE.is_match(&text) {
        Intent::ScriptureStudy
    } else if GUIDANCE.is_match(&text) {
        Intent::Guidance
    } else if GREETING.is_match(&text) {
        Intent::Greeting
    } else if text.contains('?') || text.contains('¿') {
        Intent::Question
    } else {
        Intent::General
    }
}
