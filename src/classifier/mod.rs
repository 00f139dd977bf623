//! Tradition and language classification of chat messages.
//!
//! ```text
//! message + last 5 history turns
//!   → lowercased corpus
//!   → per-tradition pattern counts  → best tradition + confidence
//!   → per-language pattern counts   → best language  + confidence
//!   → declared profile preferences fill in when the text is silent
//! ```
//!
//! Classification never fails: absence of signal degrades to the declared
//! preferences, then to the platform defaults.

pub mod intent;
pub mod language;
pub mod tradition;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use intent::{detect_intent, Intent};
pub use language::LanguageCode;
pub use tradition::{Tradition, TraditionProfile};

/// History turns considered when building the classification corpus.
pub const CLASSIFICATION_HISTORY_TURNS: usize = 5;

/// Tradition confidence reported when no tradition pattern matched.
pub const NEUTRAL_TRADITION_CONFIDENCE: f64 = 0.5;

/// Language confidence reported when no language pattern matched. Higher than
/// the tradition value: silence is read as "probably the default language".
pub const NEUTRAL_LANGUAGE_CONFIDENCE: f64 = 0.7;

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub message: String,
    pub sender_is_current_user: bool,
}

/// Preferences the user declared on their profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredPreferences {
    pub religion: Option<Tradition>,
    pub language: Option<LanguageCode>,
}

/// Input to a [`Classifier`].
#[derive(Debug, Clone, Default)]
pub struct ClassificationRequest {
    pub message: String,
    /// Oldest first.
    pub history: Vec<HistoryTurn>,
    pub declared: Option<DeclaredPreferences>,
}

impl ClassificationRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_history(mut self, history: Vec<HistoryTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn with_declared(mut self, declared: DeclaredPreferences) -> Self {
        self.declared = Some(declared);
        self
    }

    /// The current message followed by the most recent history turns,
    /// lowercased.
    pub fn corpus(&self) -> String {
        let skip = self.history.len().saturating_sub(CLASSIFICATION_HISTORY_TURNS);
        let mut corpus = self.message.to_lowercase();
        for turn in &self.history[skip..] {
            corpus.push('\n');
            corpus.push_str(&turn.message.to_lowercase());
        }
        corpus
    }
}

/// Raw per-candidate match counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScores {
    pub tradition_scores: BTreeMap<Tradition, usize>,
    pub language_scores: BTreeMap<LanguageCode, usize>,
}

/// Outcome of classifying one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub tradition: Tradition,
    pub tradition_confidence: f64,
    pub language: LanguageCode,
    pub language_confidence: f64,
    pub overall_confidence: f64,
    pub raw_scores: RawScores,
}

impl ClassificationResult {
    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.overall_confidence > threshold
    }
}

/// Maps a request onto a tradition and language.
///
/// The pattern matcher is the only implementation today; the contract is
/// model-agnostic so a learned classifier can slot in behind it.
pub trait Classifier: Send + Sync {
    fn classify(&self, request: &ClassificationRequest) -> ClassificationResult;

    fn name(&self) -> &str;
}

/// Vocabulary and script pattern classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternClassifier;

impl PatternClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for PatternClassifier {
    fn classify(&self, request: &ClassificationRequest) -> ClassificationResult {
        let corpus = request.corpus();
        let declared = request.declared.unwrap_or_default();

        let tradition_scores: BTreeMap<Tradition, usize> = Tradition::ALL
            .into_iter()
            .map(|t| (t, t.profile().score(&corpus)))
            .collect();
        let language_scores: BTreeMap<LanguageCode, usize> = LanguageCode::ALL
            .into_iter()
            .map(|l| (l, l.score(&corpus)))
            .collect();

        let (tradition, tradition_confidence) = pick(
            &Tradition::ALL,
            &tradition_scores,
            declared.religion.unwrap_or(Tradition::DEFAULT),
            NEUTRAL_TRADITION_CONFIDENCE,
        );
        let (language, language_confidence) = pick(
            &LanguageCode::ALL,
            &language_scores,
            declared.language.unwrap_or(LanguageCode::DEFAULT),
            NEUTRAL_LANGUAGE_CONFIDENCE,
        );
        let overall_confidence =
            clamp_unit((tradition_confidence + language_confidence) / 2.0);

        log::debug!(
            "classified as {}/{} (tradition={:.2}, language={:.2})",
            tradition,
            language,
            tradition_confidence,
            language_confidence
        );

        ClassificationResult {
            tradition,
            tradition_confidence,
            language,
            language_confidence,
            overall_confidence,
            raw_scores: RawScores {
                tradition_scores,
                language_scores,
            },
        }
    }

    fn name(&self) -> &str {
        "pattern"
    }
}

/// Highest-scoring candidate, earliest in `order` on ties, with its share of
/// the total. With no matches at all the fallback wins at the neutral
/// confidence.
fn pick<K: Copy + Ord>(
    order: &[K],
    scores: &BTreeMap<K, usize>,
    fallback: K,
    neutral: f64,
) -> (K, f64) {
    let total: usize = scores.values().sum();
    if total == 0 {
        return (fallback, neutral);
    }

    let mut best = order[0];
    let mut best_score = 0;
    for candidate in order {
        let score = scores.get(candidate).copied().unwrap_or(0);
        if score > best_score {
            best = *candidate;
            best_score = score;
        }
    }
    (best, clamp_unit(best_score as f64 / total as f64))
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
