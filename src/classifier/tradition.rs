//! Religious traditions and their static profiles.
//!
//! Every tradition carries a [`TraditionProfile`]: the metadata the prompt
//! composer grounds the assistant in, plus the pattern groups the
//! [`PatternClassifier`](super::PatternClassifier) scores text against.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The closed set of traditions the assistant can classify into.
///
/// Declaration order matters: score ties resolve to the earliest variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tradition {
    Christianity,
    Islam,
    Judaism,
    Buddhism,
    Hinduism,
}

impl Tradition {
    /// All traditions in tie-break order.
    pub const ALL: [Tradition; 5] = [
        Tradition::Christianity,
        Tradition::Islam,
        Tradition::Judaism,
        Tradition::Buddhism,
        Tradition::Hinduism,
    ];

    /// Fallback when neither the text nor the profile carries a signal.
    pub const DEFAULT: Tradition = Tradition::Christianity;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Christianity => "christianity",
            Self::Islam => "islam",
            Self::Judaism => "judaism",
            Self::Buddhism => "buddhism",
            Self::Hinduism => "hinduism",
        }
    }

    /// Static profile for this tradition.
    pub fn profile(&self) -> &'static TraditionProfile {
        &PROFILES[*self as usize]
    }
}

impl Default for Tradition {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Tradition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tradition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "christianity" | "cristianismo" | "christian" => Ok(Self::Christianity),
            "islam" => Ok(Self::Islam),
            "judaism" | "judaismo" | "judaísmo" => Ok(Self::Judaism),
            "buddhism" | "budismo" => Ok(Self::Buddhism),
            "hinduism" | "hinduismo" => Ok(Self::Hinduism),
            _ => Err(format!("Unknown tradition: {s}")),
        }
    }
}

/// Which language family a pattern group targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFamily {
    Spanish,
    English,
    /// Native-script vocabulary (Arabic, Hebrew or Devanagari).
    Script,
}

/// One vocabulary pattern for a tradition in one language family.
pub struct PatternGroup {
    pub family: PatternFamily,
    pub pattern: Regex,
}

impl PatternGroup {
    fn new(family: PatternFamily, pattern: &str) -> Self {
        Self {
            family,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    /// Byte offsets where this group matches an already lowercased corpus.
    pub fn match_starts<'a>(&'a self, corpus: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.pattern.find_iter(corpus).map(|m| m.start())
    }
}

impl fmt::Debug for PatternGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternGroup")
            .field("family", &self.family)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Static metadata describing a tradition.
#[derive(Debug)]
pub struct TraditionProfile {
    pub tradition: Tradition,
    pub display_name: &'static str,
    pub scriptures: &'static [&'static str],
    pub central_figure: &'static str,
    pub practices: &'static [&'static str],
    pub denominations: &'static [&'static str],
    pub greeting: &'static str,
    pub patterns: Vec<PatternGroup>,
}

impl TraditionProfile {
    /// Number of distinct matches across every pattern group. Groups share
    /// vocabulary ("jesus", "dharma"), so a word matched by two groups counts
    /// once.
    pub fn score(&self, corpus: &str) -> usize {
        self.patterns
            .iter()
            .flat_map(|group| group.match_starts(corpus))
            .collect::<BTreeSet<_>>()
            .len()
    }
}

// Indexed by `Tradition as usize`; keep in declaration order.
static PROFILES: Lazy<[TraditionProfile; 5]> = Lazy::new(|| {
    use PatternFamily::*;
    [
        TraditionProfile {
            tradition: Tradition::Christianity,
            display_name: "Christianity",
            scriptures: &["Holy Bible (Old and New Testament)"],
            central_figure: "Jesus Christ",
            practices: &["prayer", "worship", "communion", "Bible reading", "service to others"],
            denominations: &["Catholic", "Protestant", "Orthodox", "Evangelical", "Pentecostal"],
            greeting: "Que la paz de Cristo esté contigo",
            patterns: vec![
                PatternGroup::new(
                    Spanish,
                    r"\b(biblia|jes[uú]s|jesucristo|cristo|cristian[oa]s?|cristianismo|iglesia|evangelios?|misa|ap[oó]stol(es)?|cat[oó]lic[oa]s?|evang[eé]lic[oa]s?|esp[ií]ritu santo|virgen mar[ií]a|salmos?)\b",
                ),
                PatternGroup::new(
                    English,
                    r"\b(bible|jesus|christ|christians?|christianity|church|gospels?|apostles?|catholics?|evangelicals?|holy spirit|psalms?)\b",
                ),
            ],
        },
        TraditionProfile {
            tradition: Tradition::Islam,
            display_name: "Islam",
            scriptures: &["Holy Quran", "Hadith"],
            central_figure: "Prophet Muhammad (peace be upon him)",
            practices: &["Salah (five daily prayers)", "Zakat", "Sawm (Ramadan fasting)", "Hajj", "Shahada"],
            denominations: &["Sunni", "Shia", "Sufi"],
            greeting: "As-salamu alaykum",
            patterns: vec![
                PatternGroup::new(
                    Spanish,
                    r"\b(cor[aá]n|al[aá]|mahoma|mezquitas?|ramad[aá]n|musulm[aá]n|musulman(es|a|as)|isl[aá]m|isl[aá]mic[oa]s?|hadiz|la meca|sunnah?)\b",
                ),
                PatternGroup::new(
                    English,
                    r"\b(quran|koran|allah|muhammad|mosques?|ramadan|muslims?|islamic|hadith|mecca|surah)\b",
                ),
                PatternGroup::new(Script, r"(الله|القرآن|محمد|مسجد|رمضان|الإسلام|سورة)"),
            ],
        },
        TraditionProfile {
            tradition: Tradition::Judaism,
            display_name: "Judaism",
            scriptures: &["Torah", "Tanakh", "Talmud"],
            central_figure: "Moses and the Patriarchs",
            practices: &["Shabbat", "kashrut", "Torah study", "prayer (tefillah)", "the festivals"],
            denominations: &["Orthodox", "Conservative", "Reform", "Reconstructionist"],
            greeting: "Shalom aleichem",
            patterns: vec![
                PatternGroup::new(
                    Spanish,
                    r"\b(tor[aá]|talmud|sinagogas?|jud[ií]os?|jud[ií]as?|juda[ií]smo|rabinos?|shab[aá]t|s[aá]bado jud[ií]o|kosher|mois[eé]s|tan[aá]j|pascua jud[ií]a)\b",
                ),
                PatternGroup::new(
                    English,
                    r"\b(torah|talmud|synagogues?|jews?|jewish|judaism|rabbis?|shabbat|sabbath|kosher|moses|tanakh|passover)\b",
                ),
                PatternGroup::new(Script, r"(תורה|שבת|בית כנסת|תלמוד|שלום|ישראל)"),
            ],
        },
        TraditionProfile {
            tradition: Tradition::Buddhism,
            display_name: "Buddhism",
            scriptures: &["Tripitaka (Pali Canon)", "Mahayana Sutras"],
            central_figure: "Siddhartha Gautama, the Buddha",
            practices: &["meditation", "mindfulness", "the Noble Eightfold Path", "compassion", "the Five Precepts"],
            denominations: &["Theravada", "Mahayana", "Vajrayana", "Zen"],
            greeting: "Namo Buddhaya",
            patterns: vec![
                PatternGroup::new(
                    Spanish,
                    r"\b(buda|budismo|budistas?|nirvana|karma|dharma|meditaci[oó]n|sutras?|iluminaci[oó]n|zen|sangha)\b",
                ),
                PatternGroup::new(
                    English,
                    r"\b(buddha|buddhism|buddhists?|nirvana|dharma|meditation|sutras?|enlightenment|mindfulness|sangha)\b",
                ),
            ],
        },
        TraditionProfile {
            tradition: Tradition::Hinduism,
            display_name: "Hinduism",
            scriptures: &["Vedas", "Upanishads", "Bhagavad Gita"],
            central_figure: "Brahman, revealed through Vishnu, Shiva and the Devi",
            practices: &["puja", "yoga", "mantra recitation", "dharma", "pilgrimage"],
            denominations: &["Vaishnavism", "Shaivism", "Shaktism", "Smartism"],
            greeting: "Namaste",
            patterns: vec![
                PatternGroup::new(
                    Spanish,
                    r"\b(hinduismo|hind[uú]es|hind[uú]|vedas?|bhagavad|gita|krishna|vishnu|shiva|brahman|upanishads?|puja|mantras?)\b",
                ),
                PatternGroup::new(
                    English,
                    r"\b(hinduism|hindus?|vedas?|bhagavad|gita|krishna|vishnu|shiva|brahman|upanishads?|puja|mantras?)\b",
                ),
                PatternGroup::new(Script, r"(ॐ|भगवद|गीता|कृष्ण|शिव|विष्णु|वेद|धर्म)"),
            ],
        },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_indexed_by_variant() {
        for tradition in Tradition::ALL {
            assert_eq!(tradition.profile().tradition, tradition);
        }
    }

    #[test]
    fn test_script_groups_only_where_expected() {
        let has_script = |t: Tradition| {
            t.profile()
                .patterns
                .iter()
                .any(|g| g.family == PatternFamily::Script)
        };
        assert!(has_script(Tradition::Islam));
        assert!(has_script(Tradition::Judaism));
        assert!(has_script(Tradition::Hinduism));
        assert!(!has_script(Tradition::Christianity));
        assert!(!has_script(Tradition::Buddhism));
    }

    #[test]
    fn test_each_match_counts_once() {
        let profile = Tradition::Islam.profile();
        assert_eq!(profile.score("corán, mezquita y ramadán. el corán otra vez"), 4);
    }

    #[test]
    fn test_shared_vocabulary_counts_once() {
        assert_eq!(Tradition::Christianity.profile().score("jesus"), 1);
        assert_eq!(Tradition::Hinduism.profile().score("krishna y la gita"), 2);
        assert_eq!(Tradition::Buddhism.profile().score("nirvana, dharma, sangha"), 3);
    }

    #[test]
    fn test_script_vocabulary_scores() {
        assert!(Tradition::Islam.profile().score("بسم الله الرحمن الرحيم") >= 1);
        assert!(Tradition::Judaism.profile().score("שבת שלום") >= 2);
    }

    #[test]
    fn test_from_str_accepts_spanish_names() {
        assert_eq!("Cristianismo".parse::<Tradition>().unwrap(), Tradition::Christianity);
        assert_eq!("budismo".parse::<Tradition>().unwrap(), Tradition::Buddhism);
        assert!("pastafarianism".parse::<Tradition>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Tradition::Hinduism).unwrap();
        assert_eq!(json, "\"hinduism\"");
    }
}
