//! Scripture citations found in assistant replies.
//!
//! Each tradition with a lookup source has its own citation grammar:
//!
//! - Christianity: `[1|2|3] Book Chapter:Verse[-EndVerse]`, e.g. `1 Juan 4:8`
//! - Islam: `Corán|Sura Surah:Ayah[-EndAyah]`, e.g. `Corán 2:255`
//!
//! Book names are not validated against a canon. Anything shaped like a
//! citation is extracted; lookups that find nothing are dropped later.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::classifier::Tradition;

/// A Bible passage reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleCitation {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub end_verse: Option<u32>,
}

/// A Quran passage reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuranCitation {
    pub surah: u32,
    pub ayah: u32,
    pub end_ayah: Option<u32>,
}

/// A structured scripture reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Citation {
    Bible(BibleCitation),
    Quran(QuranCitation),
}

impl fmt::Display for BibleCitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)?;
        if let Some(end) = self.end_verse {
            write!(f, "-{}", end)?;
        }
        Ok(())
    }
}

impl fmt::Display for QuranCitation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Corán {}:{}", self.surah, self.ayah)?;
        if let Some(end) = self.end_ayah {
            write!(f, "-{}", end)?;
        }
        Ok(())
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bible(c) => fmt::Display::fmt(c, f),
            Self::Quran(c) => fmt::Display::fmt(c, f),
        }
    }
}

static BIBLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:([123])\s*)?([A-Za-zÀ-ÖØ-öø-ÿ]+)\s+(\d{1,3}):(\d{1,3})\b(?:\s*[-–]\s*(\d{1,3})\b)?",
    )
    .unwrap()
});

static QURAN_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:cor[aá]n|sura)\s+(\d{1,3}):(\d{1,3})\b(?:\s*[-–]\s*(\d{1,3})\b)?")
        .unwrap()
});

/// Extract every citation for `tradition` from `reply`, in order of
/// appearance. Traditions without a grammar yield nothing.
pub fn extract_citations(reply: &str, tradition: Tradition) -> Vec<Citation> {
    let citations: Vec<Citation> = match tradition {
        Tradition::Christianity => BIBLE_REFERENCE
            .captures_iter(reply)
            .filter_map(|caps| bible_from_captures(&caps))
            .map(Citation::Bible)
            .collect(),
        Tradition::Islam => QURAN_REFERENCE
            .captures_iter(reply)
            .filter_map(|caps| quran_from_captures(&caps))
            .map(Citation::Quran)
            .collect(),
        Tradition::Judaism | Tradition::Buddhism | Tradition::Hinduism => Vec::new(),
    };
    log::debug!("extracted {} {} citation(s)", citations.len(), tradition);
    citations
}

fn bible_from_captures(caps: &Captures<'_>) -> Option<BibleCitation> {
    let name = caps.get(2)?.as_str();
    let book = match caps.get(1) {
        Some(ordinal) => format!("{} {}", ordinal.as_str(), name),
        None => name.to_string(),
    };
    Some(BibleCitation {
        book,
        chapter: number(caps, 3)?,
        verse: number(caps, 4)?,
        end_verse: number(caps, 5),
    })
}

fn quran_from_captures(caps: &Captures<'_>) -> Option<QuranCitation> {
    Some(QuranCitation {
        surah: number(caps, 1)?,
        ayah: number(caps, 2)?,
        end_ayah: number(caps, 3),
    })
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}
