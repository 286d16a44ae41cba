//! Quran content records in the shape served by AlQuran Cloud.
//!
//! These are the values the gateway returns and caches, whichever tier
//! produced them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// AlQuran Cloud response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub status: String,
    pub data: T,
}

/// A translation, transliteration or Arabic text edition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub identifier: String,
    pub language: String,
    pub name: String,
    pub english_name: String,
    pub format: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Surah metadata without verses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahSummary {
    pub number: u32,
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub number_of_ayahs: u32,
    pub revelation_type: String,
}

/// Prostration marker: `false` on most verses, details on the fifteen that carry one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sajda {
    Flag(bool),
    Detail {
        id: u32,
        recommended: bool,
        obligatory: bool,
    },
}

impl Default for Sajda {
    fn default() -> Self {
        Sajda::Flag(false)
    }
}

/// Verse as listed inside a surah
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurahAyah {
    pub number: u32,
    pub text: String,
    pub number_in_surah: u32,
    pub juz: u32,
    pub manzil: u32,
    pub page: u32,
    pub ruku: u32,
    pub hizb_quarter: u32,
    #[serde(default)]
    pub sajda: Sajda,
}

/// A full surah in one edition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surah {
    pub number: u32,
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub revelation_type: String,
    pub number_of_ayahs: u32,
    pub ayahs: Vec<SurahAyah>,
    pub edition: Edition,
}

/// A single verse with its surah and edition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ayah {
    pub number: u32,
    pub text: String,
    pub edition: Edition,
    pub surah: SurahSummary,
    pub number_in_surah: u32,
    pub juz: u32,
    pub manzil: u32,
    pub page: u32,
    pub ruku: u32,
    pub hizb_quarter: u32,
    #[serde(default)]
    pub sajda: Sajda,
}

/// Verse as listed inside a juz or a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAyah {
    pub number: u32,
    pub text: String,
    pub surah: SurahSummary,
    pub number_in_surah: u32,
    pub juz: u32,
    pub manzil: u32,
    pub page: u32,
    pub ruku: u32,
    pub hizb_quarter: u32,
    #[serde(default)]
    pub sajda: Sajda,
}

/// A juz or a mushaf page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuranSection {
    pub number: u32,
    pub ayahs: Vec<SectionAyah>,
    /// Surahs touched by the section, keyed by surah number
    pub surahs: BTreeMap<u32, SurahSummary>,
    pub edition: Edition,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub number: u32,
    pub text: String,
    pub edition: Edition,
    pub surah: SurahSummary,
    pub number_in_surah: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub count: u32,
    pub matches: Vec<SearchMatch>,
}

/// Window of verses inside a surah: skip `offset`, then return up to `limit`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AyahRange {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl AyahRange {
    pub fn is_full(&self) -> bool {
        self.offset.is_none() && self.limit.is_none()
    }

    /// Exclusive lower and inclusive upper bound on `numberInSurah`
    pub fn bounds(&self) -> (u32, Option<u32>) {
        let after = self.offset.unwrap_or(0);
        (after, self.limit.map(|limit| after.saturating_add(limit)))
    }
}

/// Where a keyword search looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    All,
    Surah(u32),
}

impl SearchScope {
    pub fn surah(self) -> Option<u32> {
        match self {
            SearchScope::All => None,
            SearchScope::Surah(number) => Some(number),
        }
    }
}

impl From<Option<u32>> for SearchScope {
    fn from(surah: Option<u32>) -> Self {
        surah.map_or(SearchScope::All, SearchScope::Surah)
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchScope::All => f.write_str("all"),
            SearchScope::Surah(number) => write!(f, "{}", number),
        }
    }
}
