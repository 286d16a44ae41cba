//! Quran mirror records and the storage traits over them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::Sajda;
use crate::mirror::MirrorResult;

/// Stored surah metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurahRecord {
    pub number: u32,
    pub name: String,
    pub english_name: String,
    pub english_name_translation: String,
    pub number_of_ayahs: u32,
    pub revelation_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored edition metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditionRecord {
    pub identifier: String,
    pub language: String,
    pub name: String,
    pub english_name: String,
    pub format: String,
    pub kind: String,
    pub direction: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One verse of one edition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub surah: u32,
    /// Position inside the surah
    pub ayah: u32,
    /// Global verse number
    pub number: u32,
    pub edition: String,
    pub text: String,
    pub juz: u32,
    pub manzil: u32,
    pub page: u32,
    pub ruku: u32,
    pub hizb_quarter: u32,
    #[serde(default)]
    pub sajda: Sajda,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Verse query; every set field must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseFilter {
    pub edition: Option<String>,
    pub surah: Option<u32>,
    pub ayah: Option<u32>,
    pub number: Option<u32>,
    pub juz: Option<u32>,
    pub page: Option<u32>,
    /// Only verses whose position in the surah is greater than this
    pub ayah_after: Option<u32>,
    /// Only verses whose position in the surah is at most this
    pub ayah_through: Option<u32>,
    /// Case-insensitive substring of the verse text
    pub text: Option<String>,
}

impl VerseFilter {
    pub fn edition(edition: impl Into<String>) -> Self {
        Self {
            edition: Some(edition.into()),
            ..Default::default()
        }
    }

    /// Structural match; `text` is left to the backend's pattern search
    pub fn matches(&self, verse: &VerseRecord) -> bool {
        fn eq<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().map_or(true, |w| w == actual)
        }

        eq(&self.edition, &verse.edition)
            && eq(&self.surah, &verse.surah)
            && eq(&self.ayah, &verse.ayah)
            && eq(&self.number, &verse.number)
            && eq(&self.juz, &verse.juz)
            && eq(&self.page, &verse.page)
            && self.ayah_after.map_or(true, |after| verse.ayah > after)
            && self.ayah_through.map_or(true, |through| verse.ayah <= through)
    }
}

/// Read access to the Quran mirror
///
/// Verse queries return records ordered by global verse number.
#[async_trait]
pub trait QuranMirror: Send + Sync {
    async fn surahs(&self) -> MirrorResult<Vec<SurahRecord>>;

    async fn surah(&self, number: u32) -> MirrorResult<Option<SurahRecord>>;

    async fn editions(&self) -> MirrorResult<Vec<EditionRecord>>;

    async fn edition(&self, identifier: &str) -> MirrorResult<Option<EditionRecord>>;

    async fn verses(&self, filter: &VerseFilter) -> MirrorResult<Vec<VerseRecord>>;
}

/// Write access used by the seeding job
#[async_trait]
pub trait QuranMirrorWriter: Send + Sync {
    /// Remove every Quran record
    async fn clear_quran(&self) -> MirrorResult<()>;

    async fn insert_surahs(&self, records: Vec<SurahRecord>) -> MirrorResult<usize>;

    async fn insert_editions(&self, records: Vec<EditionRecord>) -> MirrorResult<usize>;

    async fn insert_verses(&self, records: Vec<VerseRecord>) -> MirrorResult<usize>;
}
