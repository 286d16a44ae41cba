//! Hadith mirror records and the storage traits over them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mirror::MirrorResult;

/// Stored collection metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub id: u64,
    pub slug: String,
    pub name: String,
    pub writer_name: String,
    pub about_writer: Option<String>,
    pub writer_death: Option<String>,
    pub hadiths_count: u64,
    pub chapters_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored chapter of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterRecord {
    pub id: u64,
    pub collection: String,
    pub chapter_number: String,
    /// Numeric prefix of `chapter_number`, for ordering
    pub number_sort: u64,
    pub english: Option<String>,
    pub urdu: Option<String>,
    pub arabic: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored hadith
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HadithRecord {
    pub id: u64,
    pub collection: String,
    pub hadith_number: String,
    /// Numeric prefix of `hadith_number`, for ordering
    pub number_sort: u64,
    pub chapter_id: u64,
    pub chapter_number: Option<String>,
    pub narrator: Option<String>,
    pub urdu_narrator: Option<String>,
    pub text_english: Option<String>,
    pub text_urdu: Option<String>,
    pub text_arabic: Option<String>,
    pub heading_english: Option<String>,
    pub heading_urdu: Option<String>,
    pub heading_arabic: Option<String>,
    pub volume: Option<String>,
    pub grade: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hadith query; every set field must match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HadithQuery {
    pub collection: Option<String>,
    pub chapter: Option<String>,
    pub number: Option<String>,
    /// Case-insensitive grade, e.g. `sahih`
    pub grade: Option<String>,
    /// Case-insensitive substring of the English text or narrator
    pub text: Option<String>,
    /// 1-based page
    pub page: u32,
    pub per_page: u32,
}

impl Default for HadithQuery {
    fn default() -> Self {
        Self {
            collection: None,
            chapter: None,
            number: None,
            grade: None,
            text: None,
            page: 1,
            per_page: 25,
        }
    }
}

impl HadithQuery {
    /// Records to skip before this page
    pub fn skip(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.per_page)
    }

    /// Structural match; `text` is left to the backend's pattern search
    ///
    /// Numbers, chapters and grades compare case-insensitively.
    pub fn matches(&self, record: &HadithRecord) -> bool {
        fn eq(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().map_or(true, |w| w == actual)
        }

        eq(&self.collection, &record.collection)
            && self
                .number
                .as_deref()
                .map_or(true, |n| record.hadith_number.eq_ignore_ascii_case(n))
            && self.chapter.as_deref().map_or(true, |c| {
                record
                    .chapter_number
                    .as_deref()
                    .is_some_and(|actual| actual.eq_ignore_ascii_case(c))
            })
            && self
                .grade
                .as_deref()
                .map_or(true, |g| record.grade.eq_ignore_ascii_case(g))
    }
}

/// One page of matching records plus the total across all pages
#[derive(Debug, Clone, PartialEq)]
pub struct HadithSlice {
    pub records: Vec<HadithRecord>,
    pub total: u64,
}

/// Sort key for identifiers without a numeric prefix; sorts last and still
/// fits a BSON int64
pub const UNNUMBERED: u64 = i64::MAX as u64;

/// Numeric prefix used to order identifiers such as `12a`
pub fn number_sort_key(number: &str) -> u64 {
    let digits: String = number
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(UNNUMBERED).min(UNNUMBERED)
}

/// Read access to the Hadith mirror
///
/// Chapters come back ordered by chapter number; hadiths by collection, then
/// hadith number.
#[async_trait]
pub trait HadithMirror: Send + Sync {
    async fn collections(&self) -> MirrorResult<Vec<CollectionRecord>>;

    async fn collection(&self, slug: &str) -> MirrorResult<Option<CollectionRecord>>;

    async fn chapters(&self, collection: &str) -> MirrorResult<Vec<ChapterRecord>>;

    async fn hadiths(&self, query: &HadithQuery) -> MirrorResult<HadithSlice>;
}

/// Write access used by the seeding job
#[async_trait]
pub trait HadithMirrorWriter: Send + Sync {
    /// Remove every Hadith record
    async fn clear_hadith(&self) -> MirrorResult<()>;

    async fn insert_collections(&self, records: Vec<CollectionRecord>) -> MirrorResult<usize>;

    async fn insert_chapters(&self, records: Vec<ChapterRecord>) -> MirrorResult<usize>;

    async fn insert_hadiths(&self, records: Vec<HadithRecord>) -> MirrorResult<usize>;
}
