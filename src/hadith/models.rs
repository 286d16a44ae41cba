//! Hadith content records in the shape served by HadithAPI.

use serde::{Deserialize, Serialize};

/// A hadith collection ("book")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithBook {
    #[serde(deserialize_with = "flexible::u64")]
    pub id: u64,
    #[serde(rename = "bookName")]
    pub book_name: String,
    #[serde(rename = "writerName")]
    pub writer_name: String,
    #[serde(rename = "aboutWriter", default)]
    pub about_writer: Option<String>,
    #[serde(rename = "writerDeath", default)]
    pub writer_death: Option<String>,
    #[serde(rename = "bookSlug")]
    pub book_slug: String,
    #[serde(deserialize_with = "flexible::u64", default)]
    pub hadiths_count: u64,
    #[serde(deserialize_with = "flexible::u64", default)]
    pub chapters_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    #[serde(deserialize_with = "flexible::u64")]
    pub id: u64,
    pub chapter_number: String,
    #[serde(default)]
    pub chapter_english: Option<String>,
    #[serde(default)]
    pub chapter_urdu: Option<String>,
    #[serde(default)]
    pub chapter_arabic: Option<String>,
    pub book_slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hadith {
    #[serde(deserialize_with = "flexible::u64")]
    pub id: u64,
    pub hadith_number: String,
    #[serde(default)]
    pub english_narrator: Option<String>,
    #[serde(default)]
    pub hadith_english: Option<String>,
    #[serde(default)]
    pub hadith_urdu: Option<String>,
    #[serde(default)]
    pub urdu_narrator: Option<String>,
    #[serde(default)]
    pub hadith_arabic: Option<String>,
    #[serde(default)]
    pub heading_arabic: Option<String>,
    #[serde(default)]
    pub heading_urdu: Option<String>,
    #[serde(default)]
    pub heading_english: Option<String>,
    #[serde(deserialize_with = "flexible::u64", default)]
    pub chapter_id: u64,
    pub book_slug: String,
    #[serde(default)]
    pub volume: Option<String>,
    /// Grade, e.g. `Sahih`
    pub status: String,
    #[serde(default)]
    pub book: Option<HadithBook>,
    #[serde(default)]
    pub chapter: Option<Chapter>,
}

/// One page of hadiths, Laravel paginator style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithPage {
    #[serde(deserialize_with = "flexible::u32")]
    pub current_page: u32,
    pub data: Vec<Hadith>,
    #[serde(deserialize_with = "flexible::u32")]
    pub last_page: u32,
    #[serde(deserialize_with = "flexible::u32")]
    pub per_page: u32,
    #[serde(deserialize_with = "flexible::u64")]
    pub total: u64,
}

impl HadithPage {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// `GET /books`
#[derive(Debug, Deserialize)]
pub struct BooksResponse {
    pub books: Vec<HadithBook>,
}

/// `GET /{book}/chapters`
#[derive(Debug, Deserialize)]
pub struct ChaptersResponse {
    pub chapters: Vec<Chapter>,
}

/// `GET /hadiths`
#[derive(Debug, Deserialize)]
pub struct HadithsResponse {
    pub hadiths: HadithPage,
}

/// Listing filter shared by the provider and the mirror
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadithFilter {
    pub collection: Option<String>,
    pub chapter: Option<String>,
    pub number: Option<String>,
    pub grade: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl HadithFilter {
    pub fn page_or_first(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

/// HadithAPI sends some counters as strings and others as numbers
mod flexible {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }

    pub fn u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = u64(deserializer)?;
        u32::try_from(value).map_err(de::Error::custom)
    }
}
