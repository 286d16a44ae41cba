//! Catalogue of read operations served through the resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::ttl::OperationTtl;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Content domain an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Quran,
    Hadith,
}

/// What the resolver does when the remote authoritatively reports "nothing here"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// The remote's not-found is final; the mirror is only consulted when the
    /// remote call fails.
    RemoteAuthoritative,
    /// An empty remote answer is treated like a failure and the mirror is
    /// consulted as well.
    MirrorOnEmpty,
}

/// Every logical read operation exposed by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "surahs")]
    QuranSurahList,
    #[serde(rename = "surah")]
    QuranSurah,
    #[serde(rename = "verse")]
    QuranAyah,
    #[serde(rename = "juz")]
    QuranJuz,
    #[serde(rename = "page")]
    QuranPage,
    #[serde(rename = "quran-search")]
    QuranSearch,
    #[serde(rename = "hadith-collections")]
    HadithCollections,
    #[serde(rename = "hadith-chapters")]
    HadithChapters,
    #[serde(rename = "hadith")]
    HadithByNumber,
    #[serde(rename = "hadiths")]
    HadithList,
    #[serde(rename = "hadith-search")]
    HadithSearch,
}

impl Operation {
    pub const ALL: [Operation; 11] = [
        Operation::QuranSurahList,
        Operation::QuranSurah,
        Operation::QuranAyah,
        Operation::QuranJuz,
        Operation::QuranPage,
        Operation::QuranSearch,
        Operation::HadithCollections,
        Operation::HadithChapters,
        Operation::HadithByNumber,
        Operation::HadithList,
        Operation::HadithSearch,
    ];

    /// Stable name used as the first cache key segment and in logs/metrics
    pub fn name(self) -> &'static str {
        match self {
            Operation::QuranSurahList => "surahs",
            Operation::QuranSurah => "surah",
            Operation::QuranAyah => "verse",
            Operation::QuranJuz => "juz",
            Operation::QuranPage => "page",
            Operation::QuranSearch => "quran-search",
            Operation::HadithCollections => "hadith-collections",
            Operation::HadithChapters => "hadith-chapters",
            Operation::HadithByNumber => "hadith",
            Operation::HadithList => "hadiths",
            Operation::HadithSearch => "hadith-search",
        }
    }

    pub fn domain(self) -> Domain {
        match self {
            Operation::QuranSurahList
            | Operation::QuranSurah
            | Operation::QuranAyah
            | Operation::QuranJuz
            | Operation::QuranPage
            | Operation::QuranSearch => Domain::Quran,
            Operation::HadithCollections
            | Operation::HadithChapters
            | Operation::HadithByNumber
            | Operation::HadithList
            | Operation::HadithSearch => Domain::Hadith,
        }
    }

    /// Single-item lookups trust the remote's not-found; listings and
    /// searches also ask the mirror, which may hold editions or collections
    /// the remote index does not return.
    pub fn fallback_policy(self) -> FallbackPolicy {
        match self {
            Operation::QuranSurah
            | Operation::QuranAyah
            | Operation::QuranJuz
            | Operation::QuranPage
            | Operation::HadithByNumber => FallbackPolicy::RemoteAuthoritative,
            Operation::QuranSurahList
            | Operation::QuranSearch
            | Operation::HadithCollections
            | Operation::HadithChapters
            | Operation::HadithList
            | Operation::HadithSearch => FallbackPolicy::MirrorOnEmpty,
        }
    }

    /// Built-in TTLs; catalogue listings change least and live longest
    pub fn default_ttl(self) -> OperationTtl {
        let (remote, fallback) = match self {
            Operation::QuranSurahList | Operation::HadithCollections => (7 * DAY, HOUR),
            Operation::QuranSurah
            | Operation::QuranAyah
            | Operation::QuranJuz
            | Operation::QuranPage
            | Operation::HadithChapters
            | Operation::HadithByNumber => (DAY, HOUR),
            Operation::QuranSearch => (HOUR, 10 * MINUTE),
            Operation::HadithList => (HOUR, 10 * MINUTE),
            Operation::HadithSearch => (30 * MINUTE, 5 * MINUTE),
        };

        OperationTtl {
            remote: Duration::from_secs(remote),
            fallback: Duration::from_secs(fallback),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
