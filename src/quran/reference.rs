//! Verse references: `surah:ayah` or a global verse number.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of verses in the Quran
pub const TOTAL_AYAHS: u32 = 6236;

/// Number of surahs in the Quran
pub const TOTAL_SURAHS: u32 = 114;

/// Reference to a single verse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AyahRef {
    /// `surah:ayah`, both 1-based
    Verse { surah: u32, ayah: u32 },
    /// Global verse number across the whole text
    Global(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid verse reference '{input}': {reason}")]
pub struct ParseAyahRefError {
    pub input: String,
    pub reason: &'static str,
}

impl FromStr for AyahRef {
    type Err = ParseAyahRefError;

    /// Parses syntax only; whether the verse exists is for the providers to say
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let fail = |reason| ParseAyahRefError {
            input: s.to_string(),
            reason,
        };

        let positive = |part: &str| -> Result<u32, ParseAyahRefError> {
            match part.trim().parse::<u32>() {
                Ok(0) => Err(fail("numbers start at 1")),
                Ok(n) => Ok(n),
                Err(_) => Err(fail("expected a positive number")),
            }
        };

        match input.split_once(':') {
            Some((surah, ayah)) => Ok(AyahRef::Verse {
                surah: positive(surah)?,
                ayah: positive(ayah)?,
            }),
            None if input.is_empty() => Err(fail("reference is empty")),
            None => Ok(AyahRef::Global(positive(input)?)),
        }
    }
}

impl fmt::Display for AyahRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AyahRef::Verse { surah, ayah } => write!(f, "{}:{}", surah, ayah),
            AyahRef::Global(number) => write!(f, "{}", number),
        }
    }
}
