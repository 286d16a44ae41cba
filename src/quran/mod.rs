//! # Quran Domain
//!
//! Surahs, verses, juz and page views, and keyword search, served from
//! AlQuran Cloud with the local mirror as fallback.

pub mod mirror;
pub mod models;
pub mod provider;
pub mod reference;
pub mod service;
pub mod transform;

pub use mirror::{QuranMirror, QuranMirrorWriter};
pub use models::{AyahRange, Ayah, QuranSection, SearchResult, SearchScope, Surah, SurahSummary};
pub use provider::QuranProvider;
pub use reference::AyahRef;
pub use service::QuranService;
