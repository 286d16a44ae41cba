//! # Local Mirror
//!
//! Document storage holding a seeded copy of the remote corpora. The resolver
//! reads it only when the remote cannot answer; the seeding job is the only
//! writer.
//!
//! Backends:
//! - [`MongoMirror`]: MongoDB, connected lazily on first use
//! - [`InMemoryMirror`]: process-local, for development and tests
//! - [`DisabledMirror`]: every query fails with [`MirrorError::Disabled`]

pub mod memory;
pub mod mongo;

pub use memory::InMemoryMirror;
pub use mongo::MongoMirror;

use async_trait::async_trait;

use crate::core::connection::ConnectError;
use crate::hadith::mirror::{
    ChapterRecord, CollectionRecord, HadithMirror, HadithQuery, HadithSlice,
};
use crate::quran::mirror::{EditionRecord, QuranMirror, SurahRecord, VerseFilter, VerseRecord};

pub type MirrorResult<T> = Result<T, MirrorError>;

/// Mirror failure; there is no tier behind the mirror to recover it
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("mirror storage unavailable: {0}")]
    Unavailable(String),

    #[error("mirror is disabled")]
    Disabled,

    #[error("mirror query failed: {0}")]
    Query(String),

    #[error("mirror record could not be decoded: {0}")]
    Decode(String),
}

impl From<ConnectError> for MirrorError {
    fn from(err: ConnectError) -> Self {
        MirrorError::Unavailable(err.to_string())
    }
}

/// Mirror that is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMirror;

#[async_trait]
impl QuranMirror for DisabledMirror {
    async fn surahs(&self) -> MirrorResult<Vec<SurahRecord>> {
        Err(MirrorError::Disabled)
    }

    async fn surah(&self, _number: u32) -> MirrorResult<Option<SurahRecord>> {
        Err(MirrorError::Disabled)
    }

    async fn editions(&self) -> MirrorResult<Vec<EditionRecord>> {
        Err(MirrorError::Disabled)
    }

    async fn edition(&self, _identifier: &str) -> MirrorResult<Option<EditionRecord>> {
        Err(MirrorError::Disabled)
    }

    async fn verses(&self, _filter: &VerseFilter) -> MirrorResult<Vec<VerseRecord>> {
        Err(MirrorError::Disabled)
    }
}

#[async_trait]
impl HadithMirror for DisabledMirror {
    async fn collections(&self) -> MirrorResult<Vec<CollectionRecord>> {
        Err(MirrorError::Disabled)
    }

    async fn collection(&self, _slug: &str) -> MirrorResult<Option<CollectionRecord>> {
        Err(MirrorError::Disabled)
    }

    async fn chapters(&self, _collection: &str) -> MirrorResult<Vec<ChapterRecord>> {
        Err(MirrorError::Disabled)
    }

    async fn hadiths(&self, _query: &HadithQuery) -> MirrorResult<HadithSlice> {
        Err(MirrorError::Disabled)
    }
}

/// Reachability probe used by `/health`
#[async_trait]
pub trait MirrorHealth: Send + Sync {
    async fn ping(&self) -> MirrorResult<()>;

    fn backend(&self) -> &'static str;
}

#[async_trait]
impl MirrorHealth for DisabledMirror {
    async fn ping(&self) -> MirrorResult<()> {
        Err(MirrorError::Disabled)
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}
