//! # Seeding
//!
//! Offline job that copies the remote corpora into the local mirror. Each
//! domain is cleared and repopulated as a whole; a remote call that keeps
//! failing aborts the domain instead of leaving a partial copy behind that
//! the resolver would serve as if it were complete.

pub mod hadith;
pub mod quran;

pub use hadith::HadithSeeder;
pub use quran::QuranSeeder;

use metrics::counter;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::config::SeedingConfig;
use crate::mirror::MirrorError;
use crate::remote::{RemoteError, RemoteResult};

/// Why a seeding run stopped
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("{what} failed after {attempts} attempts: {source}")]
    Remote {
        what: String,
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    #[error("remote returned nothing for {what}")]
    MissingContent { what: String },

    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

/// Fixed-count, fixed-delay retry for remote calls made while seeding
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `call` until it yields content or the attempts run out
    ///
    /// An authoritative "not found" is not retried; during seeding it means
    /// the corpus is not what the job expects.
    pub async fn fetch<T, F, Fut>(&self, what: &str, mut call: F) -> Result<T, SeedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RemoteResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    return Err(SeedError::MissingContent {
                        what: what.to_string(),
                    })
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        what,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Remote call failed while seeding, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    return Err(SeedError::Remote {
                        what: what.to_string(),
                        attempts: attempt,
                        source: e,
                    })
                }
            }
        }
    }
}

impl From<&SeedingConfig> for RetryPolicy {
    fn from(config: &SeedingConfig) -> Self {
        Self::new(config.max_attempts, config.retry_delay)
    }
}

/// Record counts written by one domain's run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedReport {
    pub domain: &'static str,
    pub counts: BTreeMap<&'static str, usize>,
    pub elapsed: Duration,
}

impl SeedReport {
    pub fn new(domain: &'static str) -> Self {
        Self {
            domain,
            ..Default::default()
        }
    }

    pub fn add(&mut self, kind: &'static str, count: usize) {
        *self.counts.entry(kind).or_default() += count;
        counter!("content_seeded_records_total", "kind" => kind).increment(count as u64);
    }

    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    pub fn log(&self) {
        info!(
            domain = self.domain,
            elapsed = %humantime::format_duration(self.elapsed),
            counts = ?self.counts,
            "Seeding finished"
        );
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.domain)?;
        for (kind, count) in &self.counts {
            write!(f, " {}={}", kind, count)?;
        }
        // Whole milliseconds keep the summary short
        let elapsed = Duration::from_millis(self.elapsed.as_millis() as u64);
        write!(f, " in {}", humantime::format_duration(elapsed))
    }
}
