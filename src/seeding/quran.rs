//! Quran seeding: the surah list, then every surah in every configured edition.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::{RetryPolicy, SeedError, SeedReport};
use crate::quran::mirror::QuranMirrorWriter;
use crate::quran::models::AyahRange;
use crate::quran::reference::{TOTAL_AYAHS, TOTAL_SURAHS};
use crate::quran::transform;
use crate::quran::QuranProvider;

pub struct QuranSeeder {
    provider: QuranProvider,
    mirror: Arc<dyn QuranMirrorWriter>,
    retry: RetryPolicy,
    editions: Vec<String>,
}

impl QuranSeeder {
    pub fn new(
        provider: QuranProvider,
        mirror: Arc<dyn QuranMirrorWriter>,
        retry: RetryPolicy,
        editions: Vec<String>,
    ) -> Self {
        Self {
            provider,
            mirror,
            retry,
            editions,
        }
    }

    /// Replace the Quran mirror with a fresh copy
    ///
    /// A failed run clears the domain again, so the mirror is either complete
    /// or empty.
    pub async fn run(&self) -> Result<SeedReport, SeedError> {
        let started = Instant::now();
        let mut report = SeedReport::new("quran");

        self.mirror.clear_quran().await?;
        info!("Cleared Quran mirror");

        if let Err(e) = self.populate(&mut report).await {
            error!(error = %e, "Quran seeding failed, discarding partial copy");
            if let Err(clear_err) = self.mirror.clear_quran().await {
                warn!(error = %clear_err, "Failed to discard partial Quran copy");
            }
            return Err(e);
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn populate(&self, report: &mut SeedReport) -> Result<(), SeedError> {
        let surahs = self
            .retry
            .fetch("surah list", || self.provider.list_surahs())
            .await?;
        if surahs.len() as u32 != TOTAL_SURAHS {
            warn!(count = surahs.len(), "Unexpected number of surahs from remote");
        }

        let now = Utc::now();
        let records = surahs
            .iter()
            .map(|s| transform::surah_record(s, now))
            .collect();
        report.add("surahs", self.mirror.insert_surahs(records).await?);

        for edition in &self.editions {
            let mut edition_stored = false;
            let mut verses = 0;

            for summary in &surahs {
                let what = format!("surah {} ({})", summary.number, edition);
                let surah = self
                    .retry
                    .fetch(&what, || {
                        self.provider
                            .surah(summary.number, edition, AyahRange::default())
                    })
                    .await?;

                let now = Utc::now();
                if !edition_stored {
                    let record = transform::edition_record(&surah.edition, now);
                    report.add("editions", self.mirror.insert_editions(vec![record]).await?);
                    edition_stored = true;
                }

                let inserted = self
                    .mirror
                    .insert_verses(transform::verse_records(&surah, now))
                    .await?;
                verses += inserted;
                report.add("verses", inserted);
            }

            if verses as u32 != TOTAL_AYAHS {
                warn!(edition = %edition, verses, "Edition verse count differs from the full text");
            }
            info!(edition = %edition, verses, "Seeded Quran edition");
        }

        Ok(())
    }
}
