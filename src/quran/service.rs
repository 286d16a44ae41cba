//! Quran read operations, each resolved through cache, AlQuran Cloud and
//! the mirror in that order.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::mirror::{EditionRecord, QuranMirror, SurahRecord, VerseFilter};
use super::models::{AyahRange, Ayah, QuranSection, SearchResult, SearchScope, Surah, SurahSummary};
use super::provider::QuranProvider;
use super::reference::AyahRef;
use super::transform;
use crate::mirror::MirrorResult;
use crate::resolver::{Operation, ReadThrough, ResolveResult};

/// Which numbered division a section lookup targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Division {
    Juz,
    Page,
}

/// Quran content service
#[derive(Clone)]
pub struct QuranService {
    provider: QuranProvider,
    mirror: Arc<dyn QuranMirror>,
    resolver: ReadThrough,
    default_edition: String,
}

impl QuranService {
    pub fn new(
        provider: QuranProvider,
        mirror: Arc<dyn QuranMirror>,
        resolver: ReadThrough,
        default_edition: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            mirror,
            resolver,
            default_edition: default_edition.into(),
        }
    }

    pub fn default_edition(&self) -> &str {
        &self.default_edition
    }

    fn edition(&self, edition: Option<&str>) -> String {
        edition
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.default_edition)
            .to_lowercase()
    }

    pub async fn surahs(&self) -> ResolveResult<Vec<SurahSummary>> {
        let key = self.resolver.key(Operation::QuranSurahList).build();
        self.resolver
            .resolve(
                Operation::QuranSurahList,
                &key,
                self.provider.list_surahs(),
                || self.mirror_surahs(),
            )
            .await
    }

    pub async fn surah(
        &self,
        number: u32,
        edition: Option<&str>,
        range: AyahRange,
    ) -> ResolveResult<Surah> {
        let edition = self.edition(edition);
        let key = self
            .resolver
            .key(Operation::QuranSurah)
            .segment(number)
            .segment(&edition)
            .optional(range.offset)
            .optional(range.limit)
            .build();

        self.resolver
            .resolve(
                Operation::QuranSurah,
                &key,
                self.provider.surah(number, &edition, range),
                || self.mirror_surah(number, &edition, range),
            )
            .await
    }

    pub async fn ayah(&self, reference: &AyahRef, edition: Option<&str>) -> ResolveResult<Ayah> {
        let edition = self.edition(edition);
        let key = match *reference {
            AyahRef::Verse { surah, ayah } => self
                .resolver
                .key(Operation::QuranAyah)
                .segment(surah)
                .segment(ayah),
            AyahRef::Global(number) => self.resolver.key(Operation::QuranAyah).segment(number),
        }
        .segment(&edition)
        .build();

        self.resolver
            .resolve(
                Operation::QuranAyah,
                &key,
                self.provider.ayah(reference, &edition),
                || self.mirror_ayah(reference, &edition),
            )
            .await
    }

    pub async fn juz(&self, number: u32, edition: Option<&str>) -> ResolveResult<QuranSection> {
        let edition = self.edition(edition);
        let key = self
            .resolver
            .key(Operation::QuranJuz)
            .segment(number)
            .segment(&edition)
            .build();

        self.resolver
            .resolve(
                Operation::QuranJuz,
                &key,
                self.provider.juz(number, &edition),
                || self.mirror_section(Division::Juz, number, &edition),
            )
            .await
    }

    pub async fn page(&self, number: u32, edition: Option<&str>) -> ResolveResult<QuranSection> {
        let edition = self.edition(edition);
        let key = self
            .resolver
            .key(Operation::QuranPage)
            .segment(number)
            .segment(&edition)
            .build();

        self.resolver
            .resolve(
                Operation::QuranPage,
                &key,
                self.provider.page(number, &edition),
                || self.mirror_section(Division::Page, number, &edition),
            )
            .await
    }

    pub async fn search(
        &self,
        keyword: &str,
        surah: Option<u32>,
        edition: Option<&str>,
    ) -> ResolveResult<SearchResult> {
        let keyword = keyword.trim().to_lowercase();
        let keyword = keyword.as_str();
        let edition = self.edition(edition);
        let scope = SearchScope::from(surah);
        let key = self
            .resolver
            .key(Operation::QuranSearch)
            .segment(keyword)
            .optional(surah)
            .segment(&edition)
            .build();

        self.resolver
            .resolve(
                Operation::QuranSearch,
                &key,
                self.provider.search(keyword, scope, &edition),
                || self.mirror_search(keyword, scope, &edition),
            )
            .await
    }

    /// Exact edition, or the first stored edition in that language when the
    /// request names a language such as `en`
    async fn mirror_edition(&self, requested: &str) -> MirrorResult<Option<EditionRecord>> {
        if let Some(edition) = self.mirror.edition(requested).await? {
            return Ok(Some(edition));
        }
        let editions = self.mirror.editions().await?;
        Ok(editions
            .into_iter()
            .find(|e| e.language.eq_ignore_ascii_case(requested)))
    }

    async fn mirror_surahs(&self) -> MirrorResult<Option<Vec<SurahSummary>>> {
        let surahs = self.mirror.surahs().await?;
        let summaries: Vec<SurahSummary> = surahs.iter().map(transform::to_surah_summary).collect();
        Ok((!summaries.is_empty()).then_some(summaries))
    }

    async fn surah_index(&self) -> MirrorResult<BTreeMap<u32, SurahRecord>> {
        let surahs = self.mirror.surahs().await?;
        Ok(surahs.into_iter().map(|s| (s.number, s)).collect())
    }

    async fn mirror_surah(
        &self,
        number: u32,
        edition: &str,
        range: AyahRange,
    ) -> MirrorResult<Option<Surah>> {
        let Some(surah) = self.mirror.surah(number).await? else {
            return Ok(None);
        };
        let Some(edition) = self.mirror_edition(edition).await? else {
            return Ok(None);
        };

        let (after, through) = range.bounds();
        let verses = self
            .mirror
            .verses(&VerseFilter {
                surah: Some(number),
                ayah_after: (after > 0).then_some(after),
                ayah_through: through,
                ..VerseFilter::edition(edition.identifier.clone())
            })
            .await?;

        if verses.is_empty() {
            return Ok(None);
        }
        Ok(Some(transform::to_surah(&surah, &edition, &verses)))
    }

    async fn mirror_ayah(&self, reference: &AyahRef, edition: &str) -> MirrorResult<Option<Ayah>> {
        let Some(edition) = self.mirror_edition(edition).await? else {
            return Ok(None);
        };

        let mut filter = VerseFilter::edition(edition.identifier.clone());
        match *reference {
            AyahRef::Verse { surah, ayah } => {
                filter.surah = Some(surah);
                filter.ayah = Some(ayah);
            }
            AyahRef::Global(number) => filter.number = Some(number),
        }

        let Some(verse) = self.mirror.verses(&filter).await?.into_iter().next() else {
            return Ok(None);
        };
        let Some(surah) = self.mirror.surah(verse.surah).await? else {
            return Ok(None);
        };
        Ok(Some(transform::to_ayah(&verse, &surah, &edition)))
    }

    async fn mirror_section(
        &self,
        division: Division,
        number: u32,
        edition: &str,
    ) -> MirrorResult<Option<QuranSection>> {
        let Some(edition) = self.mirror_edition(edition).await? else {
            return Ok(None);
        };

        let mut filter = VerseFilter::edition(edition.identifier.clone());
        match division {
            Division::Juz => filter.juz = Some(number),
            Division::Page => filter.page = Some(number),
        }
        let verses = self.mirror.verses(&filter).await?;
        if verses.is_empty() {
            return Ok(None);
        }

        let surahs = self.surah_index().await?;
        let section = transform::to_section(number, &verses, &surahs, &edition);
        Ok((!section.ayahs.is_empty()).then_some(section))
    }

    async fn mirror_search(
        &self,
        keyword: &str,
        scope: SearchScope,
        edition: &str,
    ) -> MirrorResult<Option<SearchResult>> {
        let Some(edition) = self.mirror_edition(edition).await? else {
            return Ok(None);
        };

        let verses = self
            .mirror
            .verses(&VerseFilter {
                surah: scope.surah(),
                text: Some(keyword.to_string()),
                ..VerseFilter::edition(edition.identifier.clone())
            })
            .await?;
        if verses.is_empty() {
            return Ok(None);
        }

        let surahs = self.surah_index().await?;
        let result = transform::to_search_result(&verses, &surahs, &edition);
        Ok((result.count > 0).then_some(result))
    }
}
