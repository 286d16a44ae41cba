//! In-process mirror backend.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use tokio::sync::RwLock;

use super::{MirrorError, MirrorHealth, MirrorResult};
use crate::hadith::mirror::{
    ChapterRecord, CollectionRecord, HadithMirror, HadithMirrorWriter, HadithQuery, HadithRecord,
    HadithSlice,
};
use crate::quran::mirror::{
    EditionRecord, QuranMirror, QuranMirrorWriter, SurahRecord, VerseFilter, VerseRecord,
};

#[derive(Debug, Default)]
struct QuranData {
    surahs: Vec<SurahRecord>,
    editions: Vec<EditionRecord>,
    verses: Vec<VerseRecord>,
}

#[derive(Debug, Default)]
struct HadithData {
    collections: Vec<CollectionRecord>,
    chapters: Vec<ChapterRecord>,
    hadiths: Vec<HadithRecord>,
}

/// Mirror kept in memory; filters mirror the MongoDB backend's semantics
#[derive(Debug, Default)]
pub struct InMemoryMirror {
    quran: RwLock<QuranData>,
    hadith: RwLock<HadithData>,
}

impl InMemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Case-insensitive literal pattern
fn text_pattern(text: &str) -> MirrorResult<Regex> {
    RegexBuilder::new(&regex::escape(text.trim()))
        .case_insensitive(true)
        .build()
        .map_err(|e| MirrorError::Query(e.to_string()))
}

#[async_trait]
impl QuranMirror for InMemoryMirror {
    async fn surahs(&self) -> MirrorResult<Vec<SurahRecord>> {
        let mut surahs = self.quran.read().await.surahs.clone();
        surahs.sort_by_key(|s| s.number);
        Ok(surahs)
    }

    async fn surah(&self, number: u32) -> MirrorResult<Option<SurahRecord>> {
        let data = self.quran.read().await;
        Ok(data.surahs.iter().find(|s| s.number == number).cloned())
    }

    async fn editions(&self) -> MirrorResult<Vec<EditionRecord>> {
        let mut editions = self.quran.read().await.editions.clone();
        editions.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(editions)
    }

    async fn edition(&self, identifier: &str) -> MirrorResult<Option<EditionRecord>> {
        let data = self.quran.read().await;
        Ok(data
            .editions
            .iter()
            .find(|e| e.identifier == identifier)
            .cloned())
    }

    async fn verses(&self, filter: &VerseFilter) -> MirrorResult<Vec<VerseRecord>> {
        let pattern = filter.text.as_deref().map(text_pattern).transpose()?;
        let data = self.quran.read().await;

        let mut verses: Vec<VerseRecord> = data
            .verses
            .iter()
            .filter(|v| filter.matches(v))
            .filter(|v| pattern.as_ref().map_or(true, |p| p.is_match(&v.text)))
            .cloned()
            .collect();
        verses.sort_by_key(|v| v.number);
        Ok(verses)
    }
}

#[async_trait]
impl QuranMirrorWriter for InMemoryMirror {
    async fn clear_quran(&self) -> MirrorResult<()> {
        *self.quran.write().await = QuranData::default();
        Ok(())
    }

    async fn insert_surahs(&self, records: Vec<SurahRecord>) -> MirrorResult<usize> {
        let count = records.len();
        self.quran.write().await.surahs.extend(records);
        Ok(count)
    }

    async fn insert_editions(&self, records: Vec<EditionRecord>) -> MirrorResult<usize> {
        let count = records.len();
        self.quran.write().await.editions.extend(records);
        Ok(count)
    }

    async fn insert_verses(&self, records: Vec<VerseRecord>) -> MirrorResult<usize> {
        let count = records.len();
        self.quran.write().await.verses.extend(records);
        Ok(count)
    }
}

#[async_trait]
impl HadithMirror for InMemoryMirror {
    async fn collections(&self) -> MirrorResult<Vec<CollectionRecord>> {
        let mut collections = self.hadith.read().await.collections.clone();
        collections.sort_by_key(|c| c.id);
        Ok(collections)
    }

    async fn collection(&self, slug: &str) -> MirrorResult<Option<CollectionRecord>> {
        let data = self.hadith.read().await;
        Ok(data.collections.iter().find(|c| c.slug == slug).cloned())
    }

    async fn chapters(&self, collection: &str) -> MirrorResult<Vec<ChapterRecord>> {
        let data = self.hadith.read().await;
        let mut chapters: Vec<ChapterRecord> = data
            .chapters
            .iter()
            .filter(|c| c.collection == collection)
            .cloned()
            .collect();
        chapters.sort_by(|a, b| {
            (a.number_sort, &a.chapter_number).cmp(&(b.number_sort, &b.chapter_number))
        });
        Ok(chapters)
    }

    async fn hadiths(&self, query: &HadithQuery) -> MirrorResult<HadithSlice> {
        let pattern = query.text.as_deref().map(text_pattern).transpose()?;
        let data = self.hadith.read().await;

        let mut matching: Vec<&HadithRecord> = data
            .hadiths
            .iter()
            .filter(|h| query.matches(h))
            .filter(|h| {
                pattern.as_ref().map_or(true, |p| {
                    [&h.text_english, &h.narrator]
                        .into_iter()
                        .flatten()
                        .any(|text| p.is_match(text))
                })
            })
            .collect();
        matching.sort_by(|a, b| {
            (&a.collection, a.number_sort, &a.hadith_number)
                .cmp(&(&b.collection, b.number_sort, &b.hadith_number))
        });

        let total = matching.len() as u64;
        let records = matching
            .into_iter()
            .skip(usize::try_from(query.skip()).unwrap_or(usize::MAX))
            .take(query.per_page as usize)
            .cloned()
            .collect();

        Ok(HadithSlice { records, total })
    }
}

#[async_trait]
impl HadithMirrorWriter for InMemoryMirror {
    async fn clear_hadith(&self) -> MirrorResult<()> {
        *self.hadith.write().await = HadithData::default();
        Ok(())
    }

    async fn insert_collections(&self, records: Vec<CollectionRecord>) -> MirrorResult<usize> {
        let count = records.len();
        self.hadith.write().await.collections.extend(records);
        Ok(count)
    }

    async fn insert_chapters(&self, records: Vec<ChapterRecord>) -> MirrorResult<usize> {
        let count = records.len();
        self.hadith.write().await.chapters.extend(records);
        Ok(count)
    }

    async fn insert_hadiths(&self, records: Vec<HadithRecord>) -> MirrorResult<usize> {
        let count = records.len();
        self.hadith.write().await.hadiths.extend(records);
        Ok(count)
    }
}

#[async_trait]
impl MirrorHealth for InMemoryMirror {
    async fn ping(&self) -> MirrorResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hadith::transform::fixtures as hadith_fixtures;
    use crate::quran::transform::fixtures as quran_fixtures;

    async fn seeded() -> InMemoryMirror {
        let mirror = InMemoryMirror::new();
        mirror
            .insert_surahs(vec![quran_fixtures::surah(2, 286), quran_fixtures::surah(1, 7)])
            .await
            .unwrap();
        mirror
            .insert_editions(vec![quran_fixtures::edition()])
            .await
            .unwrap();
        mirror
            .insert_verses(vec![
                quran_fixtures::verse(2, 2, 9, "This Divine Writ"),
                quran_fixtures::verse(2, 1, 8, "Alif. Lam. Mim."),
                quran_fixtures::verse(1, 3, 3, "the Most Gracious, the Dispenser of GRACE"),
            ])
            .await
            .unwrap();
        mirror
            .insert_hadiths(vec![
                hadith_fixtures::hadith("sahih-bukhari", "10", 1, "Patience is light"),
                hadith_fixtures::hadith("sahih-bukhari", "2", 1, "Deeds by intentions"),
                hadith_fixtures::hadith("sahih-bukhari", "3", 2, "Faith has branches"),
                hadith_fixtures::hadith("sahih-muslim", "1", 1, "patience in adversity"),
            ])
            .await
            .unwrap();
        mirror
    }

    #[tokio::test]
    async fn test_verses_are_ordered_and_filtered() {
        let mirror = seeded().await;

        let surah = mirror
            .verses(&VerseFilter {
                surah: Some(2),
                ..VerseFilter::edition("en.asad")
            })
            .await
            .unwrap();
        assert_eq!(surah.iter().map(|v| v.ayah).collect::<Vec<_>>(), vec![1, 2]);

        let surahs = mirror.surahs().await.unwrap();
        assert_eq!(surahs[0].number, 1);
    }

    #[tokio::test]
    async fn test_text_search_is_case_insensitive_literal() {
        let mirror = seeded().await;

        let hits = mirror
            .verses(&VerseFilter {
                text: Some("grace".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);

        let literal = mirror
            .verses(&VerseFilter {
                text: Some("Alif.*".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(literal.is_empty());
    }

    #[tokio::test]
    async fn test_hadith_pagination_and_order() {
        let mirror = seeded().await;

        let first = mirror
            .hadiths(&HadithQuery {
                collection: Some("sahih-bukhari".to_string()),
                per_page: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(
            first.records.iter().map(|h| h.hadith_number.as_str()).collect::<Vec<_>>(),
            vec!["2", "3"]
        );

        let second = mirror
            .hadiths(&HadithQuery {
                collection: Some("sahih-bukhari".to_string()),
                per_page: 2,
                page: 2,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(second.records[0].hadith_number, "10");
    }

    #[tokio::test]
    async fn test_chapters_with_equal_prefix_order_by_number() {
        let mirror = InMemoryMirror::new();
        mirror
            .insert_chapters(vec![
                hadith_fixtures::chapter("sahih-bukhari", 3, "12b"),
                hadith_fixtures::chapter("sahih-bukhari", 1, "12"),
                hadith_fixtures::chapter("sahih-bukhari", 2, "12a"),
                hadith_fixtures::chapter("sahih-bukhari", 4, "3"),
            ])
            .await
            .unwrap();

        let chapters = mirror.chapters("sahih-bukhari").await.unwrap();
        assert_eq!(
            chapters.iter().map(|c| c.chapter_number.as_str()).collect::<Vec<_>>(),
            vec!["3", "12", "12a", "12b"]
        );
    }

    #[tokio::test]
    async fn test_hadith_text_search_across_collections() {
        let mirror = seeded().await;
        let found = mirror
            .hadiths(&HadithQuery {
                text: Some("PATIENCE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.total, 2);
    }

    #[tokio::test]
    async fn test_clear_is_per_domain() {
        let mirror = seeded().await;
        mirror.clear_quran().await.unwrap();

        assert!(mirror.surahs().await.unwrap().is_empty());
        assert_eq!(mirror.hadiths(&HadithQuery::default()).await.unwrap().total, 4);
    }
}
