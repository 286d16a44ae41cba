//! Hadith read operations, each resolved through cache, HadithAPI and the
//! mirror in that order.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::mirror::{HadithMirror, HadithQuery, HadithSlice};
use super::models::{Chapter, Hadith, HadithBook, HadithFilter, HadithPage};
use super::provider::HadithProvider;
use super::transform::{self, HadithContext};
use crate::mirror::MirrorResult;
use crate::resolver::{Operation, ReadThrough, ResolveResult};

/// Hadith content service
#[derive(Clone)]
pub struct HadithService {
    provider: HadithProvider,
    mirror: Arc<dyn HadithMirror>,
    resolver: ReadThrough,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Grades as HadithAPI spells them: `Sahih`, `Hasan`, `Da'eef`
fn grade(value: Option<String>) -> Option<String> {
    clean(value).map(|g| {
        let mut chars = g.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => g,
        }
    })
}

impl HadithService {
    pub fn new(
        provider: HadithProvider,
        mirror: Arc<dyn HadithMirror>,
        resolver: ReadThrough,
    ) -> Self {
        Self {
            provider,
            mirror,
            resolver,
        }
    }

    /// Trim parameters, fix their case and fill in paging defaults. The same
    /// values key the cache and reach both tiers.
    fn normalize(&self, filter: HadithFilter) -> HadithFilter {
        HadithFilter {
            collection: clean(filter.collection),
            chapter: clean(filter.chapter),
            number: clean(filter.number),
            grade: grade(filter.grade),
            page: Some(filter.page.unwrap_or(1).max(1)),
            per_page: Some(filter.per_page.unwrap_or(self.provider.page_size()).max(1)),
        }
    }

    pub async fn collections(&self) -> ResolveResult<Vec<HadithBook>> {
        let key = self.resolver.key(Operation::HadithCollections).build();
        self.resolver
            .resolve(
                Operation::HadithCollections,
                &key,
                self.provider.collections(),
                || self.mirror_collections(),
            )
            .await
    }

    pub async fn chapters(&self, collection: &str) -> ResolveResult<Vec<Chapter>> {
        let collection = collection.trim().to_lowercase();
        let key = self
            .resolver
            .key(Operation::HadithChapters)
            .segment(&collection)
            .build();

        self.resolver
            .resolve(
                Operation::HadithChapters,
                &key,
                self.provider.chapters(&collection),
                || self.mirror_chapters(&collection),
            )
            .await
    }

    pub async fn hadith(&self, collection: &str, number: &str) -> ResolveResult<Hadith> {
        let collection = collection.trim().to_lowercase();
        let number = number.trim().to_lowercase();
        let key = self
            .resolver
            .key(Operation::HadithByNumber)
            .segment(&collection)
            .segment(&number)
            .build();

        self.resolver
            .resolve(
                Operation::HadithByNumber,
                &key,
                self.provider.hadith(&collection, &number),
                || self.mirror_hadith(&collection, &number),
            )
            .await
    }

    pub async fn hadiths(&self, filter: HadithFilter) -> ResolveResult<HadithPage> {
        let filter = self.normalize(filter);
        let key = self.resolver.key(Operation::HadithList).filter(&filter).build();

        let query = HadithQuery {
            collection: filter.collection.clone(),
            chapter: filter.chapter.clone(),
            number: filter.number.clone(),
            grade: filter.grade.clone(),
            text: None,
            page: filter.page_or_first(),
            per_page: filter.per_page.unwrap_or(self.provider.page_size()),
        };

        self.resolver
            .resolve(
                Operation::HadithList,
                &key,
                self.provider.hadiths(&filter),
                || self.mirror_page(query),
            )
            .await
    }

    pub async fn search(
        &self,
        keyword: &str,
        collection: Option<&str>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> ResolveResult<HadithPage> {
        let keyword = keyword.trim().to_lowercase();
        let keyword = keyword.as_str();
        let collection = clean(collection.map(str::to_string));
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(self.provider.page_size()).max(1);
        let key = self
            .resolver
            .key(Operation::HadithSearch)
            .segment(keyword)
            .optional(collection.as_deref())
            .segment(page)
            .segment(per_page)
            .build();

        let query = HadithQuery {
            collection: collection.clone(),
            text: Some(keyword.to_string()),
            page,
            per_page,
            ..Default::default()
        };

        self.resolver
            .resolve(
                Operation::HadithSearch,
                &key,
                self.provider
                    .search(keyword, collection.as_deref(), page, Some(per_page)),
                || self.mirror_page(query),
            )
            .await
    }

    async fn mirror_collections(&self) -> MirrorResult<Option<Vec<HadithBook>>> {
        let books: Vec<HadithBook> = self
            .mirror
            .collections()
            .await?
            .iter()
            .map(transform::to_book)
            .collect();
        Ok((!books.is_empty()).then_some(books))
    }

    async fn mirror_chapters(&self, collection: &str) -> MirrorResult<Option<Vec<Chapter>>> {
        let chapters: Vec<Chapter> = self
            .mirror
            .chapters(collection)
            .await?
            .iter()
            .map(transform::to_chapter)
            .collect();
        Ok((!chapters.is_empty()).then_some(chapters))
    }

    async fn mirror_hadith(&self, collection: &str, number: &str) -> MirrorResult<Option<Hadith>> {
        let slice = self
            .mirror
            .hadiths(&HadithQuery {
                collection: Some(collection.to_string()),
                number: Some(number.to_string()),
                per_page: 1,
                ..Default::default()
            })
            .await?;

        let Some(record) = slice.records.first() else {
            return Ok(None);
        };
        let context = self.context_for(&slice).await?;
        Ok(Some(context.hadith(record)))
    }

    async fn mirror_page(&self, query: HadithQuery) -> MirrorResult<Option<HadithPage>> {
        let slice = self.mirror.hadiths(&query).await?;
        if slice.records.is_empty() {
            return Ok(None);
        }

        let context = self.context_for(&slice).await?;
        Ok(Some(transform::to_page(
            &slice.records,
            slice.total,
            query.page,
            query.per_page,
            &context,
        )))
    }

    /// Collection and chapter details for the collections a slice touches
    async fn context_for(&self, slice: &HadithSlice) -> MirrorResult<HadithContext> {
        let slugs: BTreeSet<&str> = slice
            .records
            .iter()
            .map(|r| r.collection.as_str())
            .collect();

        let mut collections = Vec::new();
        let mut chapters = Vec::new();
        for slug in slugs {
            if let Some(collection) = self.mirror.collection(slug).await? {
                collections.push(collection);
            }
            chapters.extend(self.mirror.chapters(slug).await?);
        }
        Ok(HadithContext::new(collections, chapters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caching::{ContentCache, InMemoryCache};
    use crate::core::config::HadithApiConfig;
    use crate::hadith::mirror::HadithMirrorWriter;
    use crate::hadith::transform::fixtures;
    use crate::mirror::{DisabledMirror, InMemoryMirror};
    use crate::resolver::{ResolveError, Source, TtlPolicy};
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn service_with(
        status: u16,
        mirror: Arc<dyn HadithMirror>,
    ) -> (HadithService, MockServer) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let provider = HadithProvider::new(&HadithApiConfig {
            base_url: server.uri(),
            api_key: Some("k".to_string()),
            timeout: Duration::from_secs(1),
            page_size: 2,
        })
        .unwrap();
        let resolver = ReadThrough::new(
            ContentCache::new(Arc::new(InMemoryCache::new(100))),
            TtlPolicy::default(),
        );
        (HadithService::new(provider, mirror, resolver), server)
    }

    async fn mirror() -> Arc<InMemoryMirror> {
        let mirror = Arc::new(InMemoryMirror::new());
        mirror
            .insert_collections(vec![fixtures::collection("sahih-bukhari")])
            .await
            .unwrap();
        mirror
            .insert_chapters(vec![
                fixtures::chapter("sahih-bukhari", 1, "1"),
                fixtures::chapter("sahih-bukhari", 2, "2"),
            ])
            .await
            .unwrap();
        mirror
            .insert_hadiths(vec![
                fixtures::hadith("sahih-bukhari", "1", 1, "Actions are judged by intentions"),
                fixtures::hadith("sahih-bukhari", "2", 1, "Revelation came like daybreak"),
                fixtures::hadith("sahih-bukhari", "3", 2, "Be patient with intentions"),
            ])
            .await
            .unwrap();
        mirror
    }

    #[tokio::test]
    async fn test_hadith_falls_back_with_book_and_chapter() {
        let (service, _server) = service_with(503, mirror().await).await;

        let resolved = service.hadith("Sahih-Bukhari", "3").await.unwrap().unwrap();
        assert_eq!(resolved.source, Source::Fallback);
        assert_eq!(resolved.value.book.as_ref().unwrap().book_slug, "sahih-bukhari");
        assert_eq!(resolved.value.chapter.as_ref().unwrap().chapter_number, "2");
    }

    #[tokio::test]
    async fn test_listing_pages_through_mirror() {
        let (service, _server) = service_with(503, mirror().await).await;

        let page = service
            .hadiths(HadithFilter {
                collection: Some("sahih-bukhari".to_string()),
                page: Some(2),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap()
            .value;
        assert_eq!(page.current_page, 2);
        assert_eq!(page.per_page, 2);
        assert_eq!(page.last_page, 2);
        assert_eq!(page.total, 3);
        assert_eq!(page.data[0].hadith_number, "3");
    }

    #[tokio::test]
    async fn test_search_consults_mirror_when_remote_has_nothing() {
        let (service, _server) = service_with(404, mirror().await).await;

        let found = service
            .search("INTENTIONS", Some("sahih-bukhari"), None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.source, Source::Fallback);
        assert_eq!(found.value.total, 2);
    }

    #[tokio::test]
    async fn test_single_hadith_not_found_is_final() {
        let (service, _server) = service_with(404, mirror().await).await;
        assert!(service.hadith("sahih-bukhari", "1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_both_tiers_down_is_unavailable() {
        let (service, _server) = service_with(500, Arc::new(DisabledMirror)).await;

        let err = service.chapters("sahih-bukhari").await.unwrap_err();
        let ResolveError::Unavailable { operation, .. } = err;
        assert_eq!(operation, Operation::HadithChapters);
    }

    #[tokio::test]
    async fn test_equivalent_filters_share_cache_entry() {
        let (service, server) = service_with(503, mirror().await).await;

        let first = service
            .hadiths(HadithFilter {
                collection: Some(" Sahih-Bukhari ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();
        let second = service
            .hadiths(HadithFilter {
                collection: Some("sahih-bukhari".to_string()),
                page: Some(1),
                per_page: Some(2),
                ..Default::default()
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.source, Source::Fallback);
        assert_eq!(second.source, Source::Cache);
        assert_eq!(first.value, second.value);
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_hadith_number_case_resolves_to_one_entry() {
        let mirror = mirror().await;
        mirror
            .insert_hadiths(vec![fixtures::hadith(
                "sahih-bukhari",
                "12a",
                2,
                "Variant narration",
            )])
            .await
            .unwrap();
        let (service, server) = service_with(503, mirror).await;

        let upper = service.hadith("sahih-bukhari", "12A").await.unwrap().unwrap();
        assert_eq!(upper.source, Source::Fallback);
        assert_eq!(upper.value.hadith_number, "12a");

        let lower = service.hadith("sahih-bukhari", "12a").await.unwrap().unwrap();
        assert_eq!(lower.source, Source::Cache);
        assert_eq!(lower.value, upper.value);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .url
            .query_pairs()
            .any(|(name, value)| name == "hadithNumber" && value == "12a"));
    }

    #[test]
    fn test_grade_is_capitalized() {
        assert_eq!(grade(Some(" SAHIH ".to_string())).as_deref(), Some("Sahih"));
        assert_eq!(grade(Some("hasan".to_string())).as_deref(), Some("Hasan"));
        assert_eq!(grade(Some("  ".to_string())), None);
    }
}
