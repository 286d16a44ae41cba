//! Hadith seeding: collections, their chapters, then every hadith page.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::{RetryPolicy, SeedError, SeedReport};
use crate::hadith::mirror::HadithMirrorWriter;
use crate::hadith::models::{Chapter, HadithBook, HadithFilter};
use crate::hadith::transform;
use crate::hadith::HadithProvider;

pub struct HadithSeeder {
    provider: HadithProvider,
    mirror: Arc<dyn HadithMirrorWriter>,
    retry: RetryPolicy,
    /// Collection slugs to copy; empty copies every collection
    collections: Vec<String>,
    page_size: u32,
}

impl HadithSeeder {
    pub fn new(
        provider: HadithProvider,
        mirror: Arc<dyn HadithMirrorWriter>,
        retry: RetryPolicy,
        collections: Vec<String>,
        page_size: u32,
    ) -> Self {
        Self {
            provider,
            mirror,
            retry,
            collections: collections
                .into_iter()
                .map(|slug| slug.trim().to_lowercase())
                .filter(|slug| !slug.is_empty())
                .collect(),
            page_size: page_size.max(1),
        }
    }

    /// Replace the Hadith mirror with a fresh copy; a failed run leaves it empty
    pub async fn run(&self) -> Result<SeedReport, SeedError> {
        let started = Instant::now();
        let mut report = SeedReport::new("hadith");

        self.mirror.clear_hadith().await?;
        info!("Cleared Hadith mirror");

        if let Err(e) = self.populate(&mut report).await {
            error!(error = %e, "Hadith seeding failed, discarding partial copy");
            if let Err(clear_err) = self.mirror.clear_hadith().await {
                warn!(error = %clear_err, "Failed to discard partial Hadith copy");
            }
            return Err(e);
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }

    async fn populate(&self, report: &mut SeedReport) -> Result<(), SeedError> {
        let books = self.selected_books().await?;
        let now = Utc::now();
        let records = books
            .iter()
            .map(|b| transform::collection_record(b, now))
            .collect();
        report.add("collections", self.mirror.insert_collections(records).await?);

        for book in &books {
            let slug = book.book_slug.as_str();
            let chapters = self
                .retry
                .fetch(&format!("chapters of {}", slug), || {
                    self.provider.chapters(slug)
                })
                .await?;

            let now = Utc::now();
            let records = chapters
                .iter()
                .map(|c| transform::chapter_record(c, now))
                .collect();
            report.add("chapters", self.mirror.insert_chapters(records).await?);

            let hadiths = self.seed_hadiths(slug, &chapters).await?;
            report.add("hadiths", hadiths);

            if hadiths as u64 != book.hadiths_count {
                warn!(
                    collection = slug,
                    expected = book.hadiths_count,
                    seeded = hadiths,
                    "Collection hadith count differs from the advertised total"
                );
            }
            info!(collection = slug, chapters = chapters.len(), hadiths, "Seeded Hadith collection");
        }

        Ok(())
    }

    async fn selected_books(&self) -> Result<Vec<HadithBook>, SeedError> {
        let books = self
            .retry
            .fetch("hadith collections", || self.provider.collections())
            .await?;
        if self.collections.is_empty() {
            return Ok(books);
        }

        let mut selected = Vec::with_capacity(self.collections.len());
        for slug in &self.collections {
            match books.iter().find(|b| b.book_slug.eq_ignore_ascii_case(slug)) {
                Some(book) => selected.push(book.clone()),
                None => {
                    return Err(SeedError::MissingContent {
                        what: format!("collection {}", slug),
                    })
                }
            }
        }
        Ok(selected)
    }

    /// Page through one collection until the remote reports the last page
    async fn seed_hadiths(&self, slug: &str, chapters: &[Chapter]) -> Result<usize, SeedError> {
        let chapter_numbers: HashMap<u64, &str> = chapters
            .iter()
            .map(|c| (c.id, c.chapter_number.as_str()))
            .collect();

        let mut seeded = 0;
        let mut page = 1;
        loop {
            let filter = HadithFilter {
                collection: Some(slug.to_string()),
                page: Some(page),
                per_page: Some(self.page_size),
                ..Default::default()
            };
            let what = format!("{} page {}", slug, page);
            let batch = match self
                .retry
                .fetch(&what, || self.provider.hadiths(&filter))
                .await
            {
                Ok(batch) => batch,
                // An empty page ends the listing
                Err(SeedError::MissingContent { .. }) => break,
                Err(e) => return Err(e),
            };

            let now = Utc::now();
            let records = batch
                .data
                .iter()
                .map(|hadith| {
                    let mut record = transform::hadith_record(hadith, now);
                    if record.chapter_number.is_none() {
                        record.chapter_number = chapter_numbers
                            .get(&record.chapter_id)
                            .map(|n| n.to_string());
                    }
                    record
                })
                .collect();
            seeded += self.mirror.insert_hadiths(records).await?;
            debug!(collection = slug, page, last_page = batch.last_page, "Seeded hadith page");

            if !batch.has_more() {
                break;
            }
            page += 1;
        }
        Ok(seeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::HadithApiConfig;
    use crate::hadith::mirror::{HadithMirror, HadithQuery};
    use crate::mirror::InMemoryMirror;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn book(slug: &str, count: u64) -> serde_json::Value {
        json!({
            "id": 1,
            "bookName": "Sahih Bukhari",
            "writerName": "Imam Bukhari",
            "aboutWriter": null,
            "writerDeath": "256 ھ",
            "bookSlug": slug,
            "hadiths_count": count.to_string(),
            "chapters_count": "1"
        })
    }

    fn hadith(number: u32) -> serde_json::Value {
        json!({
            "id": number,
            "hadithNumber": number.to_string(),
            "englishNarrator": "Narrated Abu Huraira:",
            "hadithEnglish": format!("Hadith text {}", number),
            "chapterId": "7",
            "bookSlug": "sahih-bukhari",
            "status": "Sahih"
        })
    }

    fn page(current: u32, last: u32, numbers: &[u32]) -> serde_json::Value {
        json!({
            "status": 200,
            "hadiths": {
                "current_page": current,
                "data": numbers.iter().map(|n| hadith(*n)).collect::<Vec<_>>(),
                "last_page": last,
                "per_page": 2,
                "total": 3
            }
        })
    }

    async fn mount_collection(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/books"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "books": [book("sahih-bukhari", 3), book("sahih-muslim", 0)]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sahih-bukhari/chapters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "chapters": [{
                    "id": 7,
                    "chapterNumber": "1",
                    "chapterEnglish": "Revelation",
                    "bookSlug": "sahih-bukhari"
                }]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hadiths"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(1, 2, &[1, 2])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/hadiths"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page(2, 2, &[3])))
            .mount(server)
            .await;
    }

    fn seeder(server: &MockServer, mirror: Arc<InMemoryMirror>, slugs: &[&str]) -> HadithSeeder {
        let provider = HadithProvider::new(&HadithApiConfig {
            base_url: server.uri(),
            api_key: Some("k".to_string()),
            timeout: Duration::from_secs(2),
            page_size: 2,
        })
        .unwrap();
        HadithSeeder::new(
            provider,
            mirror,
            RetryPolicy::new(2, Duration::from_millis(5)),
            slugs.iter().map(|s| s.to_string()).collect(),
            2,
        )
    }

    #[tokio::test]
    async fn test_seeds_selected_collection_across_pages() {
        let server = MockServer::start().await;
        mount_collection(&server).await;

        let mirror = Arc::new(InMemoryMirror::new());
        let report = seeder(&server, mirror.clone(), &[" Sahih-Bukhari "])
            .run()
            .await
            .unwrap();

        assert_eq!(report.count("collections"), 1);
        assert_eq!(report.count("chapters"), 1);
        assert_eq!(report.count("hadiths"), 3);

        let slice = mirror
            .hadiths(&HadithQuery {
                collection: Some("sahih-bukhari".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(slice.total, 3);
        assert_eq!(slice.records[0].chapter_number.as_deref(), Some("1"));
        assert_eq!(mirror.collections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_collection_aborts() {
        let server = MockServer::start().await;
        mount_collection(&server).await;

        let err = seeder(&server, Arc::new(InMemoryMirror::new()), &["sunan-unknown"])
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::MissingContent { .. }));
    }

    #[tokio::test]
    async fn test_chapter_outage_aborts_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/books"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "books": [book("sahih-bukhari", 3)]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/sahih-bukhari/chapters"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = seeder(&server, Arc::new(InMemoryMirror::new()), &[])
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Remote { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_failed_page_discards_earlier_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hadiths"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;
        mount_collection(&server).await;

        let mirror = Arc::new(InMemoryMirror::new());
        let err = seeder(&server, mirror.clone(), &["sahih-bukhari"])
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, SeedError::Remote { attempts: 2, .. }));

        let slice = mirror
            .hadiths(&HadithQuery {
                collection: Some("sahih-bukhari".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(slice.total, 0);
        assert!(mirror.collections().await.unwrap().is_empty());
        assert!(mirror.chapters("sahih-bukhari").await.unwrap().is_empty());
    }
}
