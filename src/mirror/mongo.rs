//! # MongoDB Mirror
//!
//! Collections:
//! - `quran_surahs`, `quran_editions`, `quran_verses`
//! - `hadith_collections`, `hadith_chapters`, `hadiths`
//!
//! The client is built on first use through a [`LazyConnection`] and verified
//! with a `ping`, so a service whose database is down still starts and only
//! fails the requests that actually reach the mirror.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::{MirrorError, MirrorHealth, MirrorResult};
use crate::core::config::MirrorConfig;
use crate::core::connection::LazyConnection;
use crate::hadith::mirror::{
    ChapterRecord, CollectionRecord, HadithMirror, HadithMirrorWriter, HadithQuery, HadithRecord,
    HadithSlice,
};
use crate::quran::mirror::{
    EditionRecord, QuranMirror, QuranMirrorWriter, SurahRecord, VerseFilter, VerseRecord,
};

const QURAN_SURAHS: &str = "quran_surahs";
const QURAN_EDITIONS: &str = "quran_editions";
const QURAN_VERSES: &str = "quran_verses";
const HADITH_COLLECTIONS: &str = "hadith_collections";
const HADITH_CHAPTERS: &str = "hadith_chapters";
const HADITHS: &str = "hadiths";

/// MongoDB-backed mirror
pub struct MongoMirror {
    config: MirrorConfig,
    database: LazyConnection<Database>,
}

impl MongoMirror {
    /// Create the mirror; nothing is contacted until the first query
    pub fn new(config: &MirrorConfig) -> Self {
        Self {
            config: config.clone(),
            database: LazyConnection::new("mongodb", config.connect_timeout),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.database.is_ready()
    }

    async fn database(&self) -> MirrorResult<&Database> {
        let config = &self.config;
        let database = self
            .database
            .get_or_connect(|| connect(config))
            .await?;
        Ok(database)
    }

    async fn collection<T: Send + Sync>(&self, name: &str) -> MirrorResult<Collection<T>> {
        Ok(self.database().await?.collection::<T>(name))
    }

    async fn find<T>(
        &self,
        collection: &str,
        filter: Document,
        sort: Document,
    ) -> MirrorResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let options = FindOptions::builder().sort(sort).build();
        let cursor = self
            .collection::<T>(collection)
            .await?
            .find(filter, options)
            .await
            .map_err(classify)?;
        cursor.try_collect().await.map_err(classify)
    }

    async fn find_one<T>(&self, collection: &str, filter: Document) -> MirrorResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        self.collection::<T>(collection)
            .await?
            .find_one(filter, None)
            .await
            .map_err(classify)
    }

    async fn clear(&self, collections: &[&str]) -> MirrorResult<()> {
        for name in collections {
            let deleted = self
                .collection::<Document>(name)
                .await?
                .delete_many(doc! {}, None)
                .await
                .map_err(classify)?;
            info!(collection = name, deleted = deleted.deleted_count, "Cleared mirror collection");
        }
        Ok(())
    }

    async fn insert<T>(&self, collection: &str, records: Vec<T>) -> MirrorResult<usize>
    where
        T: Serialize + Send + Sync,
    {
        if records.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection::<T>(collection)
            .await?
            .insert_many(records, None)
            .await
            .map_err(classify)?;
        debug!(collection, inserted = result.inserted_ids.len(), "Inserted mirror records");
        Ok(result.inserted_ids.len())
    }
}

async fn connect(config: &MirrorConfig) -> Result<Database, MongoError> {
    let mut options = ClientOptions::parse(&config.uri).await?;
    options.app_name = Some("islamic-content-gateway".to_string());
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.connect_timeout);

    let client = Client::with_options(options)?;
    let database = client.database(&config.database);
    database.run_command(doc! { "ping": 1 }, None).await?;

    info!(database = %config.database, "Connected to MongoDB mirror");
    Ok(database)
}

fn classify(err: MongoError) -> MirrorError {
    match *err.kind {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => MirrorError::Unavailable(err.to_string()),
        ErrorKind::BsonDeserialization(_) => MirrorError::Decode(err.to_string()),
        _ => MirrorError::Query(err.to_string()),
    }
}

/// Case-insensitive literal match
fn text_regex(text: &str) -> Document {
    doc! { "$regex": regex::escape(text.trim()), "$options": "i" }
}

/// Case-insensitive whole-value match
fn exact_regex(value: &str) -> Document {
    doc! { "$regex": format!("^{}$", regex::escape(value.trim())), "$options": "i" }
}

fn verse_filter(filter: &VerseFilter) -> Document {
    let mut query = Document::new();
    if let Some(edition) = &filter.edition {
        query.insert("edition", edition.as_str());
    }
    for (field, value) in [
        ("surah", filter.surah),
        ("ayah", filter.ayah),
        ("number", filter.number),
        ("juz", filter.juz),
        ("page", filter.page),
    ] {
        if let Some(value) = value {
            query.insert(field, i64::from(value));
        }
    }

    let mut range = Document::new();
    if let Some(after) = filter.ayah_after {
        range.insert("$gt", i64::from(after));
    }
    if let Some(through) = filter.ayah_through {
        range.insert("$lte", i64::from(through));
    }
    if !range.is_empty() {
        // An exact ayah and a range on the same field combine with $and
        match query.remove("ayah") {
            Some(exact) => {
                query.insert("$and", vec![doc! { "ayah": exact }, doc! { "ayah": range }]);
            }
            None => {
                query.insert("ayah", range);
            }
        }
    }

    if let Some(text) = &filter.text {
        query.insert("text", text_regex(text));
    }
    query
}

fn hadith_filter(query: &HadithQuery) -> Document {
    let mut filter = Document::new();
    if let Some(collection) = &query.collection {
        filter.insert("collection", collection.as_str());
    }
    if let Some(chapter) = &query.chapter {
        filter.insert("chapter_number", exact_regex(chapter));
    }
    if let Some(number) = &query.number {
        filter.insert("hadith_number", exact_regex(number));
    }
    if let Some(grade) = &query.grade {
        filter.insert("grade", exact_regex(grade));
    }
    if let Some(text) = &query.text {
        filter.insert(
            "$or",
            vec![
                doc! { "text_english": text_regex(text) },
                doc! { "narrator": text_regex(text) },
            ],
        );
    }
    filter
}

#[async_trait]
impl QuranMirror for MongoMirror {
    async fn surahs(&self) -> MirrorResult<Vec<SurahRecord>> {
        self.find(QURAN_SURAHS, doc! {}, doc! { "number": 1 }).await
    }

    async fn surah(&self, number: u32) -> MirrorResult<Option<SurahRecord>> {
        self.find_one(QURAN_SURAHS, doc! { "number": i64::from(number) })
            .await
    }

    async fn editions(&self) -> MirrorResult<Vec<EditionRecord>> {
        self.find(QURAN_EDITIONS, doc! {}, doc! { "identifier": 1 }).await
    }

    async fn edition(&self, identifier: &str) -> MirrorResult<Option<EditionRecord>> {
        self.find_one(QURAN_EDITIONS, doc! { "identifier": identifier })
            .await
    }

    async fn verses(&self, filter: &VerseFilter) -> MirrorResult<Vec<VerseRecord>> {
        self.find(QURAN_VERSES, verse_filter(filter), doc! { "number": 1 })
            .await
    }
}

#[async_trait]
impl QuranMirrorWriter for MongoMirror {
    async fn clear_quran(&self) -> MirrorResult<()> {
        self.clear(&[QURAN_SURAHS, QURAN_EDITIONS, QURAN_VERSES]).await
    }

    async fn insert_surahs(&self, records: Vec<SurahRecord>) -> MirrorResult<usize> {
        self.insert(QURAN_SURAHS, records).await
    }

    async fn insert_editions(&self, records: Vec<EditionRecord>) -> MirrorResult<usize> {
        self.insert(QURAN_EDITIONS, records).await
    }

    async fn insert_verses(&self, records: Vec<VerseRecord>) -> MirrorResult<usize> {
        self.insert(QURAN_VERSES, records).await
    }
}

#[async_trait]
impl HadithMirror for MongoMirror {
    async fn collections(&self) -> MirrorResult<Vec<CollectionRecord>> {
        self.find(HADITH_COLLECTIONS, doc! {}, doc! { "id": 1 }).await
    }

    async fn collection(&self, slug: &str) -> MirrorResult<Option<CollectionRecord>> {
        self.find_one(HADITH_COLLECTIONS, doc! { "slug": slug }).await
    }

    async fn chapters(&self, collection: &str) -> MirrorResult<Vec<ChapterRecord>> {
        self.find(
            HADITH_CHAPTERS,
            doc! { "collection": collection },
            doc! { "number_sort": 1, "chapter_number": 1 },
        )
        .await
    }

    async fn hadiths(&self, query: &HadithQuery) -> MirrorResult<HadithSlice> {
        let filter = hadith_filter(query);
        let collection = self.collection::<HadithRecord>(HADITHS).await?;

        let total = collection
            .count_documents(filter.clone(), None)
            .await
            .map_err(classify)?;

        let options = FindOptions::builder()
            .sort(doc! { "collection": 1, "number_sort": 1, "hadith_number": 1 })
            .skip(query.skip())
            .limit(i64::from(query.per_page))
            .build();
        let records = collection
            .find(filter, options)
            .await
            .map_err(classify)?
            .try_collect()
            .await
            .map_err(classify)?;

        Ok(HadithSlice { records, total })
    }
}

#[async_trait]
impl HadithMirrorWriter for MongoMirror {
    async fn clear_hadith(&self) -> MirrorResult<()> {
        self.clear(&[HADITH_COLLECTIONS, HADITH_CHAPTERS, HADITHS])
            .await
    }

    async fn insert_collections(&self, records: Vec<CollectionRecord>) -> MirrorResult<usize> {
        self.insert(HADITH_COLLECTIONS, records).await
    }

    async fn insert_chapters(&self, records: Vec<ChapterRecord>) -> MirrorResult<usize> {
        self.insert(HADITH_CHAPTERS, records).await
    }

    async fn insert_hadiths(&self, records: Vec<HadithRecord>) -> MirrorResult<usize> {
        self.insert(HADITHS, records).await
    }
}

#[async_trait]
impl MirrorHealth for MongoMirror {
    async fn ping(&self) -> MirrorResult<()> {
        self.database()
            .await?
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(classify)?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_verse_filter_document() {
        let filter = VerseFilter {
            surah: Some(2),
            ayah_after: Some(10),
            ayah_through: Some(15),
            text: Some("mercy (of)".to_string()),
            ..VerseFilter::edition("en.asad")
        };

        let document = verse_filter(&filter);
        assert_eq!(document.get_str("edition").unwrap(), "en.asad");
        assert_eq!(document.get_i64("surah").unwrap(), 2);

        let range = document.get_document("ayah").unwrap();
        assert_eq!(range.get_i64("$gt").unwrap(), 10);
        assert_eq!(range.get_i64("$lte").unwrap(), 15);

        let text = document.get_document("text").unwrap();
        assert_eq!(text.get_str("$regex").unwrap(), r"mercy \(of\)");
        assert_eq!(text.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_exact_ayah_with_range_uses_and() {
        let filter = VerseFilter {
            ayah: Some(12),
            ayah_after: Some(10),
            ..Default::default()
        };
        let document = verse_filter(&filter);
        assert!(document.get("ayah").is_none());
        assert_eq!(document.get_array("$and").unwrap().len(), 2);
    }

    #[test]
    fn test_hadith_filter_document() {
        let query = HadithQuery {
            collection: Some("sahih-bukhari".to_string()),
            grade: Some("sahih".to_string()),
            text: Some("patience".to_string()),
            ..Default::default()
        };
        let document = hadith_filter(&query);

        assert_eq!(document.get_str("collection").unwrap(), "sahih-bukhari");
        let grade = document.get_document("grade").unwrap();
        assert_eq!(grade.get_str("$regex").unwrap(), "^sahih$");
        assert!(document.get("hadith_number").is_none());
        assert_eq!(document.get_array("$or").unwrap().len(), 2);
    }

    #[test]
    fn test_hadith_number_matches_ignoring_case() {
        let query = HadithQuery {
            number: Some("12a".to_string()),
            chapter: Some("3".to_string()),
            ..Default::default()
        };
        let document = hadith_filter(&query);

        let number = document.get_document("hadith_number").unwrap();
        assert_eq!(number.get_str("$regex").unwrap(), "^12a$");
        assert_eq!(number.get_str("$options").unwrap(), "i");
        let chapter = document.get_document("chapter_number").unwrap();
        assert_eq!(chapter.get_str("$regex").unwrap(), "^3$");
    }

    #[tokio::test]
    async fn test_unreachable_database_is_unavailable() {
        let mirror = MongoMirror::new(&MirrorConfig {
            uri: "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200".to_string(),
            connect_timeout: Duration::from_millis(500),
            ..Default::default()
        });

        let err = mirror.surahs().await.unwrap_err();
        assert!(matches!(err, MirrorError::Unavailable(_)));
        assert!(!mirror.is_connected());
    }
}
