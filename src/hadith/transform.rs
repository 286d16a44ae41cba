//! Conversions between Hadith mirror records and provider-shaped content.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::mirror::{number_sort_key, ChapterRecord, CollectionRecord, HadithRecord};
use super::models::{Chapter, Hadith, HadithBook, HadithPage};

pub fn to_book(record: &CollectionRecord) -> HadithBook {
    HadithBook {
        id: record.id,
        book_name: record.name.clone(),
        writer_name: record.writer_name.clone(),
        about_writer: record.about_writer.clone(),
        writer_death: record.writer_death.clone(),
        book_slug: record.slug.clone(),
        hadiths_count: record.hadiths_count,
        chapters_count: record.chapters_count,
    }
}

pub fn to_chapter(record: &ChapterRecord) -> Chapter {
    Chapter {
        id: record.id,
        chapter_number: record.chapter_number.clone(),
        chapter_english: record.english.clone(),
        chapter_urdu: record.urdu.clone(),
        chapter_arabic: record.arabic.clone(),
        book_slug: record.collection.clone(),
    }
}

pub fn to_hadith(
    record: &HadithRecord,
    collection: Option<&CollectionRecord>,
    chapter: Option<&ChapterRecord>,
) -> Hadith {
    Hadith {
        id: record.id,
        hadith_number: record.hadith_number.clone(),
        english_narrator: record.narrator.clone(),
        hadith_english: record.text_english.clone(),
        hadith_urdu: record.text_urdu.clone(),
        urdu_narrator: record.urdu_narrator.clone(),
        hadith_arabic: record.text_arabic.clone(),
        heading_arabic: record.heading_arabic.clone(),
        heading_urdu: record.heading_urdu.clone(),
        heading_english: record.heading_english.clone(),
        chapter_id: record.chapter_id,
        book_slug: record.collection.clone(),
        volume: record.volume.clone(),
        status: record.grade.clone(),
        book: collection.map(to_book),
        chapter: chapter.map(to_chapter),
    }
}

/// Lookup tables for attaching collection and chapter details to hadiths
#[derive(Debug, Default)]
pub struct HadithContext {
    collections: HashMap<String, CollectionRecord>,
    chapters: HashMap<u64, ChapterRecord>,
}

impl HadithContext {
    pub fn new(collections: Vec<CollectionRecord>, chapters: Vec<ChapterRecord>) -> Self {
        Self {
            collections: collections
                .into_iter()
                .map(|c| (c.slug.clone(), c))
                .collect(),
            chapters: chapters.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    pub fn hadith(&self, record: &HadithRecord) -> Hadith {
        to_hadith(
            record,
            self.collections.get(&record.collection),
            self.chapters.get(&record.chapter_id),
        )
    }
}

/// Paginator view over one page of mirror records
pub fn to_page(
    records: &[HadithRecord],
    total: u64,
    page: u32,
    per_page: u32,
    context: &HadithContext,
) -> HadithPage {
    let per_page = per_page.max(1);
    let last_page = u32::try_from(total.div_ceil(u64::from(per_page)))
        .unwrap_or(u32::MAX)
        .max(1);

    HadithPage {
        current_page: page.max(1),
        data: records.iter().map(|r| context.hadith(r)).collect(),
        last_page,
        per_page,
        total,
    }
}

pub fn collection_record(book: &HadithBook, now: DateTime<Utc>) -> CollectionRecord {
    CollectionRecord {
        id: book.id,
        slug: book.book_slug.clone(),
        name: book.book_name.clone(),
        writer_name: book.writer_name.clone(),
        about_writer: book.about_writer.clone(),
        writer_death: book.writer_death.clone(),
        hadiths_count: book.hadiths_count,
        chapters_count: book.chapters_count,
        created_at: now,
        updated_at: now,
    }
}

pub fn chapter_record(chapter: &Chapter, now: DateTime<Utc>) -> ChapterRecord {
    ChapterRecord {
        id: chapter.id,
        collection: chapter.book_slug.clone(),
        chapter_number: chapter.chapter_number.clone(),
        number_sort: number_sort_key(&chapter.chapter_number),
        english: chapter.chapter_english.clone(),
        urdu: chapter.chapter_urdu.clone(),
        arabic: chapter.chapter_arabic.clone(),
        created_at: now,
        updated_at: now,
    }
}

pub fn hadith_record(hadith: &Hadith, now: DateTime<Utc>) -> HadithRecord {
    HadithRecord {
        id: hadith.id,
        collection: hadith.book_slug.clone(),
        hadith_number: hadith.hadith_number.clone(),
        number_sort: number_sort_key(&hadith.hadith_number),
        chapter_id: hadith.chapter_id,
        chapter_number: hadith.chapter.as_ref().map(|c| c.chapter_number.clone()),
        narrator: hadith.english_narrator.clone(),
        urdu_narrator: hadith.urdu_narrator.clone(),
        text_english: hadith.hadith_english.clone(),
        text_urdu: hadith.hadith_urdu.clone(),
        text_arabic: hadith.hadith_arabic.clone(),
        heading_english: hadith.heading_english.clone(),
        heading_urdu: hadith.heading_urdu.clone(),
        heading_arabic: hadith.heading_arabic.clone(),
        volume: hadith.volume.clone(),
        grade: hadith.status.clone(),
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn collection(slug: &str) -> CollectionRecord {
        let now = Utc::now();
        CollectionRecord {
            id: 1,
            slug: slug.to_string(),
            name: "Sahih Bukhari".to_string(),
            writer_name: "Imam Bukhari".to_string(),
            about_writer: None,
            writer_death: Some("256 ھ".to_string()),
            hadiths_count: 7276,
            chapters_count: 99,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn chapter(collection: &str, id: u64, number: &str) -> ChapterRecord {
        let now = Utc::now();
        ChapterRecord {
            id,
            collection: collection.to_string(),
            chapter_number: number.to_string(),
            number_sort: number_sort_key(number),
            english: Some(format!("Chapter {}", number)),
            urdu: None,
            arabic: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn hadith(collection: &str, number: &str, chapter_id: u64, text: &str) -> HadithRecord {
        let now = Utc::now();
        HadithRecord {
            id: number_sort_key(number),
            collection: collection.to_string(),
            hadith_number: number.to_string(),
            number_sort: number_sort_key(number),
            chapter_id,
            chapter_number: Some(chapter_id.to_string()),
            narrator: Some("Narrated Abu Huraira:".to_string()),
            urdu_narrator: None,
            text_english: Some(text.to_string()),
            text_urdu: None,
            text_arabic: None,
            heading_english: None,
            heading_urdu: None,
            heading_arabic: None,
            volume: Some("1".to_string()),
            grade: "Sahih".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
