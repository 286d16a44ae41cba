//! Shared builders for the integration tests.

#![allow(dead_code)]

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use islamic_content_gateway::caching::{ContentCache, InMemoryCache};
use islamic_content_gateway::core::config::{HadithApiConfig, QuranApiConfig};
use islamic_content_gateway::hadith::mirror::{ChapterRecord, CollectionRecord, HadithRecord};
use islamic_content_gateway::hadith::mirror::number_sort_key;
use islamic_content_gateway::hadith::{HadithMirrorWriter, HadithProvider, HadithService};
use islamic_content_gateway::mirror::InMemoryMirror;
use islamic_content_gateway::quran::mirror::{EditionRecord, SurahRecord, VerseRecord};
use islamic_content_gateway::quran::models::Sajda;
use islamic_content_gateway::quran::{QuranMirrorWriter, QuranProvider, QuranService};
use islamic_content_gateway::resolver::TtlPolicy;
use islamic_content_gateway::ReadThrough;

pub const EDITION: &str = "en.asad";

pub fn quran_config(base_url: &str, timeout: Duration) -> QuranApiConfig {
    QuranApiConfig {
        base_url: base_url.to_string(),
        timeout,
        default_edition: EDITION.to_string(),
    }
}

pub fn hadith_config(base_url: &str) -> HadithApiConfig {
    HadithApiConfig {
        base_url: base_url.to_string(),
        api_key: Some("test-key".to_string()),
        timeout: Duration::from_secs(2),
        page_size: 25,
    }
}

pub fn resolver(store: Arc<InMemoryCache>) -> ReadThrough {
    ReadThrough::new(ContentCache::new(store), TtlPolicy::default())
}

pub fn quran_service(
    base_url: &str,
    timeout: Duration,
    mirror: Arc<InMemoryMirror>,
    resolver: ReadThrough,
) -> QuranService {
    let provider = QuranProvider::new(&quran_config(base_url, timeout)).unwrap();
    QuranService::new(provider, mirror, resolver, EDITION)
}

pub fn hadith_service(
    base_url: &str,
    mirror: Arc<InMemoryMirror>,
    resolver: ReadThrough,
) -> HadithService {
    let provider = HadithProvider::new(&hadith_config(base_url)).unwrap();
    HadithService::new(provider, mirror, resolver)
}

pub fn edition_json() -> Value {
    json!({
        "identifier": EDITION,
        "language": "en",
        "name": "Asad",
        "englishName": "Muhammad Asad",
        "format": "text",
        "type": "translation",
        "direction": "ltr"
    })
}

pub fn surah_summary_json(number: u32, ayahs: u32) -> Value {
    json!({
        "number": number,
        "name": "سُورَةُ البَقَرَةِ",
        "englishName": "Al-Baqara",
        "englishNameTranslation": "The Cow",
        "numberOfAyahs": ayahs,
        "revelationType": "Medinan"
    })
}

/// AlQuran Cloud envelope for `GET /ayah/2:255/en.asad`
pub fn ayah_kursi_json() -> Value {
    json!({
        "code": 200,
        "status": "OK",
        "data": {
            "number": 262,
            "text": "GOD - there is no deity save Him, the Ever-Living, the Self-Subsistent Fount of All Being.",
            "edition": edition_json(),
            "surah": surah_summary_json(2, 286),
            "numberInSurah": 255,
            "juz": 3,
            "manzil": 1,
            "page": 42,
            "ruku": 35,
            "hizbQuarter": 17,
            "sajda": false
        }
    })
}

/// Mirror holding surah 2 of the default edition, all 286 verses
pub async fn seeded_quran_mirror() -> Arc<InMemoryMirror> {
    let now = Utc::now();
    let mirror = Arc::new(InMemoryMirror::new());

    mirror
        .insert_surahs(vec![SurahRecord {
            number: 2,
            name: "سُورَةُ البَقَرَةِ".to_string(),
            english_name: "Al-Baqara".to_string(),
            english_name_translation: "The Cow".to_string(),
            number_of_ayahs: 286,
            revelation_type: "Medinan".to_string(),
            created_at: now,
            updated_at: now,
        }])
        .await
        .unwrap();
    mirror
        .insert_editions(vec![EditionRecord {
            identifier: EDITION.to_string(),
            language: "en".to_string(),
            name: "Asad".to_string(),
            english_name: "Muhammad Asad".to_string(),
            format: "text".to_string(),
            kind: "translation".to_string(),
            direction: Some("ltr".to_string()),
            created_at: now,
            updated_at: now,
        }])
        .await
        .unwrap();

    let verses = (1..=286)
        .map(|ayah| VerseRecord {
            surah: 2,
            ayah,
            number: 7 + ayah,
            edition: EDITION.to_string(),
            text: format!("Al-Baqara verse {}", ayah),
            juz: if ayah <= 141 { 1 } else { 2 },
            manzil: 1,
            page: 2 + ayah / 6,
            ruku: 1,
            hizb_quarter: 1,
            sajda: Sajda::default(),
            created_at: now,
            updated_at: now,
        })
        .collect();
    mirror.insert_verses(verses).await.unwrap();
    mirror
}

/// Mirror holding three hadiths of Sahih al-Bukhari across two chapters
pub async fn seeded_hadith_mirror() -> Arc<InMemoryMirror> {
    let now = Utc::now();
    let mirror = Arc::new(InMemoryMirror::new());

    mirror
        .insert_collections(vec![CollectionRecord {
            id: 1,
            slug: "sahih-bukhari".to_string(),
            name: "Sahih Bukhari".to_string(),
            writer_name: "Imam Bukhari".to_string(),
            about_writer: None,
            writer_death: Some("256 ھ".to_string()),
            hadiths_count: 3,
            chapters_count: 2,
            created_at: now,
            updated_at: now,
        }])
        .await
        .unwrap();

    let chapter = |id: u64, number: &str, english: &str| ChapterRecord {
        id,
        collection: "sahih-bukhari".to_string(),
        chapter_number: number.to_string(),
        number_sort: number_sort_key(number),
        english: Some(english.to_string()),
        urdu: None,
        arabic: None,
        created_at: now,
        updated_at: now,
    };
    mirror
        .insert_chapters(vec![chapter(1, "1", "Revelation"), chapter(2, "2", "Belief")])
        .await
        .unwrap();

    let hadith = |number: &str, chapter_id: u64, chapter_number: &str, text: &str| HadithRecord {
        id: number_sort_key(number),
        collection: "sahih-bukhari".to_string(),
        hadith_number: number.to_string(),
        number_sort: number_sort_key(number),
        chapter_id,
        chapter_number: Some(chapter_number.to_string()),
        narrator: Some("Narrated 'Umar bin Al-Khattab:".to_string()),
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
    };
    mirror
        .insert_hadiths(vec![
            hadith("1", 1, "1", "The reward of deeds depends upon the intentions"),
            hadith("2", 1, "1", "Revelation came like the bright daylight"),
            hadith("8", 2, "2", "Islam is based on five principles"),
        ])
        .await
        .unwrap();
    mirror
}
