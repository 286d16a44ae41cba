//! Conversions between mirror records and provider-shaped content.
//!
//! The `to_*` functions build what the gateway returns from stored records and
//! must produce exactly what AlQuran Cloud would have served. The `*_record`
//! functions go the other way for the seeding job.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::mirror::{EditionRecord, SurahRecord, VerseRecord};
use super::models::{
    Ayah, Edition, QuranSection, SearchMatch, SearchResult, SectionAyah, Surah, SurahAyah,
    SurahSummary,
};

pub fn to_surah_summary(record: &SurahRecord) -> SurahSummary {
    SurahSummary {
        number: record.number,
        name: record.name.clone(),
        english_name: record.english_name.clone(),
        english_name_translation: record.english_name_translation.clone(),
        number_of_ayahs: record.number_of_ayahs,
        revelation_type: record.revelation_type.clone(),
    }
}

pub fn to_edition(record: &EditionRecord) -> Edition {
    Edition {
        identifier: record.identifier.clone(),
        language: record.language.clone(),
        name: record.name.clone(),
        english_name: record.english_name.clone(),
        format: record.format.clone(),
        kind: record.kind.clone(),
        direction: record.direction.clone(),
    }
}

pub fn to_surah_ayah(verse: &VerseRecord) -> SurahAyah {
    SurahAyah {
        number: verse.number,
        text: verse.text.clone(),
        number_in_surah: verse.ayah,
        juz: verse.juz,
        manzil: verse.manzil,
        page: verse.page,
        ruku: verse.ruku,
        hizb_quarter: verse.hizb_quarter,
        sajda: verse.sajda.clone(),
    }
}

pub fn to_surah(surah: &SurahRecord, edition: &EditionRecord, verses: &[VerseRecord]) -> Surah {
    Surah {
        number: surah.number,
        name: surah.name.clone(),
        english_name: surah.english_name.clone(),
        english_name_translation: surah.english_name_translation.clone(),
        revelation_type: surah.revelation_type.clone(),
        number_of_ayahs: surah.number_of_ayahs,
        ayahs: verses.iter().map(to_surah_ayah).collect(),
        edition: to_edition(edition),
    }
}

pub fn to_ayah(verse: &VerseRecord, surah: &SurahRecord, edition: &EditionRecord) -> Ayah {
    Ayah {
        number: verse.number,
        text: verse.text.clone(),
        edition: to_edition(edition),
        surah: to_surah_summary(surah),
        number_in_surah: verse.ayah,
        juz: verse.juz,
        manzil: verse.manzil,
        page: verse.page,
        ruku: verse.ruku,
        hizb_quarter: verse.hizb_quarter,
        sajda: verse.sajda.clone(),
    }
}

/// Juz or page view; verses whose surah is unknown are left out
pub fn to_section(
    number: u32,
    verses: &[VerseRecord],
    surahs: &BTreeMap<u32, SurahRecord>,
    edition: &EditionRecord,
) -> QuranSection {
    let mut touched = BTreeMap::new();
    let ayahs = verses
        .iter()
        .filter_map(|verse| {
            let surah = to_surah_summary(surahs.get(&verse.surah)?);
            touched
                .entry(surah.number)
                .or_insert_with(|| surah.clone());
            Some(SectionAyah {
                number: verse.number,
                text: verse.text.clone(),
                surah,
                number_in_surah: verse.ayah,
                juz: verse.juz,
                manzil: verse.manzil,
                page: verse.page,
                ruku: verse.ruku,
                hizb_quarter: verse.hizb_quarter,
                sajda: verse.sajda.clone(),
            })
        })
        .collect();

    QuranSection {
        number,
        ayahs,
        surahs: touched,
        edition: to_edition(edition),
    }
}

pub fn to_search_result(
    verses: &[VerseRecord],
    surahs: &BTreeMap<u32, SurahRecord>,
    edition: &EditionRecord,
) -> SearchResult {
    let edition = to_edition(edition);
    let matches: Vec<SearchMatch> = verses
        .iter()
        .filter_map(|verse| {
            Some(SearchMatch {
                number: verse.number,
                text: verse.text.clone(),
                edition: edition.clone(),
                surah: to_surah_summary(surahs.get(&verse.surah)?),
                number_in_surah: verse.ayah,
            })
        })
        .collect();

    SearchResult {
        count: matches.len() as u32,
        matches,
    }
}

pub fn surah_record(summary: &SurahSummary, now: DateTime<Utc>) -> SurahRecord {
    SurahRecord {
        number: summary.number,
        name: summary.name.clone(),
        english_name: summary.english_name.clone(),
        english_name_translation: summary.english_name_translation.clone(),
        number_of_ayahs: summary.number_of_ayahs,
        revelation_type: summary.revelation_type.clone(),
        created_at: now,
        updated_at: now,
    }
}

pub fn edition_record(edition: &Edition, now: DateTime<Utc>) -> EditionRecord {
    EditionRecord {
        identifier: edition.identifier.clone(),
        language: edition.language.clone(),
        name: edition.name.clone(),
        english_name: edition.english_name.clone(),
        format: edition.format.clone(),
        kind: edition.kind.clone(),
        direction: edition.direction.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// Every verse of a fetched surah as mirror records
pub fn verse_records(surah: &Surah, now: DateTime<Utc>) -> Vec<VerseRecord> {
    surah
        .ayahs
        .iter()
        .map(|ayah| VerseRecord {
            surah: surah.number,
            ayah: ayah.number_in_surah,
            number: ayah.number,
            edition: surah.edition.identifier.clone(),
            text: ayah.text.clone(),
            juz: ayah.juz,
            manzil: ayah.manzil,
            page: ayah.page,
            ruku: ayah.ruku,
            hizb_quarter: ayah.hizb_quarter,
            sajda: ayah.sajda.clone(),
            created_at: now,
            updated_at: now,
        })
        .collect()
}
