//! Quran endpoints under `/api/v1/quran`.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{content, keyword, positive, AppState, Content};
use crate::core::error::{ContentError, ContentResult};
use crate::quran::{Ayah, AyahRange, AyahRef, QuranSection, SearchResult, Surah, SurahSummary};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/surahs", get(list_surahs))
        .route("/surahs/:number", get(get_surah))
        .route("/ayahs/:reference", get(get_ayah))
        .route("/juz/:number", get(get_juz))
        .route("/pages/:number", get(get_page))
        .route("/search", get(search))
}

#[derive(Debug, Default, Deserialize)]
pub struct EditionQuery {
    pub edition: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SurahQuery {
    pub edition: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl SurahQuery {
    fn range(&self) -> ContentResult<AyahRange> {
        let offset = match self.offset.as_deref() {
            Some(raw) => Some(raw.trim().parse::<u32>().map_err(|_| {
                ContentError::invalid_input("offset", format!("expected a number, got '{}'", raw))
            })?),
            None => None,
        };
        let limit = self
            .limit
            .as_deref()
            .map(|raw| positive("limit", raw))
            .transpose()?;
        Ok(AyahRange { offset, limit })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub surah: Option<String>,
    pub edition: Option<String>,
}

async fn list_surahs(State(state): State<AppState>) -> ContentResult<Content<Vec<SurahSummary>>> {
    content(state.quran.surahs().await, || "surah list".to_string())
}

async fn get_surah(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<SurahQuery>,
) -> ContentResult<Content<Surah>> {
    let number = positive("number", &number)?;
    let range = query.range()?;
    let result = state
        .quran
        .surah(number, query.edition.as_deref(), range)
        .await;
    content(result, || format!("surah {}", number))
}

async fn get_ayah(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<EditionQuery>,
) -> ContentResult<Content<Ayah>> {
    let reference = reference
        .parse::<AyahRef>()
        .map_err(|e| ContentError::invalid_input("reference", e.to_string()))?;
    let result = state.quran.ayah(&reference, query.edition.as_deref()).await;
    content(result, || format!("ayah {}", reference))
}

async fn get_juz(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<EditionQuery>,
) -> ContentResult<Content<QuranSection>> {
    let number = positive("number", &number)?;
    let result = state.quran.juz(number, query.edition.as_deref()).await;
    content(result, || format!("juz {}", number))
}

async fn get_page(
    State(state): State<AppState>,
    Path(number): Path<String>,
    Query(query): Query<EditionQuery>,
) -> ContentResult<Content<QuranSection>> {
    let number = positive("number", &number)?;
    let result = state.quran.page(number, query.edition.as_deref()).await;
    content(result, || format!("page {}", number))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ContentResult<Content<SearchResult>> {
    let q = keyword(query.q)?;
    let surah = query
        .surah
        .as_deref()
        .map(|raw| positive("surah", raw))
        .transpose()?;
    let result = state
        .quran
        .search(&q, surah, query.edition.as_deref())
        .await;
    content(result, || format!("matches for '{}'", q))
}
