//! Hadith endpoints under `/api/v1/hadith`.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{content, keyword, positive, AppState, Content};
use crate::core::error::ContentResult;
use crate::hadith::{Chapter, Hadith, HadithBook, HadithFilter, HadithPage};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections))
        .route("/collections/:collection/chapters", get(list_chapters))
        .route("/collections/:collection/hadiths/:number", get(get_hadith))
        .route("/hadiths", get(list_hadiths))
        .route("/search", get(search))
}

/// Paging values arrive as text so that bad input gets the JSON error body
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub collection: Option<String>,
    pub chapter: Option<String>,
    pub number: Option<String>,
    pub grade: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> ContentResult<HadithFilter> {
        Ok(HadithFilter {
            page: optional_positive("page", self.page.as_deref())?,
            per_page: optional_positive("per_page", self.per_page.as_deref())?,
            collection: self.collection,
            chapter: self.chapter,
            number: self.number,
            grade: self.grade,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub collection: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

fn optional_positive(field: &str, raw: Option<&str>) -> ContentResult<Option<u32>> {
    raw.map(|raw| positive(field, raw)).transpose()
}

async fn list_collections(State(state): State<AppState>) -> ContentResult<Content<Vec<HadithBook>>> {
    content(state.hadith.collections().await, || "hadith collections".to_string())
}

async fn list_chapters(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> ContentResult<Content<Vec<Chapter>>> {
    let result = state.hadith.chapters(&collection).await;
    content(result, || format!("chapters of {}", collection))
}

async fn get_hadith(
    State(state): State<AppState>,
    Path((collection, number)): Path<(String, String)>,
) -> ContentResult<Content<Hadith>> {
    let result = state.hadith.hadith(&collection, &number).await;
    content(result, || format!("hadith {} in {}", number, collection))
}

async fn list_hadiths(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ContentResult<Content<HadithPage>> {
    let filter = query.into_filter()?;
    let result = state.hadith.hadiths(filter).await;
    content(result, || "hadiths matching the filter".to_string())
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ContentResult<Content<HadithPage>> {
    let q = keyword(query.q)?;
    let page = optional_positive("page", query.page.as_deref())?;
    let per_page = optional_positive("per_page", query.per_page.as_deref())?;
    let result = state
        .hadith
        .search(&q, query.collection.as_deref(), page, per_page)
        .await;
    content(result, || format!("hadiths matching '{}'", q))
}
