//! AlQuran Cloud client.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::models::{
    AyahRange, Ayah, Envelope, QuranSection, SearchResult, SearchScope, Surah, SurahSummary,
};
use super::reference::AyahRef;
use crate::core::config::QuranApiConfig;
use crate::remote::{RemoteClient, RemoteError, RemoteResult};

/// Typed access to the AlQuran Cloud endpoints
#[derive(Debug, Clone)]
pub struct QuranProvider {
    client: RemoteClient,
}

impl QuranProvider {
    pub fn new(config: &QuranApiConfig) -> Result<Self, RemoteError> {
        // Invalid references such as 999:1 come back as 400
        let client = RemoteClient::new(&config.base_url, config.timeout)?
            .with_not_found_status(StatusCode::BAD_REQUEST);
        Ok(Self { client })
    }

    pub async fn list_surahs(&self) -> RemoteResult<Vec<SurahSummary>> {
        let surahs: Option<Vec<SurahSummary>> = self.fetch(self.client.url(&["surah"], &[])).await?;
        Ok(surahs.filter(|list| !list.is_empty()))
    }

    pub async fn surah(&self, number: u32, edition: &str, range: AyahRange) -> RemoteResult<Surah> {
        let mut query = Vec::new();
        if let Some(offset) = range.offset {
            query.push(("offset", offset.to_string()));
        }
        if let Some(limit) = range.limit {
            query.push(("limit", limit.to_string()));
        }
        let number = number.to_string();
        let surah: Option<Surah> = self
            .fetch(self.client.url(&["surah", number.as_str(), edition], &query))
            .await?;
        // A range past the last ayah is answered with an empty list
        Ok(surah.filter(|s| !s.ayahs.is_empty()))
    }

    pub async fn ayah(&self, reference: &AyahRef, edition: &str) -> RemoteResult<Ayah> {
        let reference = reference.to_string();
        self.fetch(self.client.url(&["ayah", reference.as_str(), edition], &[]))
            .await
    }

    pub async fn juz(&self, number: u32, edition: &str) -> RemoteResult<QuranSection> {
        let number = number.to_string();
        let section: Option<QuranSection> = self
            .fetch(self.client.url(&["juz", number.as_str(), edition], &[]))
            .await?;
        Ok(section.filter(|s| !s.ayahs.is_empty()))
    }

    pub async fn page(&self, number: u32, edition: &str) -> RemoteResult<QuranSection> {
        let number = number.to_string();
        let section: Option<QuranSection> = self
            .fetch(self.client.url(&["page", number.as_str(), edition], &[]))
            .await?;
        Ok(section.filter(|s| !s.ayahs.is_empty()))
    }

    pub async fn search(
        &self,
        keyword: &str,
        scope: SearchScope,
        edition: &str,
    ) -> RemoteResult<SearchResult> {
        let scope = scope.to_string();
        let result: Option<SearchResult> = self
            .fetch(self.client.url(&["search", keyword, scope.as_str(), edition], &[]))
            .await?;
        Ok(result.filter(|r| r.count > 0 && !r.matches.is_empty()))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> RemoteResult<T> {
        let envelope: Option<Envelope<T>> = self.client.get_json(url).await?;
        Ok(envelope.map(|e| e.data))
    }
}
