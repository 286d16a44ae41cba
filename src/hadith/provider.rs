//! HadithAPI client.

use serde::de::DeserializeOwned;

use super::models::{
    BooksResponse, Chapter, ChaptersResponse, Hadith, HadithBook, HadithFilter, HadithPage,
    HadithsResponse,
};
use crate::core::config::HadithApiConfig;
use crate::remote::{RemoteClient, RemoteError, RemoteResult};

/// Typed access to the HadithAPI endpoints
#[derive(Debug, Clone)]
pub struct HadithProvider {
    client: RemoteClient,
    api_key: Option<String>,
    page_size: u32,
}

impl HadithProvider {
    pub fn new(config: &HadithApiConfig) -> Result<Self, RemoteError> {
        Ok(Self {
            client: RemoteClient::new(&config.base_url, config.timeout)?,
            api_key: config.api_key.clone(),
            page_size: config.page_size.max(1),
        })
    }

    /// Page size used when a request does not ask for one
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub async fn collections(&self) -> RemoteResult<Vec<HadithBook>> {
        let response: Option<BooksResponse> = self.fetch(&["books"], Vec::new()).await?;
        Ok(response.map(|r| r.books).filter(|books| !books.is_empty()))
    }

    pub async fn chapters(&self, collection: &str) -> RemoteResult<Vec<Chapter>> {
        let response: Option<ChaptersResponse> =
            self.fetch(&[collection, "chapters"], Vec::new()).await?;
        Ok(response
            .map(|r| r.chapters)
            .filter(|chapters| !chapters.is_empty()))
    }

    pub async fn hadith(&self, collection: &str, number: &str) -> RemoteResult<Hadith> {
        let filter = HadithFilter {
            collection: Some(collection.to_string()),
            number: Some(number.to_string()),
            ..Default::default()
        };
        let page = self.hadiths(&filter).await?;
        Ok(page.and_then(|p| p.data.into_iter().next()))
    }

    pub async fn hadiths(&self, filter: &HadithFilter) -> RemoteResult<HadithPage> {
        self.page(Self::filter_query(filter), filter.page_or_first(), filter.per_page)
            .await
    }

    pub async fn search(
        &self,
        keyword: &str,
        collection: Option<&str>,
        page: u32,
        per_page: Option<u32>,
    ) -> RemoteResult<HadithPage> {
        let mut query = vec![("hadithEnglish", keyword.to_string())];
        if let Some(collection) = collection {
            query.push(("book", collection.to_string()));
        }
        self.page(query, page.max(1), per_page).await
    }

    fn filter_query(filter: &HadithFilter) -> Vec<(&'static str, String)> {
        [
            ("book", &filter.collection),
            ("chapter", &filter.chapter),
            ("hadithNumber", &filter.number),
            ("status", &filter.grade),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name, v.clone())))
        .collect()
    }

    async fn page(
        &self,
        mut query: Vec<(&'static str, String)>,
        page: u32,
        per_page: Option<u32>,
    ) -> RemoteResult<HadithPage> {
        query.push(("page", page.to_string()));
        query.push(("paginate", per_page.unwrap_or(self.page_size).max(1).to_string()));

        let response: Option<HadithsResponse> = self.fetch(&["hadiths"], query).await?;
        Ok(response.map(|r| r.hadiths).filter(|p| !p.is_empty()))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        mut query: Vec<(&'static str, String)>,
    ) -> RemoteResult<T> {
        if let Some(key) = &self.api_key {
            query.push(("apiKey", key.clone()));
        }
        self.client.get_json(self.client.url(segments, &query)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HadithProvider {
        HadithProvider::new(&HadithApiConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(2),
            page_size: 25,
        })
        .unwrap()
    }

    fn hadith_json(number: &str) -> serde_json::Value {
        json!({
            "id": 1,
            "hadithNumber": number,
            "englishNarrator": "Narrated 'Umar bin Al-Khattab:",
            "hadithEnglish": "The reward of deeds depends upon the intentions",
            "chapterId": "1",
            "bookSlug": "sahih-bukhari",
            "volume": "1",
            "status": "Sahih"
        })
    }

    #[tokio::test]
    async fn test_hadith_by_number_sends_filters_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hadiths"))
            .and(query_param("book", "sahih-bukhari"))
            .and(query_param("hadithNumber", "1"))
            .and(query_param("apiKey", "test-key"))
            .and(query_param("paginate", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "message": "Hadiths has been found.",
                "hadiths": {
                    "current_page": 1,
                    "data": [hadith_json("1")],
                    "last_page": 1,
                    "per_page": 25,
                    "total": 1
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let hadith = provider(&server)
            .hadith("sahih-bukhari", "1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hadith.hadith_number, "1");
        assert_eq!(hadith.status, "Sahih");
    }

    #[tokio::test]
    async fn test_not_found_and_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hadiths"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": 404,
                "message": "Hadiths not found."
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/books"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider(&server);
        assert!(provider.hadith("sahih-bukhari", "999999").await.unwrap().is_none());
        assert!(matches!(
            provider.collections().await,
            Err(RemoteError::Status { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_search_uses_english_text_parameter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hadiths"))
            .and(query_param("hadithEnglish", "intentions"))
            .and(query_param("page", "2"))
            .and(query_param("paginate", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "hadiths": {
                    "current_page": 2,
                    "data": [hadith_json("11")],
                    "last_page": 2,
                    "per_page": 10,
                    "total": 11
                }
            })))
            .mount(&server)
            .await;

        let page = provider(&server)
            .search("intentions", None, 2, Some(10))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total, 11);
    }

    #[tokio::test]
    async fn test_chapters_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sahih-bukhari/chapters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": 200,
                "chapters": [{
                    "id": 1,
                    "chapterNumber": "1",
                    "chapterEnglish": "Revelation",
                    "chapterUrdu": null,
                    "chapterArabic": null,
                    "bookSlug": "sahih-bukhari"
                }]
            })))
            .mount(&server)
            .await;

        let chapters = provider(&server).chapters("sahih-bukhari").await.unwrap().unwrap();
        assert_eq!(chapters[0].chapter_english.as_deref(), Some("Revelation"));
    }
}
