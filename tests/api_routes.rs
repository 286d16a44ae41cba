//! HTTP surface tests: status codes, the `{ "data": ... }` envelope and the
//! source header, driven through the full router.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use islamic_content_gateway::api::{self, AppState, CONTENT_SOURCE_HEADER};
use islamic_content_gateway::caching::{ContentCache, InMemoryCache};
use islamic_content_gateway::hadith::{HadithProvider, HadithService};
use islamic_content_gateway::mirror::{DisabledMirror, InMemoryMirror, MirrorHealth};
use islamic_content_gateway::observability::Metrics;
use islamic_content_gateway::quran::{QuranProvider, QuranService};

struct Fixture {
    server: TestServer,
    _remote: MockServer,
}

/// Router over a mocked provider, a seeded in-memory mirror and an
/// in-memory cache
async fn fixture(remote: MockServer) -> Fixture {
    let store = Arc::new(InMemoryCache::new(1_000));
    let quran_mirror = seeded_quran_mirror().await;
    let hadith_mirror = seeded_hadith_mirror().await;
    let (metrics, _recorder) = Metrics::unregistered().unwrap();

    let state = AppState {
        quran: quran_service(
            &remote.uri(),
            Duration::from_secs(2),
            quran_mirror.clone(),
            resolver(store.clone()),
        ),
        hadith: hadith_service(&remote.uri(), hadith_mirror, resolver(store.clone())),
        cache: ContentCache::new(store),
        mirror: quran_mirror,
        metrics: Some(metrics),
    };

    Fixture {
        server: TestServer::new(api::router(state, Duration::from_secs(5))).unwrap(),
        _remote: remote,
    }
}

fn source(response: &axum_test::TestResponse) -> Option<String> {
    response
        .headers()
        .get(CONTENT_SOURCE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn test_ayah_from_remote_then_cache() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/2(:|%3A)255/en\.asad$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ayah_kursi_json()))
        .expect(1)
        .mount(&remote)
        .await;
    let fixture = fixture(remote).await;

    let response = fixture.server.get("/api/v1/quran/ayahs/2:255").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(source(&response).as_deref(), Some("remote"));
    let first = response.json::<Value>();
    assert_eq!(first["data"]["numberInSurah"], 255);
    assert_eq!(first["data"]["surah"]["englishName"], "Al-Baqara");

    let cached = fixture.server.get("/api/v1/quran/ayahs/2:255").await;
    assert_eq!(cached.status_code(), StatusCode::OK);
    assert_eq!(source(&cached).as_deref(), Some("cache"));
    assert_eq!(cached.json::<Value>(), first);
}

#[tokio::test]
async fn test_surah_falls_back_to_mirror() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&remote)
        .await;
    let fixture = fixture(remote).await;

    let response = fixture
        .server
        .get("/api/v1/quran/surahs/2")
        .add_query_param("offset", "254")
        .add_query_param("limit", "2")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(source(&response).as_deref(), Some("fallback"));

    let body = response.json::<Value>();
    let ayahs = body["data"]["ayahs"].as_array().unwrap();
    assert_eq!(ayahs.len(), 2);
    assert_eq!(ayahs[0]["numberInSurah"], 255);
    assert_eq!(ayahs[1]["numberInSurah"], 256);
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&remote)
        .await;
    let fixture = fixture(remote).await;

    for uri in [
        "/api/v1/quran/surahs/zero",
        "/api/v1/quran/surahs/0",
        "/api/v1/quran/ayahs/2-255",
        "/api/v1/quran/juz/x",
        "/api/v1/quran/search",
    ] {
        let response = fixture.server.get(uri).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(response.json::<Value>()["error"]["type"], "invalid_input", "{}", uri);
    }

    let bad_page = fixture
        .server
        .get("/api/v1/hadith/hadiths")
        .add_query_param("page", "first")
        .await;
    assert_eq!(bad_page.status_code(), StatusCode::BAD_REQUEST);

    let blank = fixture
        .server
        .get("/api/v1/hadith/search")
        .add_query_param("q", "   ")
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_content_is_not_found() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/ayah/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&remote)
        .await;
    let fixture = fixture(remote).await;

    let response = fixture.server.get("/api/v1/quran/ayahs/999:1").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["type"], "not_found");
    assert_eq!(body["error"]["retryable"], false);
}

#[tokio::test]
async fn test_both_tiers_down_is_service_unavailable() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&remote)
        .await;

    let store = Arc::new(InMemoryCache::new(100));
    let quran = QuranService::new(
        QuranProvider::new(&quran_config(&remote.uri(), Duration::from_secs(2))).unwrap(),
        Arc::new(DisabledMirror),
        resolver(store.clone()),
        EDITION,
    );
    let hadith = HadithService::new(
        HadithProvider::new(&hadith_config(&remote.uri())).unwrap(),
        Arc::new(DisabledMirror),
        resolver(store.clone()),
    );
    let state = AppState {
        quran,
        hadith,
        cache: ContentCache::new(store),
        mirror: Arc::new(DisabledMirror),
        metrics: None,
    };
    let server = TestServer::new(api::router(state, Duration::from_secs(5))).unwrap();

    let response = server.get("/api/v1/quran/ayahs/2:255").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["type"], "temporarily_unavailable");
    assert_eq!(body["error"]["retryable"], true);

    let hadiths = server.get("/api/v1/hadith/collections").await;
    assert_eq!(hadiths.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    // Without a recorder there is nothing to expose
    assert_eq!(server.get("/metrics").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_degraded_tiers_with_ok_status() {
    let remote = MockServer::start().await;
    let state = AppState {
        quran: quran_service(
            &remote.uri(),
            Duration::from_secs(2),
            Arc::new(InMemoryMirror::new()),
            resolver(Arc::new(InMemoryCache::new(10))),
        ),
        hadith: hadith_service(
            &remote.uri(),
            Arc::new(InMemoryMirror::new()),
            resolver(Arc::new(InMemoryCache::new(10))),
        ),
        cache: ContentCache::disabled(),
        mirror: Arc::new(DisabledMirror) as Arc<dyn MirrorHealth>,
        metrics: None,
    };
    let server = TestServer::new(api::router(state, Duration::from_secs(5))).unwrap();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["cache"]["backend"], "disabled");
    assert_eq!(body["cache"]["available"], false);
    assert_eq!(body["mirror"]["available"], false);
    assert_eq!(body["mirror"]["error"], "mirror is disabled");
}

#[tokio::test]
async fn test_health_ok_and_metrics_exposed() {
    let remote = MockServer::start().await;
    let fixture = fixture(remote).await;

    let health = fixture.server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    let body = health.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cache"]["backend"], "memory");
    assert_eq!(body["mirror"]["backend"], "memory");

    let metrics = fixture.server.get("/metrics").await;
    assert_eq!(metrics.status_code(), StatusCode::OK);
    let content_type = metrics
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_request_id_is_generated_and_propagated() {
    let remote = MockServer::start().await;
    let fixture = fixture(remote).await;

    let generated = fixture.server.get("/health").await;
    assert!(generated.headers().get("x-request-id").is_some());

    let supplied = fixture
        .server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static("trace-me"),
        )
        .await;
    assert_eq!(
        supplied.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some("trace-me")
    );
}

#[tokio::test]
async fn test_hadith_listing_from_mirror() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&remote)
        .await;
    let fixture = fixture(remote).await;

    let response = fixture
        .server
        .get("/api/v1/hadith/hadiths")
        .add_query_param("collection", "sahih-bukhari")
        .add_query_param("per_page", "2")
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(source(&response).as_deref(), Some("fallback"));

    let body = response.json::<Value>();
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["last_page"], 2);
    assert_eq!(body["data"]["data"][0]["hadithNumber"], "1");

    let single = fixture
        .server
        .get("/api/v1/hadith/collections/sahih-bukhari/hadiths/8")
        .await;
    assert_eq!(single.status_code(), StatusCode::OK);
    assert_eq!(
        single.json::<Value>()["data"]["hadithEnglish"],
        "Islam is based on five principles"
    );
}
