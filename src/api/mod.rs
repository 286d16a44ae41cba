//! # HTTP API
//!
//! Read-only JSON endpoints over the Quran and Hadith services.
//!
//! Every successful body has the shape `{ "data": ... }` whichever tier served
//! it; the tier is reported in the `x-content-source` header instead so that
//! clients comparing bodies see identical content. Errors use the
//! [`ContentError`] rendering.
//!
//! ## Endpoints
//! - GET /health - liveness plus cache and mirror readiness
//! - GET /metrics - Prometheus exposition
//! - GET /api/v1/quran/... - surahs, ayahs, juz, pages, search
//! - GET /api/v1/hadith/... - collections, chapters, hadiths, search

pub mod hadith;
pub mod health;
pub mod quran;
pub mod server;

pub use server::ContentServer;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::caching::ContentCache;
use crate::core::error::{ContentError, ContentResult};
use crate::hadith::HadithService;
use crate::mirror::MirrorHealth;
use crate::observability::metrics::{record_request, Metrics};
use crate::quran::QuranService;
use crate::resolver::{ResolveResult, Resolved};

/// Response header naming the tier that served the body
pub const CONTENT_SOURCE_HEADER: &str = "x-content-source";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub quran: QuranService,
    pub hadith: HadithService,
    pub cache: ContentCache,
    pub mirror: Arc<dyn MirrorHealth>,
    pub metrics: Option<Metrics>,
}

/// Random `x-request-id` for requests that arrive without one
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build the full router with request ids, tracing, timeout and request metrics
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(render_metrics))
        .nest("/api/v1/quran", quran::routes())
        .nest("/api/v1/hadith", hadith::routes())
        .layer(middleware::from_fn(track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(metrics) => (
            [(CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"))],
            metrics.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let started = Instant::now();

    let response = next.run(request).await;
    record_request(&route, response.status().as_u16(), started.elapsed());
    response
}

/// Successful content response
pub struct Content<T>(pub Resolved<T>);

impl<T: Serialize> IntoResponse for Content<T> {
    fn into_response(self) -> Response {
        let Resolved { value, source } = self.0;
        (
            [(CONTENT_SOURCE_HEADER, HeaderValue::from_static(source.as_str()))],
            Json(json!({ "data": value })),
        )
            .into_response()
    }
}

/// Turn a resolver outcome into a response, with `Ok(None)` becoming a 404
/// for `resource`
pub fn content<T>(result: ResolveResult<T>, resource: impl FnOnce() -> String) -> ContentResult<Content<T>> {
    match result? {
        Some(resolved) => Ok(Content(resolved)),
        None => Err(ContentError::not_found(resource())),
    }
}

/// Parse a positive integer path or query parameter
pub fn positive(field: &str, raw: &str) -> ContentResult<u32> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ContentError::invalid_input(
            field,
            format!("expected a positive integer, got '{}'", raw),
        )),
    }
}

/// Require a non-blank search keyword
pub fn keyword(raw: Option<String>) -> ContentResult<String> {
    raw.map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ContentError::invalid_input("q", "a search keyword is required"))
}
