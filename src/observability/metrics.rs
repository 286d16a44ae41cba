//! # Metrics
//!
//! Counters are recorded where the events happen (`content_cache_errors_total`
//! in the cache wrapper, `content_resolutions_total` and
//! `content_remote_failures_total` in the resolver, `content_seeded_records_total`
//! in the seeder). This module owns the Prometheus recorder and the HTTP
//! request metrics recorded by the API layer.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::time::Duration;

use crate::core::error::{ContentError, ContentResult};

const REQUEST_DURATION: &str = "content_http_request_duration_seconds";
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Handle on the Prometheus recorder used to render `/metrics`
#[derive(Clone)]
pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    fn builder() -> ContentResult<PrometheusBuilder> {
        PrometheusBuilder::new()
            .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)
            .map_err(|e| ContentError::config(format!("invalid metric buckets: {}", e)))
    }

    /// Install the recorder globally; only one process-wide install succeeds
    pub fn install() -> ContentResult<Self> {
        let handle = Self::builder()?
            .install_recorder()
            .map_err(|e| ContentError::config(format!("failed to install metrics recorder: {}", e)))?;
        Ok(Self { handle })
    }

    /// A recorder that is not installed globally, for tests and tools
    pub fn unregistered() -> ContentResult<(Self, PrometheusRecorder)> {
        let recorder = Self::builder()?.build_recorder();
        Ok((
            Self {
                handle: recorder.handle(),
            },
            recorder,
        ))
    }

    /// Prometheus text exposition
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

/// Record one served HTTP request
pub fn record_request(route: &str, status: u16, elapsed: Duration) {
    let status = status.to_string();
    counter!(
        "content_http_requests_total",
        "route" => route.to_string(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "route" => route.to_string(), "status" => status)
        .record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_recorded_requests() {
        let (metrics, recorder) = Metrics::unregistered().unwrap();
        metrics::with_local_recorder(&recorder, || {
            record_request("/v1/quran/surahs", 200, Duration::from_millis(12));
            record_request("/v1/quran/surahs", 200, Duration::from_millis(30));
        });

        let output = metrics.render();
        assert!(output.contains("content_http_requests_total"));
        assert!(output.contains("route=\"/v1/quran/surahs\""));
        assert!(output.contains("content_http_request_duration_seconds_bucket"));
    }
}
