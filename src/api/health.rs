//! `/health`: the process is alive if it answers. Cache and mirror state are
//! reported for readiness dashboards but never fail the probe, since both
//! tiers are optional for serving content.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::debug;

use super::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyStatus {
    pub backend: &'static str,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `ok` when every tier answers, `degraded` otherwise
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: i64,
    pub cache: DependencyStatus,
    pub mirror: DependencyStatus,
}

pub async fn check(state: &AppState) -> HealthReport {
    let cache = DependencyStatus {
        backend: state.cache.backend(),
        available: state.cache.is_available().await,
        error: None,
    };

    let mirror = match state.mirror.ping().await {
        Ok(()) => DependencyStatus {
            backend: state.mirror.backend(),
            available: true,
            error: None,
        },
        Err(e) => {
            debug!(backend = state.mirror.backend(), error = %e, "Mirror health check failed");
            DependencyStatus {
                backend: state.mirror.backend(),
                available: false,
                error: Some(e.to_string()),
            }
        }
    };

    HealthReport {
        status: if cache.available && mirror.available {
            "ok"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        cache,
        mirror,
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(check(&state).await)
}
