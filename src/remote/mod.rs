//! # Remote Providers
//!
//! Shared HTTP plumbing for the upstream content APIs. Every call is bounded
//! by the provider's timeout and reports its outcome as a typed result:
//! `Ok(Some(_))` for content, `Ok(None)` when the upstream authoritatively has
//! nothing at the reference, and [`RemoteError`] for everything else.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// Why a remote call produced no usable answer
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("invalid provider configuration: {0}")]
    Configuration(String),
}

pub type RemoteResult<T> = Result<Option<T>, RemoteError>;

/// Thin JSON-over-HTTP client bound to one base URL
#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
    not_found: Vec<StatusCode>,
}

impl RemoteClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, RemoteError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RemoteError::Configuration(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Configuration(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("islamic-content-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout: request_timeout,
            not_found: vec![StatusCode::NOT_FOUND],
        })
    }

    /// Treat `status` as an authoritative "not found" in addition to 404
    pub fn with_not_found_status(mut self, status: StatusCode) -> Self {
        if !self.not_found.contains(&status) {
            self.not_found.push(status);
        }
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/{segments...}?{query...}`, percent-encoding every segment
    pub fn url<S: AsRef<str>>(&self, segments: &[S], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        url
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> RemoteResult<T> {
        let redacted = redact(&url);
        let request = async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        let (status, body) = match timeout(self.timeout, request).await {
            Err(_) => return Err(RemoteError::Timeout { url: redacted }),
            Ok(Err(e)) if e.is_timeout() => return Err(RemoteError::Timeout { url: redacted }),
            Ok(Err(e)) => {
                return Err(RemoteError::Transport {
                    url: redacted,
                    message: e.to_string(),
                })
            }
            Ok(Ok(parts)) => parts,
        };

        if self.not_found.contains(&status) {
            debug!(url = %redacted, status = status.as_u16(), "Remote reports not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(RemoteError::Status {
                url: redacted,
                status: status.as_u16(),
            });
        }

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| RemoteError::Malformed {
                url: redacted,
                message: e.to_string(),
            })
    }
}

/// URL for logs and errors with credentials masked
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k.eq_ignore_ascii_case("apikey") {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    if pairs.is_empty() {
        shown.set_query(None);
    } else {
        shown.query_pairs_mut().clear().extend_pairs(pairs);
    }
    shown.to_string()
}
