//! # Read-Through Resolver
//!
//! The two-tier read path shared by every content operation:
//!
//! ```text
//! key -> cache hit? ──yes──> Done(cache)
//!           │ no
//!           v
//!        remote ──value──> cache(remote ttl) -> Done(remote)
//!           │ not found ──(RemoteAuthoritative)──> not found
//!           │ error / not found (MirrorOnEmpty)
//!           v
//!        mirror ──value──> cache(fallback ttl) -> Done(fallback)
//!           │ nothing ──> not found
//!           │ error ──> Unavailable (if the remote failed too)
//! ```
//!
//! The resolver never retries the remote and never writes a cache entry for a
//! reference neither tier knows.

mod operation;
mod ttl;

pub use operation::{Domain, FallbackPolicy, Operation};
pub use ttl::{OperationTtl, TtlPolicy};

use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::caching::key_generator::DEFAULT_MAX_KEY_LENGTH;
use crate::caching::{CacheKey, CacheKeyBuilder, ContentCache};
use crate::mirror::MirrorError;
use crate::remote::RemoteError;

/// Tier that produced a resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Remote,
    Fallback,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Remote => "remote",
            Source::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value together with the tier that served it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: Source,
}

impl<T> Resolved<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        Resolved {
            value: f(self.value),
            source: self.source,
        }
    }
}

/// Failure of the whole read path
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Neither the remote nor the mirror could answer
    #[error("{operation} is temporarily unavailable (remote: {remote}; mirror: {mirror})")]
    Unavailable {
        operation: Operation,
        remote: RemoteError,
        mirror: MirrorError,
    },
}

/// Outcome of a resolution: `Ok(None)` means nothing exists at the reference
pub type ResolveResult<T> = Result<Option<Resolved<T>>, ResolveError>;

/// Read-through orchestration over an injected cache handle
#[derive(Debug, Clone)]
pub struct ReadThrough {
    cache: ContentCache,
    ttl: TtlPolicy,
    max_key_length: usize,
}

impl ReadThrough {
    pub fn new(cache: ContentCache, ttl: TtlPolicy) -> Self {
        Self {
            cache,
            ttl,
            max_key_length: DEFAULT_MAX_KEY_LENGTH,
        }
    }

    pub fn with_max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = max_key_length;
        self
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    /// Start a cache key for `operation` with the configured length bound
    pub fn key(&self, operation: Operation) -> CacheKeyBuilder {
        CacheKey::builder(operation).with_max_length(self.max_key_length)
    }

    /// Resolve one operation
    ///
    /// `remote` is awaited only on a cache miss. `mirror` is invoked only when
    /// the remote failed, or answered empty for a [`FallbackPolicy::MirrorOnEmpty`]
    /// operation; it must return the value already transformed into the
    /// remote's shape.
    pub async fn resolve<T, R, M, MF>(
        &self,
        operation: Operation,
        key: &CacheKey,
        remote: R,
        mirror: M,
    ) -> ResolveResult<T>
    where
        T: Serialize + DeserializeOwned,
        R: Future<Output = Result<Option<T>, RemoteError>>,
        M: FnOnce() -> MF,
        MF: Future<Output = Result<Option<T>, MirrorError>>,
    {
        let started = Instant::now();

        if let Some(value) = self.cache.get_json::<T>(key.as_str()).await {
            return Ok(Some(self.done(operation, key, value, Source::Cache, started)));
        }

        let remote_error = match remote.await {
            Ok(Some(value)) => {
                self.cache
                    .set_json(key.as_str(), &value, Some(self.ttl.remote(operation)))
                    .await;
                return Ok(Some(self.done(operation, key, value, Source::Remote, started)));
            }
            Ok(None) => match operation.fallback_policy() {
                FallbackPolicy::RemoteAuthoritative => {
                    debug!(operation = %operation, key = %key, "Remote reports not found");
                    return Ok(None);
                }
                FallbackPolicy::MirrorOnEmpty => None,
            },
            Err(e) => {
                warn!(
                    operation = %operation,
                    key = %key,
                    error = %e,
                    "Remote provider failed, falling back to local mirror"
                );
                counter!("content_remote_failures_total", "operation" => operation.name())
                    .increment(1);
                Some(e)
            }
        };

        match mirror().await {
            Ok(Some(value)) => {
                self.cache
                    .set_json(key.as_str(), &value, Some(self.ttl.fallback(operation)))
                    .await;
                Ok(Some(self.done(operation, key, value, Source::Fallback, started)))
            }
            Ok(None) => {
                debug!(operation = %operation, key = %key, "No tier holds the requested content");
                Ok(None)
            }
            Err(mirror_error) => match remote_error {
                Some(remote) => {
                    warn!(
                        operation = %operation,
                        key = %key,
                        remote_error = %remote,
                        mirror_error = %mirror_error,
                        "Both remote and mirror failed"
                    );
                    Err(ResolveError::Unavailable {
                        operation,
                        remote,
                        mirror: mirror_error,
                    })
                }
                None => {
                    // The remote already answered authoritatively
                    warn!(
                        operation = %operation,
                        key = %key,
                        error = %mirror_error,
                        "Mirror unavailable after empty remote answer"
                    );
                    Ok(None)
                }
            },
        }
    }

    fn done<T>(
        &self,
        operation: Operation,
        key: &CacheKey,
        value: T,
        source: Source,
        started: Instant,
    ) -> Resolved<T> {
        counter!(
            "content_resolutions_total",
            "operation" => operation.name(),
            "source" => source.as_str()
        )
        .increment(1);

        match source {
            Source::Fallback => info!(
                operation = %operation,
                key = %key,
                source = %source,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Served from local mirror"
            ),
            _ => debug!(
                operation = %operation,
                key = %key,
                source = %source,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Resolved"
            ),
        }

        Resolved { value, source }
    }
}
