//! # Caching Module
//!
//! Best-effort cache in front of the content providers.
//!
//! ## Architecture
//! 1. **Stores** (`stores`): Redis and in-memory implementations of
//!    [`CacheStore`]. They report errors like any other I/O component.
//! 2. **Key generation** (`key_generator`): deterministic keys built from an
//!    operation and its parameters.
//! 3. **[`ContentCache`]**: the wrapper the resolver talks to. It never fails:
//!    an unreachable or misbehaving store is logged and behaves like a cache
//!    that simply has nothing in it.

pub mod key_generator;
pub mod stores;

pub use key_generator::{CacheKey, CacheKeyBuilder};
pub use stores::{CacheStore, InMemoryCache, RedisCache};

use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::connection::ConnectError;

/// Cache operation result
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-specific error types
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache store error: {message}")]
    Store { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Cache operation timeout")]
    Timeout,
}

/// Never-failing cache facade used by the resolver
#[derive(Clone)]
pub struct ContentCache {
    store: Option<Arc<dyn CacheStore>>,
}

impl ContentCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Look up a raw value; any store failure is logged and reported as a miss
    pub async fn get(&self, key: &str) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(backend = store.backend(), key, error = %e, "Cache read failed, treating as miss");
                counter!("content_cache_errors_total", "op" => "get").increment(1);
                None
            }
        }
    }

    /// Store a raw value; returns `false` when the write did not happen
    pub async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> bool {
        let Some(store) = self.store.as_ref() else {
            return false;
        };
        match store.set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(backend = store.backend(), key, error = %e, "Cache write failed, continuing without it");
                counter!("content_cache_errors_total", "op" => "set").increment(1);
                false
            }
        }
    }

    /// Look up and decode a JSON value; undecodable entries count as misses
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Encode and store a JSON value
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw, ttl).await,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode value for cache");
                false
            }
        }
    }

    pub fn backend(&self) -> &'static str {
        self.store.as_ref().map_or("disabled", |s| s.backend())
    }

    /// Whether the backing store answers; a disabled cache reports `false`
    pub async fn is_available(&self) -> bool {
        match &self.store {
            Some(store) => match store.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    debug!(backend = store.backend(), error = %e, "Cache health check failed");
                    false
                }
            },
            None => false,
        }
    }
}

impl std::fmt::Debug for ContentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCache")
            .field("backend", &self.store.as_ref().map(|s| s.backend()))
            .finish()
    }
}
