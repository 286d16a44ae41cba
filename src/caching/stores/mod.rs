//! # Cache Stores Module
//!
//! Cache store implementations: Redis for deployments and an in-process map
//! for development and tests.

pub mod memory;
pub mod redis_store;

pub use memory::InMemoryCache;
pub use redis_store::RedisCache;

use super::CacheResult;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for cache store implementations
///
/// Stores report failures honestly; it is [`super::ContentCache`] that turns
/// them into misses.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value from the cache
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value, expiring after `ttl` when given
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Whether the store is reachable
    async fn health_check(&self) -> CacheResult<bool>;

    /// Short backend name for logs
    fn backend(&self) -> &'static str;
}
