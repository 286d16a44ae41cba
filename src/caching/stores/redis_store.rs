//! # Redis Cache Store
//!
//! Redis-backed cache. The connection is opened lazily on first use and shared
//! through a [`LazyConnection`]; every command is bounded by the configured
//! operation timeout. While Redis is unreachable, a failed connect is reused
//! for `reconnect_backoff` so requests fall through to the remote without
//! waiting on a new attempt.

use super::CacheStore;
use crate::caching::{CacheError, CacheResult};
use crate::core::config::RedisSettings;
use crate::core::connection::LazyConnection;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Redis cache implementation
pub struct RedisCache {
    client: Client,
    connection: LazyConnection<ConnectionManager>,
    key_prefix: String,
    operation_timeout: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RedisCache {
    /// Create a Redis cache; no connection is made until the first command
    pub fn new(settings: &RedisSettings) -> CacheResult<Self> {
        let client = Client::open(settings.url())?;

        Ok(Self {
            client,
            connection: LazyConnection::new("redis", settings.connect_timeout)
                .with_retry_after(settings.reconnect_backoff),
            key_prefix: settings.key_prefix.clone(),
            operation_timeout: settings.operation_timeout,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Whether the shared connection has been established
    pub fn is_connected(&self) -> bool {
        self.connection.is_ready()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the full cache key with prefix
    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Clone of the shared connection manager, connecting first if needed
    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let client = self.client.clone();
        let manager = self
            .connection
            .get_or_connect(|| async move { ConnectionManager::new(client).await })
            .await?;
        Ok(manager.clone())
    }

    async fn bounded<T, F>(&self, command: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, command).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CacheError::Timeout),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let full_key = self.full_key(key);
        let mut conn = self.connection().await?;

        let value: Option<String> = self.bounded(conn.get(&full_key)).await?;

        match &value {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Redis cache hit for key: {}", key);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Redis cache miss for key: {}", key);
            }
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let full_key = self.full_key(key);
        let mut conn = self.connection().await?;

        match ttl {
            // SETEX rejects a zero expiry
            Some(ttl) => {
                let seconds = ttl.as_secs().max(1);
                self.bounded(conn.set_ex::<_, _, ()>(&full_key, value, seconds))
                    .await?;
            }
            None => {
                self.bounded(conn.set::<_, _, ()>(&full_key, value)).await?;
            }
        }

        debug!("Set Redis cache key: {} with TTL: {:?}", key, ttl);
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        let pong: String = self
            .bounded(redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(pong == "PONG")
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
