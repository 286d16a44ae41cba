//! # In-Memory Cache Store
//!
//! Process-local cache used for development and tests. Entries expire on read
//! and are swept periodically; when the entry bound is reached the entries
//! closest to expiry are dropped first.

use super::CacheStore;
use crate::caching::CacheResult;
use crate::core::config::MemorySettings;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map_or(false, |at| now >= at)
    }
}

/// In-memory cache implementation
pub struct InMemoryCache {
    entries: DashMap<String, Entry>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InMemoryCache {
    /// Create a cache without a background sweeper
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Create a shared cache and start sweeping expired entries
    ///
    /// The sweeper stops on its own once the last handle is dropped.
    pub fn spawn(settings: &MemorySettings) -> Arc<Self> {
        let cache = Arc::new(Self::new(settings.max_entries));
        let weak: Weak<Self> = Arc::downgrade(&cache);
        let period = settings.cleanup_interval;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(cache) => {
                        cache.cleanup_expired();
                    }
                    None => break,
                }
            }
        });

        cache
    }

    /// Remove every expired entry, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!("Cleaned up {} expired cache entries", removed);
        }
        removed
    }

    /// Remaining lifetime of a live entry; `None` for missing or non-expiring entries
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let entry = self.entries.get(key)?;
        let at = entry.expires_at?;
        at.checked_duration_since(Instant::now())
    }

    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .map_or(false, |entry| !entry.is_expired(now))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    fn evict_if_full(&self) {
        if self.entries.len() < self.max_entries {
            return;
        }

        self.cleanup_expired();
        if self.entries.len() < self.max_entries {
            return;
        }

        // Drop the entry closest to expiry; non-expiring entries go last
        let victim = self
            .entries
            .iter()
            .min_by_key(|item| item.value().expires_at.map_or((1, None), |at| (0, Some(at))))
            .map(|item| item.key().clone());

        if let Some(key) = victim {
            self.entries.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();
        // The shard guard must be released before removing an expired entry
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.value.clone()));

        let value = match lookup {
            Some(Some(value)) => Some(value),
            Some(None) => {
                self.entries.remove_if(key, |_, entry| entry.is_expired(now));
                None
            }
            None => None,
        };

        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        if !self.entries.contains_key(key) {
            self.evict_if_full();
        }

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
