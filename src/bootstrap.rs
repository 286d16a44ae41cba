//! # Bootstrap
//!
//! Builds the long-lived handles from configuration: cache store, mirror,
//! providers, resolver and services. Connections are opened lazily, so
//! building the context never blocks on Redis or MongoDB being up.

use std::sync::Arc;
use tracing::info;

use crate::api::AppState;
use crate::caching::{ContentCache, InMemoryCache, RedisCache};
use crate::core::config::{AppConfig, CacheBackend, MirrorBackend};
use crate::core::error::{ContentError, ContentResult};
use crate::hadith::{HadithMirror, HadithMirrorWriter, HadithProvider, HadithService};
use crate::mirror::memory::InMemoryMirror;
use crate::mirror::mongo::MongoMirror;
use crate::mirror::{DisabledMirror, MirrorHealth};
use crate::observability::Metrics;
use crate::quran::{QuranMirror, QuranMirrorWriter, QuranProvider, QuranService};
use crate::remote::RemoteError;
use crate::resolver::ReadThrough;
use crate::seeding::{HadithSeeder, QuranSeeder, RetryPolicy};

/// The same mirror seen through each of the interfaces that use it
#[derive(Clone)]
pub struct MirrorHandles {
    pub quran: Arc<dyn QuranMirror>,
    pub hadith: Arc<dyn HadithMirror>,
    pub health: Arc<dyn MirrorHealth>,
}

impl MirrorHandles {
    pub fn from_mirror<M>(mirror: Arc<M>) -> Self
    where
        M: QuranMirror + HadithMirror + MirrorHealth + 'static,
    {
        Self {
            quran: mirror.clone(),
            hadith: mirror.clone(),
            health: mirror,
        }
    }
}

fn provider_error(which: &str) -> impl FnOnce(RemoteError) -> ContentError + '_ {
    move |e| ContentError::config(format!("{} provider: {}", which, e))
}

/// Cache store selected by `cache.backend`
pub fn build_cache(config: &AppConfig) -> ContentResult<ContentCache> {
    let cache = match config.cache.backend {
        CacheBackend::Redis => {
            let store = RedisCache::new(&config.cache.redis)
                .map_err(|e| ContentError::config(format!("redis cache: {}", e)))?;
            ContentCache::new(Arc::new(store))
        }
        CacheBackend::Memory => ContentCache::new(InMemoryCache::spawn(&config.cache.memory)),
        CacheBackend::Disabled => ContentCache::disabled(),
    };
    info!(backend = cache.backend(), "🗄️  Cache configured");
    Ok(cache)
}

/// Mirror selected by `mirror.backend`
pub fn build_mirror(config: &AppConfig) -> MirrorHandles {
    let handles = match config.mirror.backend {
        MirrorBackend::Mongo => MirrorHandles::from_mirror(Arc::new(MongoMirror::new(&config.mirror))),
        MirrorBackend::Memory => MirrorHandles::from_mirror(Arc::new(InMemoryMirror::new())),
        MirrorBackend::Disabled => MirrorHandles::from_mirror(Arc::new(DisabledMirror)),
    };
    info!(backend = handles.health.backend(), "📚 Mirror configured");
    handles
}

/// Everything the HTTP layer needs
#[derive(Clone)]
pub struct AppContext {
    pub quran: QuranService,
    pub hadith: HadithService,
    pub cache: ContentCache,
    pub mirror: MirrorHandles,
}

impl AppContext {
    pub fn from_config(config: &AppConfig) -> ContentResult<Self> {
        let cache = build_cache(config)?;
        let mirror = build_mirror(config);
        Self::with_parts(config, cache, mirror)
    }

    /// Build services over an already constructed cache and mirror
    pub fn with_parts(
        config: &AppConfig,
        cache: ContentCache,
        mirror: MirrorHandles,
    ) -> ContentResult<Self> {
        let resolver = ReadThrough::new(cache.clone(), config.ttl.clone())
            .with_max_key_length(config.cache.max_key_length);

        let quran = QuranService::new(
            QuranProvider::new(&config.quran).map_err(provider_error("quran"))?,
            mirror.quran.clone(),
            resolver.clone(),
            config.quran.default_edition.clone(),
        );
        let hadith = HadithService::new(
            HadithProvider::new(&config.hadith).map_err(provider_error("hadith"))?,
            mirror.hadith.clone(),
            resolver,
        );

        Ok(Self {
            quran,
            hadith,
            cache,
            mirror,
        })
    }

    pub fn into_state(self, metrics: Option<Metrics>) -> AppState {
        AppState {
            quran: self.quran,
            hadith: self.hadith,
            cache: self.cache,
            mirror: self.mirror.health,
            metrics,
        }
    }
}

/// Writable mirror for the seeding job
///
/// Seeding only makes sense against a persistent store, so anything other
/// than MongoDB is rejected.
pub fn build_seeders(config: &AppConfig) -> ContentResult<(QuranSeeder, HadithSeeder)> {
    if config.mirror.backend != MirrorBackend::Mongo {
        return Err(ContentError::config(
            "seeding requires mirror.backend = mongo",
        ));
    }
    let mirror = Arc::new(MongoMirror::new(&config.mirror));
    seeders_for(config, mirror.clone(), mirror)
}

/// Seeders writing into the given mirror
pub fn seeders_for(
    config: &AppConfig,
    quran_mirror: Arc<dyn QuranMirrorWriter>,
    hadith_mirror: Arc<dyn HadithMirrorWriter>,
) -> ContentResult<(QuranSeeder, HadithSeeder)> {
    let retry = RetryPolicy::from(&config.seeding);
    let quran = QuranSeeder::new(
        QuranProvider::new(&config.quran).map_err(provider_error("quran"))?,
        quran_mirror,
        retry,
        config.seeding.quran_editions.clone(),
    );
    let hadith = HadithSeeder::new(
        HadithProvider::new(&config.hadith).map_err(provider_error("hadith"))?,
        hadith_mirror,
        retry,
        config.seeding.hadith_collections.clone(),
        config.seeding.hadith_page_size,
    );
    Ok((quran, hadith))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backends_build_without_network() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Memory;
        config.mirror.backend = MirrorBackend::Memory;

        let context = AppContext::from_config(&config).unwrap();
        assert_eq!(context.cache.backend(), "memory");
        assert_eq!(context.mirror.health.backend(), "memory");
        assert_eq!(context.quran.default_edition(), config.quran.default_edition);
    }

    #[tokio::test]
    async fn test_seeding_rejects_non_persistent_mirror() {
        let mut config = AppConfig::default();
        config.mirror.backend = MirrorBackend::Memory;
        assert!(build_seeders(&config).is_err());
    }

    #[tokio::test]
    async fn test_disabled_tiers_report_unavailable() {
        let mut config = AppConfig::default();
        config.cache.backend = CacheBackend::Disabled;
        config.mirror.backend = MirrorBackend::Disabled;

        let context = AppContext::from_config(&config).unwrap();
        assert!(!context.cache.is_available().await);
        assert!(context.mirror.health.ping().await.is_err());
    }
}
