//! # Configuration Module
//!
//! Configuration for the content gateway: HTTP server, cache, local mirror,
//! the two remote content providers, TTL policy, seeding and logging.
//!
//! ## Key Features
//! - YAML configuration parsing with serde (durations via `humantime-serde`)
//! - Environment variable overrides (`CONTENT_API_<SECTION>_<FIELD>`)
//! - Validation that reports every problem at once

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::core::error::{ContentError, ContentResult};
use crate::resolver::TtlPolicy;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CONTENT_API_CONFIG_PATH";

/// Configuration file used when [`CONFIG_PATH_ENV`] is not set
pub const DEFAULT_CONFIG_PATH: &str = "config/content-api.yaml";

/// Complete configuration for the content gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Cache store settings
    pub cache: CacheConfig,

    /// Local mirror settings
    pub mirror: MirrorConfig,

    /// Quran remote provider (AlQuran Cloud)
    pub quran: QuranApiConfig,

    /// Hadith remote provider (HadithAPI)
    pub hadith: HadithApiConfig,

    /// Per-operation cache TTL overrides
    pub ttl: TtlPolicy,

    /// Offline seeding job settings
    pub seeding: SeedingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file, apply environment overrides and validate
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> ContentResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ContentError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: AppConfig = serde_yaml::from_str(&content)
            .map_err(|e| ContentError::config(format!("Failed to parse config: {}", e)))?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the file named by `CONTENT_API_CONFIG_PATH`
    ///
    /// A missing default file is not an error: built-in defaults plus
    /// environment overrides are used instead. An explicitly configured path
    /// must exist.
    pub async fn load() -> ContentResult<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from_file(path).await,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::load_from_file(DEFAULT_CONFIG_PATH).await
            }
            Err(_) => {
                let mut config = AppConfig::default();
                config.apply_env_overrides()?;
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> ContentResult<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` to resolve variable names
    ///
    /// Variables follow the pattern `CONTENT_API_<SECTION>_<FIELD>`, for
    /// example `CONTENT_API_SERVER_PORT=8080`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> ContentResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("CONTENT_API_SERVER_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(port) = lookup("CONTENT_API_SERVER_PORT") {
            self.server.port = parse_var("CONTENT_API_SERVER_PORT", &port)?;
        }

        if let Some(host) = lookup("CONTENT_API_REDIS_HOST") {
            self.cache.redis.host = host;
        }
        if let Some(port) = lookup("CONTENT_API_REDIS_PORT") {
            self.cache.redis.port = parse_var("CONTENT_API_REDIS_PORT", &port)?;
        }
        if let Some(password) = lookup("CONTENT_API_REDIS_PASSWORD") {
            self.cache.redis.password = Some(password);
        }
        if let Some(backend) = lookup("CONTENT_API_CACHE_BACKEND") {
            self.cache.backend = match backend.to_ascii_lowercase().as_str() {
                "redis" => CacheBackend::Redis,
                "memory" => CacheBackend::Memory,
                "disabled" => CacheBackend::Disabled,
                other => {
                    return Err(ContentError::config(format!(
                        "Invalid CONTENT_API_CACHE_BACKEND: {}",
                        other
                    )))
                }
            };
        }

        if let Some(uri) = lookup("CONTENT_API_MONGO_URI") {
            self.mirror.uri = uri;
        }
        if let Some(database) = lookup("CONTENT_API_MONGO_DATABASE") {
            self.mirror.database = database;
        }
        if let Some(backend) = lookup("CONTENT_API_MIRROR_BACKEND") {
            self.mirror.backend = match backend.to_ascii_lowercase().as_str() {
                "mongo" | "mongodb" => MirrorBackend::Mongo,
                "memory" => MirrorBackend::Memory,
                "disabled" => MirrorBackend::Disabled,
                other => {
                    return Err(ContentError::config(format!(
                        "Invalid CONTENT_API_MIRROR_BACKEND: {}",
                        other
                    )))
                }
            };
        }

        if let Some(url) = lookup("CONTENT_API_QURAN_BASE_URL") {
            self.quran.base_url = url;
        }
        if let Some(timeout) = lookup("CONTENT_API_QURAN_TIMEOUT") {
            self.quran.timeout = parse_duration_var("CONTENT_API_QURAN_TIMEOUT", &timeout)?;
        }
        if let Some(url) = lookup("CONTENT_API_HADITH_BASE_URL") {
            self.hadith.base_url = url;
        }
        if let Some(key) = lookup("CONTENT_API_HADITH_API_KEY") {
            self.hadith.api_key = Some(key);
        }
        if let Some(timeout) = lookup("CONTENT_API_HADITH_TIMEOUT") {
            self.hadith.timeout = parse_duration_var("CONTENT_API_HADITH_TIMEOUT", &timeout)?;
        }

        if let Some(level) = lookup("CONTENT_API_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CONTENT_API_LOG_FORMAT") {
            self.logging.format = match format.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                other => {
                    return Err(ContentError::config(format!(
                        "Invalid CONTENT_API_LOG_FORMAT: {}",
                        other
                    )))
                }
            };
        }

        Ok(())
    }

    /// Validate the configuration, collecting every problem found
    pub fn validate(&self) -> ContentResult<()> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port must be greater than 0".to_string());
        }
        if self.server.bind_address.is_empty() {
            errors.push("server.bind_address cannot be empty".to_string());
        }
        if self.server.request_timeout.is_zero() {
            errors.push("server.request_timeout must be greater than 0".to_string());
        }

        if self.cache.backend == CacheBackend::Redis {
            if self.cache.redis.host.is_empty() {
                errors.push("cache.redis.host cannot be empty".to_string());
            }
            if self.cache.redis.connect_timeout.is_zero() {
                errors.push("cache.redis.connect_timeout must be greater than 0".to_string());
            }
            if self.cache.redis.operation_timeout.is_zero() {
                errors.push("cache.redis.operation_timeout must be greater than 0".to_string());
            }
        }
        if self.cache.max_key_length < 32 {
            errors.push("cache.max_key_length must be at least 32".to_string());
        }

        if self.mirror.backend == MirrorBackend::Mongo {
            if !self.mirror.uri.starts_with("mongodb://")
                && !self.mirror.uri.starts_with("mongodb+srv://")
            {
                errors.push(format!("mirror.uri is not a MongoDB connection string: {}", self.mirror.uri));
            }
            if self.mirror.database.is_empty() {
                errors.push("mirror.database cannot be empty".to_string());
            }
        }

        for (name, base_url, timeout) in [
            ("quran", &self.quran.base_url, self.quran.timeout),
            ("hadith", &self.hadith.base_url, self.hadith.timeout),
        ] {
            if let Err(e) = Url::parse(base_url) {
                errors.push(format!("{}.base_url is invalid: {}", name, e));
            }
            if timeout.is_zero() {
                errors.push(format!("{}.timeout must be greater than 0", name));
            }
        }
        if self.quran.default_edition.is_empty() {
            errors.push("quran.default_edition cannot be empty".to_string());
        }
        if self.hadith.page_size == 0 || self.hadith.page_size > 100 {
            errors.push("hadith.page_size must be between 1 and 100".to_string());
        }

        if self.seeding.max_attempts == 0 {
            errors.push("seeding.max_attempts must be at least 1".to_string());
        }
        if self.seeding.quran_editions.is_empty() {
            errors.push("seeding.quran_editions cannot be empty".to_string());
        }
        if self.seeding.hadith_page_size == 0 {
            errors.push("seeding.hadith_page_size must be greater than 0".to_string());
        }

        errors.extend(self.ttl.validate());

        if !errors.is_empty() {
            return Err(ContentError::config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> ContentResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ContentError::config(format!("Invalid {}: {}", name, e)))
}

fn parse_duration_var(name: &str, value: &str) -> ContentResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| ContentError::config(format!("Invalid {}: {}", name, e)))
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    pub bind_address: String,

    /// HTTP port
    pub port: u16,

    /// Upper bound for handling a single request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Which cache store backs the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
    Disabled,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    pub redis: RedisSettings,

    pub memory: MemorySettings,

    /// Keys longer than this are replaced by their SHA-256 digest
    pub max_key_length: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis: RedisSettings::default(),
            memory: MemorySettings::default(),
            max_key_length: 250,
        }
    }
}

/// Redis connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u8,

    /// Prefix prepended to every key
    pub key_prefix: String,

    /// How long a request waits for the shared connection to come up
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Upper bound for a single GET/SET
    #[serde(with = "humantime_serde")]
    pub operation_timeout: Duration,

    /// After a failed connect, requests skip the cache this long before the
    /// next attempt; zero retries on every request
    #[serde(with = "humantime_serde")]
    pub reconnect_backoff: Duration,
}

impl RedisSettings {
    /// Connection URL assembled from host, port, credential and database
    pub fn url(&self) -> String {
        match &self.password {
            Some(password) if !password.is_empty() => format!(
                "redis://:{}@{}:{}/{}",
                urlencode(password),
                self.host,
                self.port,
                self.db
            ),
            _ => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
            key_prefix: "content:".to_string(),
            connect_timeout: Duration::from_secs(2),
            operation_timeout: Duration::from_millis(500),
            reconnect_backoff: Duration::from_secs(5),
        }
    }
}

/// In-process cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub max_entries: usize,

    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

/// Which document store backs the local mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MirrorBackend {
    Mongo,
    Memory,
    Disabled,
}

/// Local mirror configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub backend: MirrorBackend,

    /// MongoDB connection string
    pub uri: String,

    pub database: String,

    /// How long a request waits for the shared connection to come up
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            backend: MirrorBackend::Mongo,
            uri: "mongodb://127.0.0.1:27017".to_string(),
            database: "islamic_content".to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// AlQuran Cloud API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuranApiConfig {
    pub base_url: String,

    /// Kept short so that falling back to the mirror still feels responsive
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Edition used when a request does not name one
    pub default_edition: String,
}

impl Default for QuranApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.alquran.cloud/v1".to_string(),
            timeout: Duration::from_secs(5),
            default_edition: "quran-uthmani".to_string(),
        }
    }
}

/// HadithAPI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HadithApiConfig {
    pub base_url: String,

    /// Sent as the `apiKey` query parameter
    pub api_key: Option<String>,

    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Default page size for hadith listings
    pub page_size: u32,
}

impl Default for HadithApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hadithapi.com/api".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
            page_size: 25,
        }
    }
}

/// Offline seeding job settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
    /// Attempts per remote call before the job aborts
    pub max_attempts: u32,

    /// Fixed delay between attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,

    /// Quran editions copied into the mirror
    pub quran_editions: Vec<String>,

    /// Hadith collections copied into the mirror (empty means all)
    pub hadith_collections: Vec<String>,

    /// Page size used while paging through hadiths
    pub hadith_page_size: u32,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            quran_editions: vec!["quran-uthmani".to_string(), "en.asad".to_string()],
            hadith_collections: Vec::new(),
            hadith_page_size: 100,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "islamic_content_gateway=info,tower_http=info".to_string(),
            format: LogFormat::Json,
        }
    }
}
