//! # Islamic Content Gateway - Core Library Crate
//!
//! A read-through content service for Quran and Hadith text. Every read goes
//! through the same three tiers:
//!
//! 1. **Cache** (Redis, or in-process for development): answers immediately on a hit.
//! 2. **Remote provider** (AlQuran Cloud, HadithAPI): the source of truth.
//! 3. **Local mirror** (MongoDB): a seeded copy consulted when the provider
//!    fails, times out, or (for listings and searches) comes back empty.
//!
//! Values from the remote are cached with the long per-operation TTL, values
//! from the mirror with a shorter one so the service converges back to the
//! remote once it recovers. A failing cache never fails a request.
//!
//! ## Layout
//! - `core`: errors, configuration, lazily opened connections
//! - `caching`: cache stores, the fail-soft cache wrapper, key building
//! - `remote`: HTTP client shared by the providers
//! - `mirror`: mirror backends (MongoDB, in-memory, disabled)
//! - `resolver`: the read-through state machine and TTL policy
//! - `quran`, `hadith`: models, providers, mirror records, transforms, services
//! - `seeding`: the offline job that fills the mirror
//! - `api`: the axum HTTP surface
//! - `observability`: logging and metrics setup

/// Error types, configuration and connection handles shared by every layer
pub mod core;

/// Cache store abstraction and key generation
pub mod caching;

/// HTTP client used by the remote content providers
pub mod remote;

/// Local mirror backends
pub mod mirror;

/// Cache → remote → mirror resolution
pub mod resolver;

/// Quran content domain
pub mod quran;

/// Hadith content domain
pub mod hadith;

/// Mirror seeding job
pub mod seeding;

/// HTTP routes and server
pub mod api;

/// Logging and metrics
pub mod observability;

/// Wiring from configuration to services
pub mod bootstrap;

pub use bootstrap::AppContext;
pub use core::config::AppConfig;
pub use core::error::{ContentError, ContentResult};
pub use resolver::{ReadThrough, Resolved, Source};
