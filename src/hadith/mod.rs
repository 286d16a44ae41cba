//! # Hadith Domain
//!
//! Collections, chapters, individual hadiths, filtered listings and text
//! search, served from HadithAPI with the local mirror as fallback.

pub mod mirror;
pub mod models;
pub mod provider;
pub mod service;
pub mod transform;

pub use mirror::{HadithMirror, HadithMirrorWriter};
pub use models::{Chapter, Hadith, HadithBook, HadithFilter, HadithPage};
pub use provider::HadithProvider;
pub use service::HadithService;
