//! Blob Cache - tabular result codec and cache store
//!
//! Encodes query results as JSON or CSV, optionally zlib-compressed, and keeps
//! them in key-addressed cache records backed by memory or SQLite.

pub mod api;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheRecord, CacheService, CacheStore, Payload, StorageMode};
pub use codec::{Codec, Format, Strategy, TabularResult};
pub use config::Config;
pub use error::{CacheError, Result};
