//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::cache::MAX_ID_LENGTH;
use crate::codec::{Strategy, TabularResult};

/// Column a created record's rows go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Encoded blob
    #[default]
    Blob,
    /// Structured JSON value
    Json,
}

/// Request body for creating a cache record (POST /caches)
///
/// # Fields
/// - `id`: Unique record key
/// - `name`: Descriptive label (defaults to empty)
/// - `expiry_date`: Advisory expiry; derived from `ttl` when omitted
/// - `ttl`: Seconds until expiry (uses the configured default if not specified)
/// - `rows`: The tabular result to cache
/// - `storage`: `blob` (default) or `json`
/// - `encoding`: Blob strategy such as `json+zlib` (uses the configured default)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCacheRequest {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ttl: Option<u64>,
    pub rows: TabularResult,
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default)]
    pub encoding: Option<Strategy>,
}

impl CreateCacheRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.id.is_empty() {
            return Some("Id cannot be empty".to_string());
        }
        if self.id.len() > MAX_ID_LENGTH {
            return Some(format!(
                "Id exceeds maximum length of {} characters",
                MAX_ID_LENGTH
            ));
        }
        if self.storage == StorageKind::Json && self.encoding.is_some() {
            return Some("Encoding only applies to blob storage".to_string());
        }
        None
    }
}
