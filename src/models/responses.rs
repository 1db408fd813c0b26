//! Response DTOs for the cache API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheRecord, CacheStats};
use crate::codec::TabularResult;

/// Response body for creating a record (POST /caches)
#[derive(Debug, Clone, Serialize)]
pub struct CreateCacheResponse {
    /// Success message
    pub message: String,
    /// The id that was stored
    pub id: String,
    /// Blob strategy, or `null` for structured storage
    pub encoding: Option<String>,
    /// Stored payload size in bytes
    pub payload_bytes: usize,
}

impl CreateCacheResponse {
    pub fn new(id: impl Into<String>, encoding: Option<String>, payload_bytes: usize) -> Self {
        let id = id.into();
        Self {
            message: format!("Cache '{}' created successfully", id),
            id,
            encoding,
            payload_bytes,
        }
    }
}

/// Response body for reading a record (GET /caches/:id)
#[derive(Debug, Clone, Serialize)]
pub struct GetCacheResponse {
    pub id: String,
    pub name: String,
    /// Advisory expiry in ISO 8601 format
    pub expiry_date: DateTime<Utc>,
    pub encoding: Option<String>,
    /// Decoded rows
    pub rows: TabularResult,
}

impl GetCacheResponse {
    /// Builds the response from a stored record and its decoded rows
    pub fn new(record: CacheRecord, rows: TabularResult) -> Self {
        Self {
            id: record.id,
            name: record.name,
            expiry_date: record.expiry_date,
            encoding: record.encoding.map(|s| s.to_string()),
            rows,
        }
    }
}

/// Response body for the DELETE operation (DELETE /caches/:id)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The id that was deleted
    pub id: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            message: format!("Cache '{}' deleted successfully", id),
            id,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache statistics
    pub fn new(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self { stats, hit_rate }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
