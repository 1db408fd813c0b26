//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use crate::cache::{expiry_after, CacheService, MemoryStore, SqliteStore, StorageMode};
use crate::codec::{Codec, Strategy};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    CreateCacheRequest, CreateCacheResponse, DeleteResponse, GetCacheResponse, HealthResponse,
    StatsResponse, StorageKind,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache service
    pub cache: CacheService,
    /// Strategy for blob writes that do not name one
    pub default_encoding: Strategy,
    /// Expiry offset in seconds for records created without one
    pub default_ttl: u64,
}

impl AppState {
    /// Creates a new AppState around the given service with default settings.
    pub fn new(cache: CacheService) -> Self {
        let defaults = Config::default();
        Self {
            cache,
            default_encoding: defaults.default_encoding,
            default_ttl: defaults.default_ttl,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the SQLite store when a database path is configured, otherwise
    /// keeps records in memory.
    pub fn from_config(config: &Config) -> Result<Self> {
        let codec = Codec::new(config.compression_level);
        let cache = match &config.database_path {
            Some(path) => CacheService::new(SqliteStore::open(path)?, codec, config.store_timeout()),
            None => CacheService::new(MemoryStore::new(), codec, config.store_timeout()),
        };

        Ok(Self {
            cache,
            default_encoding: config.default_encoding,
            default_ttl: config.default_ttl,
        })
    }
}

/// Handler for POST /caches
///
/// Encodes the rows with the requested strategy and stores them. Bodies that
/// fail to deserialize are reported as `InvalidRequest`.
pub async fn create_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateCacheRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateCacheResponse>)> {
    let Json(req) = body?;

    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let expiry_date = req
        .expiry_date
        .unwrap_or_else(|| expiry_after(req.ttl.unwrap_or(state.default_ttl)));
    let mode = match req.storage {
        StorageKind::Blob => StorageMode::Blob(req.encoding.unwrap_or(state.default_encoding)),
        StorageKind::Json => StorageMode::Structured,
    };

    let payload_bytes = state
        .cache
        .write_result(req.id.clone(), req.name, expiry_date, req.rows, mode)
        .await?;

    let encoding = match mode {
        StorageMode::Blob(strategy) => Some(strategy.to_string()),
        StorageMode::Structured => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateCacheResponse::new(req.id, encoding, payload_bytes)),
    ))
}

/// Handler for GET /caches/:id
///
/// Reads a record and returns its decoded rows.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GetCacheResponse>> {
    let (record, rows) = state.cache.read_result(&id).await?;

    Ok(Json(GetCacheResponse::new(record, rows)))
}

/// Handler for DELETE /caches/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&id).await?;

    Ok(Json(DeleteResponse::new(id)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.cache.stats().await?;

    Ok(Json(StatsResponse::new(stats)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
