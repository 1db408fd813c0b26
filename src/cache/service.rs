//! Cache Service Module
//!
//! Async front for a [`CacheStore`]: runs every blocking store call on the
//! blocking pool under a deadline, keeps statistics, and couples the store
//! with the codec for whole-table writes and reads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::store::validate_id;
use crate::cache::{CacheRecord, CacheStats, CacheStore, MemoryStore, Payload};
use crate::codec::{Codec, Strategy, TabularResult};
use crate::error::{CacheError, Result};

// == Public Constants ==
/// Deadline applied when the caller does not pass one
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

// == Storage Mode ==
/// Column a table is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Encoded bytes in the blob column
    Blob(Strategy),
    /// The table as a JSON value in the data column
    Structured,
}

impl Default for StorageMode {
    fn default() -> Self {
        StorageMode::Blob(Strategy::default())
    }
}

/// Backend plus the counters updated under the same lock.
struct StoreState {
    backend: Box<dyn CacheStore>,
    stats: CacheStats,
}

// == Cache Service ==
/// Clonable handle to a shared cache store.
#[derive(Clone)]
pub struct CacheService {
    state: Arc<Mutex<StoreState>>,
    timeouts: Arc<AtomicU64>,
    codec: Codec,
    timeout: Duration,
}

impl CacheService {
    // == Constructor ==
    /// Wraps `backend`, encoding with `codec` and bounding each store call by `timeout`.
    pub fn new(backend: impl CacheStore + 'static, codec: Codec, timeout: Duration) -> Self {
        Self::from_boxed(Box::new(backend), codec, timeout)
    }

    pub fn from_boxed(backend: Box<dyn CacheStore>, codec: Codec, timeout: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                backend,
                stats: CacheStats::new(),
            })),
            timeouts: Arc::new(AtomicU64::new(0)),
            codec,
            timeout,
        }
    }

    /// In-memory service with default codec and deadline.
    pub fn memory() -> Self {
        Self::new(MemoryStore::new(), Codec::default(), DEFAULT_STORE_TIMEOUT)
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // == Put ==
    /// Inserts a record under the default deadline.
    pub async fn put(&self, record: CacheRecord) -> Result<()> {
        self.put_within(record, self.timeout).await
    }

    /// Inserts a record, failing with `Timeout` if the store is slower than `deadline`.
    pub async fn put_within(&self, record: CacheRecord, deadline: Duration) -> Result<()> {
        let id = record.id.clone();
        let bytes = record.payload.stored_len();

        self.run("put", deadline, move |state| match state.backend.put(record) {
            Ok(()) => {
                state.stats.record_insert(bytes);
                Ok(())
            }
            Err(err @ CacheError::DuplicateKey(_)) => {
                state.stats.record_duplicate();
                Err(err)
            }
            Err(err) => Err(err),
        })
        .await?;

        info!("Cached record '{}' ({} bytes)", id, bytes);
        Ok(())
    }

    // == Get ==
    /// Reads a record under the default deadline.
    pub async fn get(&self, id: &str) -> Result<CacheRecord> {
        self.get_within(id, self.timeout).await
    }

    pub async fn get_within(&self, id: &str, deadline: Duration) -> Result<CacheRecord> {
        let key = id.to_string();

        let record = self
            .run("get", deadline, move |state| match state.backend.get(&key) {
                Ok(record) => {
                    state.stats.record_hit(record.payload.stored_len());
                    Ok(record)
                }
                Err(err @ CacheError::NotFound(_)) => {
                    state.stats.record_miss();
                    Err(err)
                }
                Err(err) => Err(err),
            })
            .await?;

        debug!("Read record '{}'", id);
        Ok(record)
    }

    // == Delete ==
    /// Deletes a record under the default deadline.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.delete_within(id, self.timeout).await
    }

    pub async fn delete_within(&self, id: &str, deadline: Duration) -> Result<()> {
        let key = id.to_string();

        self.run("delete", deadline, move |state| {
            state.backend.delete(&key)?;
            state.stats.record_delete();
            Ok(())
        })
        .await?;

        info!("Deleted record '{}'", id);
        Ok(())
    }

    // == Stats ==
    /// Current counters plus the number of stored records.
    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = self
            .run("stats", self.timeout, |state| {
                let mut stats = state.stats.clone();
                stats.set_total_entries(state.backend.len()?);
                Ok(stats)
            })
            .await?;
        stats.timeouts = self.timeouts.load(Ordering::Relaxed);
        Ok(stats)
    }

    pub async fn len(&self) -> Result<usize> {
        self.run("len", self.timeout, |state| state.backend.len()).await
    }

    // == Table Writes ==
    /// Encodes `table` per `mode` and stores it. Returns the stored payload size.
    pub async fn write_result(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        expiry_date: DateTime<Utc>,
        table: TabularResult,
        mode: StorageMode,
    ) -> Result<usize> {
        let (id, name) = (id.into(), name.into());
        validate_id(&id)?;

        let codec = self.codec;
        let record = tokio::task::spawn_blocking(move || -> Result<CacheRecord> {
            match mode {
                StorageMode::Blob(strategy) => {
                    let bytes = codec.encode(&table, strategy)?;
                    Ok(CacheRecord::encoded(id, name, expiry_date, bytes, strategy))
                }
                StorageMode::Structured => {
                    let value = serde_json::to_value(&table)
                        .map_err(|e| CacheError::Internal(format!("JSON encode failed: {}", e)))?;
                    Ok(CacheRecord::json(id, name, expiry_date, value))
                }
            }
        })
        .await
        .map_err(|e| CacheError::Internal(format!("encode task failed: {}", e)))??;

        let bytes = record.payload.stored_len();
        self.put(record).await?;
        Ok(bytes)
    }

    // == Table Reads ==
    /// Reads a record and decodes its payload back into a table.
    pub async fn read_result(&self, id: &str) -> Result<(CacheRecord, TabularResult)> {
        let record = self.get(id).await?;
        let codec = self.codec;

        tokio::task::spawn_blocking(move || -> Result<(CacheRecord, TabularResult)> {
            let table = decode_record(&codec, &record)?;
            Ok((record, table))
        })
        .await
        .map_err(|e| CacheError::Internal(format!("decode task failed: {}", e)))?
    }

    /// Runs `op` against the store on the blocking pool, bounded by `deadline`.
    ///
    /// A deadline breach does not cancel the store call; it still completes or
    /// fails as a whole.
    async fn run<T, F>(&self, op: &'static str, deadline: Duration, op_fn: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut StoreState) -> Result<T> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = state.blocking_lock();
            op_fn(&mut *guard)
        });

        match tokio::time::timeout(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(CacheError::Internal(format!(
                "{} task failed: {}",
                op, join_err
            ))),
            Err(_) => {
                self.timeouts.fetch_add(1, Ordering::Relaxed);
                warn!("Cache {} exceeded deadline of {}ms", op, deadline.as_millis());
                Err(CacheError::Timeout(format!(
                    "{} exceeded {}ms",
                    op,
                    deadline.as_millis()
                )))
            }
        }
    }
}

/// Decodes a record's payload with the strategy it was stored with.
pub fn decode_record(codec: &Codec, record: &CacheRecord) -> Result<TabularResult> {
    match (&record.payload, record.encoding) {
        (Payload::Json(value), _) => serde_json::from_value(value.clone()).map_err(|e| {
            CacheError::MalformedPayload(format!("stored JSON is not a table: {}", e))
        }),
        (Payload::Blob(bytes), Some(strategy)) => codec.decode(bytes, strategy),
        (Payload::Blob(_), None) => Err(CacheError::InvalidRequest(format!(
            "Record '{}' holds a blob with no known encoding",
            record.id
        ))),
    }
}
