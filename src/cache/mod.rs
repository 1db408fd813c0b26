//! Cache Module
//!
//! Key-addressed storage of cache records: the store trait, its in-memory and
//! SQLite backends, and the async service that fronts them.

mod record;
mod service;
mod sqlite;
mod stats;
mod store;


// Re-export public types
pub use record::{expiry_after, CacheRecord, Payload, MAX_EXPIRY_TIMESTAMP};
pub use service::{decode_record, CacheService, StorageMode, DEFAULT_STORE_TIMEOUT};
pub use sqlite::{SqliteStore, CACHE_SCHEMA};
pub use stats::CacheStats;
pub use store::{validate_expiry, validate_id, validate_record, CacheStore, MemoryStore};

// == Public Constants ==
/// Maximum allowed id length in bytes
pub const MAX_ID_LENGTH: usize = 256;
