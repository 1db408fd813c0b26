//! SQLite Store Module
//!
//! Persists cache records in a single `caches` table through rusqlite.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::cache::store::validate_record;
use crate::cache::{CacheRecord, CacheStore, Payload};
use crate::codec::Strategy;
use crate::error::{CacheError, Result};

/// Schema for the cache table. Exactly one of `blob` / `data` is set per row.
pub const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS caches (
    id          TEXT PRIMARY KEY NOT NULL,
    name        TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    blob        BLOB,
    data        TEXT,
    encoding    TEXT,
    CHECK ((blob IS NULL) <> (data IS NULL))
);
"#;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw column values of one `caches` row.
struct StoredRow {
    name: String,
    expiry_date: String,
    blob: Option<Vec<u8>>,
    data: Option<String>,
    encoding: Option<String>,
}

// == SQLite Store ==
/// SQLite-backed cache store.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a file-backed store, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // WAL only applies to file-backed databases
        let _ = conn.execute_batch("PRAGMA journal_mode = WAL;");
        debug!("Opened SQLite cache store at {}", path.display());
        Self::from_connection(conn)
    }

    /// Create an in-memory store.
    pub fn memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Create a store from an existing connection.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(CACHE_SCHEMA)?;
        Ok(Self { conn })
    }
}

impl CacheStore for SqliteStore {
    fn put(&mut self, record: CacheRecord) -> Result<()> {
        validate_record(&record)?;

        let (blob, data) = match &record.payload {
            Payload::Blob(bytes) => (Some(bytes.as_slice()), None),
            Payload::Json(value) => (None, Some(value.to_string())),
        };

        let inserted = self.conn.execute(
            "INSERT INTO caches (id, name, expiry_date, blob, data, encoding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.name,
                record
                    .expiry_date
                    .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                blob,
                data,
                record.encoding.map(|s| s.to_string()),
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(CacheError::DuplicateKey(record.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get(&mut self, id: &str) -> Result<CacheRecord> {
        let stored = self
            .conn
            .query_row(
                "SELECT name, expiry_date, blob, data, encoding FROM caches WHERE id = ?1",
                params![id],
                |row| {
                    Ok(StoredRow {
                        name: row.get(0)?,
                        expiry_date: row.get(1)?,
                        blob: row.get(2)?,
                        data: row.get(3)?,
                        encoding: row.get(4)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| CacheError::NotFound(id.to_string()))?;

        into_record(id, stored)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM caches WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(CacheError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM caches", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn into_record(id: &str, row: StoredRow) -> Result<CacheRecord> {
    let expiry_date = DateTime::parse_from_rfc3339(&row.expiry_date)
        .map_err(|e| {
            CacheError::MalformedPayload(format!("bad expiry_date for '{}': {}", id, e))
        })?
        .with_timezone(&Utc);

    let payload = match (row.blob, row.data) {
        (Some(bytes), None) => Payload::Blob(bytes),
        (None, Some(text)) => Payload::Json(serde_json::from_str(&text).map_err(|e| {
            CacheError::MalformedPayload(format!("bad JSON data for '{}': {}", id, e))
        })?),
        _ => {
            return Err(CacheError::MalformedPayload(format!(
                "row '{}' must hold exactly one of blob or data",
                id
            )))
        }
    };

    let encoding = row
        .encoding
        .map(|text| text.parse::<Strategy>())
        .transpose()
        .map_err(|e| CacheError::MalformedPayload(format!("bad encoding for '{}': {}", id, e)))?;

    Ok(CacheRecord {
        id: id.to_string(),
        name: row.name,
        expiry_date,
        payload,
        encoding,
    })
}
