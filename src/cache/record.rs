//! Cache Record Module
//!
//! Defines a persisted cache row: key, label, advisory expiry and payload.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::codec::Strategy;

// == Payload ==
/// Stored content of a record. The two storage modes are mutually exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Opaque bytes (blob column)
    Blob(Vec<u8>),
    /// Structured JSON value (JSON column)
    Json(Value),
}

impl Payload {
    /// Size of the payload as stored, in bytes.
    pub fn stored_len(&self) -> usize {
        match self {
            Payload::Blob(bytes) => bytes.len(),
            Payload::Json(value) => value.to_string().len(),
        }
    }
}

// == Cache Record ==
/// A single cache row.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    /// Unique key
    pub id: String,
    /// Descriptive label
    pub name: String,
    /// Advisory expiry; never consulted by the stores
    pub expiry_date: DateTime<Utc>,
    /// Stored content
    pub payload: Payload,
    /// Strategy a blob payload was encoded with, if known
    pub encoding: Option<Strategy>,
}

impl CacheRecord {
    // == Constructors ==
    /// Creates a record holding an opaque blob with no known encoding.
    pub fn blob(
        id: impl Into<String>,
        name: impl Into<String>,
        expiry_date: DateTime<Utc>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expiry_date,
            payload: Payload::Blob(bytes),
            encoding: None,
        }
    }

    /// Creates a record holding a blob produced with `strategy`.
    pub fn encoded(
        id: impl Into<String>,
        name: impl Into<String>,
        expiry_date: DateTime<Utc>,
        bytes: Vec<u8>,
        strategy: Strategy,
    ) -> Self {
        Self {
            encoding: Some(strategy),
            ..Self::blob(id, name, expiry_date, bytes)
        }
    }

    /// Creates a record holding a structured JSON value.
    pub fn json(
        id: impl Into<String>,
        name: impl Into<String>,
        expiry_date: DateTime<Utc>,
        value: Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            expiry_date,
            payload: Payload::Json(value),
            encoding: None,
        }
    }

    /// Whether the advisory expiry has passed.
    ///
    /// Informational only; stores never evict on it.
    pub fn is_past_expiry(&self) -> bool {
        Utc::now() >= self.expiry_date
    }
}

/// Unix timestamp of 9999-12-31T23:59:59Z, the last second an RFC 3339
/// timestamp can spell.
pub const MAX_EXPIRY_TIMESTAMP: i64 = 253_402_300_799;

/// Expiry timestamp `ttl_seconds` from now, capped at year 9999.
pub fn expiry_after(ttl_seconds: u64) -> DateTime<Utc> {
    let now = Utc::now();
    let headroom = MAX_EXPIRY_TIMESTAMP.saturating_sub(now.timestamp()).max(0);
    let ttl = i64::try_from(ttl_seconds).unwrap_or(i64::MAX).min(headroom);
    Duration::try_seconds(ttl)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(now)
}
