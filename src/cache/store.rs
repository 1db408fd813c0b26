//! Cache Store Module
//!
//! Key-addressed persistence of cache records and the in-memory backend.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};

use crate::cache::{CacheRecord, MAX_ID_LENGTH};
use crate::error::{CacheError, Result};

// == Cache Store Trait ==
/// Insert-only, key-addressed record storage.
///
/// Every call is a blocking, all-or-nothing operation.
pub trait CacheStore: Send {
    /// Inserts `record`, failing with `DuplicateKey` if its id is taken.
    fn put(&mut self, record: CacheRecord) -> Result<()>;

    /// Returns the record stored under `id`, or `NotFound`.
    fn get(&mut self, id: &str) -> Result<CacheRecord>;

    /// Removes the record stored under `id`, or fails with `NotFound`.
    fn delete(&mut self, id: &str) -> Result<()>;

    /// Number of stored records.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Rejects ids the stores will not accept.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(CacheError::InvalidRequest("Id cannot be empty".to_string()));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Id exceeds maximum length of {} bytes",
            MAX_ID_LENGTH
        )));
    }
    Ok(())
}

/// Rejects expiry dates outside the four-digit years RFC 3339 can spell.
pub fn validate_expiry(expiry: &DateTime<Utc>) -> Result<()> {
    if !(1..=9999).contains(&expiry.year()) {
        return Err(CacheError::InvalidRequest(format!(
            "Expiry date {} is outside years 1 to 9999",
            expiry
        )));
    }
    Ok(())
}

/// Checks everything `put` requires of a record before it is stored.
pub fn validate_record(record: &CacheRecord) -> Result<()> {
    validate_id(&record.id)?;
    validate_expiry(&record.expiry_date)
}

// == Memory Store ==
/// HashMap-backed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, CacheRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryStore {
    fn put(&mut self, record: CacheRecord) -> Result<()> {
        validate_record(&record)?;

        match self.records.entry(record.id.clone()) {
            Entry::Occupied(_) => Err(CacheError::DuplicateKey(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    fn get(&mut self, id: &str) -> Result<CacheRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(id.to_string()))
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        if self.records.remove(id).is_some() {
            Ok(())
        } else {
            Err(CacheError::NotFound(id.to_string()))
        }
    }

    fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{expiry_after, Payload};

    fn record(id: &str, bytes: &[u8]) -> CacheRecord {
        CacheRecord::blob(id, format!("test data {}", id), Utc::now(), bytes.to_vec())
    }

    #[test]
    fn test_store_new() {
        let store = MemoryStore::new();
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = MemoryStore::new();
        let original = record("id-0", b"payload");

        store.put(original.clone()).unwrap();

        assert_eq!(store.get("id-0").unwrap(), original);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = MemoryStore::new();

        let result = store.get("nonexistent");
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_duplicate_key() {
        let mut store = MemoryStore::new();

        store.put(record("id-0", b"first")).unwrap();
        let result = store.put(record("id-0", b"second"));

        assert!(matches!(result, Err(CacheError::DuplicateKey(ref id)) if id == "id-0"));
        assert_eq!(
            store.get("id-0").unwrap().payload,
            Payload::Blob(b"first".to_vec())
        );
    }

    #[test]
    fn test_store_delete() {
        let mut store = MemoryStore::new();

        store.put(record("id-0", b"x")).unwrap();
        store.delete("id-0").unwrap();

        assert!(store.is_empty().unwrap());
        assert!(matches!(store.get("id-0"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let mut store = MemoryStore::new();

        let result = store.delete("nonexistent");
        assert!(matches!(result, Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_reinsert_after_delete() {
        let mut store = MemoryStore::new();

        store.put(record("id-0", b"a")).unwrap();
        store.delete("id-0").unwrap();
        store.put(record("id-0", b"b")).unwrap();

        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_store_far_expiry_round_trips() {
        let mut store = MemoryStore::new();
        let far = CacheRecord::blob("far", "n", expiry_after(u64::MAX), vec![1]);

        store.put(far.clone()).unwrap();
        assert_eq!(store.get("far").unwrap(), far);
    }

    #[test]
    fn test_store_rejects_unrepresentable_expiry() {
        let mut store = MemoryStore::new();
        let record = CacheRecord::blob("far", "n", DateTime::<Utc>::MAX_UTC, vec![1]);

        assert!(matches!(
            store.put(record),
            Err(CacheError::InvalidRequest(_))
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_store_id_validation() {
        let mut store = MemoryStore::new();

        assert!(matches!(
            store.put(record("", b"x")),
            Err(CacheError::InvalidRequest(_))
        ));

        let long_id = "x".repeat(MAX_ID_LENGTH + 1);
        assert!(matches!(
            store.put(record(&long_id, b"x")),
            Err(CacheError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_store_expired_records_are_kept() {
        let mut store = MemoryStore::new();
        let past = Utc::now() - chrono::Duration::hours(1);

        store
            .put(CacheRecord::blob("old", "stale", past, vec![1]))
            .unwrap();
        assert!(store.get("old").unwrap().is_past_expiry());
    }
}
