//! Storage Backend Module
//!
//! The synchronous string key-value medium the TTL store persists into, and
//! an in-memory implementation of it.

use std::collections::HashMap;

use crate::error::StorageError;

// == Storage Backend ==
/// A flat, synchronous string-to-string medium with a capacity ceiling.
///
/// Reads and deletes never fail; only writes can, when the record cannot be
/// stored.
pub trait StorageBackend {
    /// Returns the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Deletes `key`. Absent keys are ignored.
    fn remove_item(&mut self, key: &str);

    /// Deletes every key in `keys` as one change.
    fn remove_items(&mut self, keys: &[String]) {
        for key in keys {
            self.remove_item(key);
        }
    }

    /// Every key currently stored.
    fn keys(&self) -> Vec<String>;
}

// == Memory Storage ==
/// In-memory medium with an optional byte quota.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    /// Creates an unbounded medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that rejects writes once `quota` bytes are in use.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Bytes currently in use (keys plus values).
    pub fn used_bytes(&self) -> usize {
        used_bytes(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        check_quota(&self.items, self.quota, key, &value)?;
        self.items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

pub(crate) fn used_bytes(items: &HashMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Rejects a write of `key`/`value` that would push `items` past `quota`.
///
/// The record being replaced does not count against the quota.
pub(crate) fn check_quota(
    items: &HashMap<String, String>,
    quota: Option<usize>,
    key: &str,
    value: &str,
) -> Result<(), StorageError> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let replaced = items.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
    let available = quota.saturating_sub(used_bytes(items) - replaced);
    let needed = key.len() + value.len();

    if needed > available {
        return Err(StorageError::QuotaExceeded { needed, available });
    }
    Ok(())
}
