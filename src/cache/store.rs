//! TTL Store Module
//!
//! Namespaced, expiring key-value persistence over a [`StorageBackend`].
//! Storage faults and corrupt records are absorbed here; callers only ever
//! see a payload, an absence, or a `false` from a save.

use std::time::Duration;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, Namespace, StorageBackend, SystemClock};
use crate::error::StorageError;

// == Lookup ==
/// Outcome of reading one key.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// A live entry
    Hit(CacheEntry<T>),
    /// Nothing stored under the key
    Missing,
    /// The entry had expired and has been deleted
    Expired,
    /// The stored record could not be parsed as the requested type
    Malformed,
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    pub fn into_entry(self) -> Option<CacheEntry<T>> {
        match self {
            Lookup::Hit(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn into_payload(self) -> Option<T> {
        self.into_entry().map(|entry| entry.payload)
    }
}

// == Stored Entry ==
/// A live entry together with the caller key it was saved under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEntry<T> {
    pub key: String,
    #[serde(flatten)]
    pub entry: CacheEntry<T>,
}

// == TTL Store ==
/// Expiring key-value store partitioned into [`Namespace`]s.
#[derive(Debug)]
pub struct TtlStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    stats: CacheStats,
}

impl<S: StorageBackend> TtlStore<S, SystemClock> {
    // == Constructor ==
    /// Creates a store over `storage` using wall-clock time.
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: StorageBackend, C: Clock> TtlStore<S, C> {
    /// Creates a store over `storage` reading time from `clock`.
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            stats: CacheStats::new(),
        }
    }

    // == Save ==
    /// Stores `payload` under `key`, replacing any previous entry.
    ///
    /// `ttl` defaults to the namespace's default. Returns the storage fault
    /// if the record could not be serialized or written.
    pub fn try_save<T>(
        &mut self,
        namespace: Namespace,
        key: &str,
        payload: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let ttl = ttl.unwrap_or_else(|| namespace.default_ttl());
        let entry = CacheEntry::new(payload, self.clock.now_ms(), ttl);
        let raw = serde_json::to_string(&entry)?;
        self.storage.set_item(&namespace.storage_key(key), raw)
    }

    /// Stores `payload` under `key`; returns false if the write was rejected.
    pub fn save<T>(
        &mut self,
        namespace: Namespace,
        key: &str,
        payload: &T,
        ttl: Option<Duration>,
    ) -> bool
    where
        T: Serialize + ?Sized,
    {
        match self.try_save(namespace, key, payload, ttl) {
            Ok(()) => {
                debug!("Saved {} entry {}", namespace, key);
                true
            }
            Err(e) => {
                warn!("Failed to save {} entry {}: {}", namespace, key, e);
                self.stats.record_write_failure();
                false
            }
        }
    }

    // == Lookup ==
    /// Reads `key`, deleting it first if it has expired.
    pub fn lookup<T: DeserializeOwned>(&mut self, namespace: Namespace, key: &str) -> Lookup<T> {
        let storage_key = namespace.storage_key(key);

        let Some(raw) = self.storage.get_item(&storage_key) else {
            self.stats.record_miss();
            return Lookup::Missing;
        };

        let record = match serde_json::from_str::<CacheEntry<Value>>(&raw) {
            Ok(record) => record,
            Err(e) => return self.malformed(&storage_key, e),
        };

        if record.is_expired_at(self.clock.now_ms()) {
            self.storage.remove_item(&storage_key);
            self.stats.record_expired(1);
            self.stats.record_miss();
            debug!("Evicted expired entry {}", storage_key);
            return Lookup::Expired;
        }

        match serde_json::from_value::<T>(record.payload) {
            Ok(payload) => {
                self.stats.record_hit();
                Lookup::Hit(CacheEntry {
                    payload,
                    created_at: record.created_at,
                    expires_at: record.expires_at,
                })
            }
            Err(e) => self.malformed(&storage_key, e),
        }
    }

    fn malformed<T>(&mut self, storage_key: &str, cause: serde_json::Error) -> Lookup<T> {
        debug!("Ignoring malformed entry {}: {}", storage_key, cause);
        self.stats.record_malformed();
        self.stats.record_miss();
        Lookup::Malformed
    }

    // == Get ==
    /// Returns the live payload under `key`, if any.
    pub fn get<T: DeserializeOwned>(&mut self, namespace: Namespace, key: &str) -> Option<T> {
        self.lookup(namespace, key).into_payload()
    }

    /// Returns the live entry under `key` with its timestamps, if any.
    pub fn get_entry<T: DeserializeOwned>(
        &mut self,
        namespace: Namespace,
        key: &str,
    ) -> Option<CacheEntry<T>> {
        self.lookup(namespace, key).into_entry()
    }

    // == Remove ==
    /// Deletes `key`. Does nothing if it is absent.
    pub fn remove(&mut self, namespace: Namespace, key: &str) {
        self.storage.remove_item(&namespace.storage_key(key));
    }

    // == List All ==
    /// Returns every live, well-formed entry in `namespace`, newest first.
    ///
    /// Expired entries found while listing are deleted. Malformed ones are
    /// skipped and left for [`cleanup`](Self::cleanup).
    pub fn list_all<T: DeserializeOwned>(&mut self, namespace: Namespace) -> Vec<StoredEntry<T>> {
        let now = self.clock.now_ms();
        let mut entries = Vec::new();
        let mut expired = Vec::new();

        for storage_key in self.storage.keys() {
            let Some(key) = namespace.strip_prefix(&storage_key).map(str::to_string) else {
                continue;
            };
            let Some(raw) = self.storage.get_item(&storage_key) else {
                continue;
            };

            let record = match serde_json::from_str::<CacheEntry<Value>>(&raw) {
                Ok(record) if record.is_expired_at(now) => {
                    expired.push(storage_key);
                    continue;
                }
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping malformed entry {}: {}", storage_key, e);
                    continue;
                }
            };

            match serde_json::from_value::<T>(record.payload) {
                Ok(payload) => entries.push(StoredEntry {
                    key,
                    entry: CacheEntry {
                        payload,
                        created_at: record.created_at,
                        expires_at: record.expires_at,
                    },
                }),
                Err(e) => debug!("Skipping malformed entry {}: {}", storage_key, e),
            }
        }

        if !expired.is_empty() {
            debug!("Evicting {} expired entries from {}", expired.len(), namespace);
            self.storage.remove_items(&expired);
            self.stats.record_expired(expired.len() as u64);
        }

        entries.sort_by(|a, b| {
            b.entry
                .created_at
                .cmp(&a.entry.created_at)
                .then_with(|| a.key.cmp(&b.key))
        });
        entries
    }

    // == Cleanup ==
    /// Removes expired and malformed records from every namespace.
    ///
    /// Returns the number of records removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut doomed = Vec::new();
        let mut expired = 0;
        let mut malformed = 0;

        for storage_key in self.storage.keys() {
            if !Namespace::ALL.iter().any(|ns| storage_key.starts_with(ns.prefix())) {
                continue;
            }
            let Some(raw) = self.storage.get_item(&storage_key) else {
                continue;
            };

            match serde_json::from_str::<CacheEntry<IgnoredAny>>(&raw) {
                Ok(entry) if entry.is_expired_at(now) => {
                    expired += 1;
                    doomed.push(storage_key);
                }
                Ok(_) => {}
                Err(_) => {
                    warn!("Removing malformed entry {}", storage_key);
                    self.stats.record_malformed();
                    malformed += 1;
                    doomed.push(storage_key);
                }
            }
        }

        self.storage.remove_items(&doomed);
        self.stats.record_expired(expired as u64);
        let removed = expired + malformed;
        if removed > 0 {
            info!(
                "Cleanup removed {} entries ({} expired, {} malformed)",
                removed, expired, malformed
            );
        }
        removed
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        let total = self
            .storage
            .keys()
            .iter()
            .filter(|k| Namespace::ALL.iter().any(|ns| k.starts_with(ns.prefix())))
            .count();
        stats.set_total_entries(total);
        stats
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The underlying medium.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
