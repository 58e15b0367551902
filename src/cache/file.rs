//! File Storage Module
//!
//! Durable medium that keeps every item in one JSON file, rewritten on each
//! change.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::backend::{check_quota, used_bytes, StorageBackend};
use crate::error::StorageError;

// == File Storage ==
/// A [`StorageBackend`] persisted to a single JSON object on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl FileStorage {
    // == Open ==
    /// Opens the medium at `path`, creating it on first write.
    ///
    /// A file that is not a JSON object of strings is treated as empty and
    /// will be overwritten by the next write.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let items = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Discarding unreadable storage file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        debug!("Opened {} with {} items", path.display(), items.len());
        Ok(Self { path, items, quota })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently in use (keys plus values).
    pub fn used_bytes(&self) -> usize {
        used_bytes(&self.items)
    }

    // == Persist ==
    /// Writes all items to a sibling temp file, then renames it into place.
    fn persist(&self) -> Result<(), StorageError> {
        let data = serde_json::to_vec(&self.items)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        check_quota(&self.items, self.quota, key, &value)?;

        let previous = self.items.insert(key.to_string(), value);
        if let Err(e) = self.persist() {
            // Leave memory matching what is on disk.
            match previous {
                Some(old) => self.items.insert(key.to_string(), old),
                None => self.items.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.remove_items(&[key.to_string()]);
    }

    /// Removes all `keys` and rewrites the file once.
    ///
    /// If the write fails the removed items are restored, so memory keeps
    /// matching the file.
    fn remove_items(&mut self, keys: &[String]) {
        let removed: Vec<(String, String)> = keys
            .iter()
            .filter_map(|key| self.items.remove_entry(key))
            .collect();
        if removed.is_empty() {
            return;
        }
        if let Err(e) = self.persist() {
            warn!("Failed to persist removal of {} items: {}", removed.len(), e);
            self.items.extend(removed);
        }
    }

    fn keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}
