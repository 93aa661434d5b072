use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::io::kv::{KeyValueStore, StorageError};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};

/// Name of the store document inside the store directory
pub const STORE_FILE: &str = "store.json";

/// A key-value store persisted as one JSON object on disk.
///
/// The whole document is rewritten atomically on every change. Keys keep
/// their insertion order across writes.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    path: PathBuf,
    entries: IndexMap<String, String>,
}

impl FileStore {
    /// Open (or create) the store in `dir`.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|e| StorageError::WriteError {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = dir.join(STORE_FILE);
        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| StorageError::ReadError {
                path: path.clone(),
                source: e,
            })?;
            if content.trim().is_empty() {
                IndexMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| StorageError::MalformedStore {
                    path: path.clone(),
                    source: e,
                })?
            }
        } else {
            IndexMap::new()
        };
        log::debug!("opened store {} ({} keys)", path.display(), entries.len());
        Ok(FileStore {
            dir: dir.to_path_buf(),
            path,
            entries,
        })
    }

    /// Directory holding the store document and its recovery log
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn flush(&self) -> Result<(), StorageError> {
        let content =
            serde_json::to_string_pretty(&self.entries).map_err(|e| StorageError::MalformedStore {
                path: self.path.clone(),
                source: e,
            })?;
        if let Err(e) = recovery::atomic_write(&self.path, content.as_bytes()) {
            recovery::log_recovery(
                &self.dir,
                RecoveryEntry::now(RecoveryCategory::Write, "store write failed")
                    .field("Target", self.path.display().to_string())
                    .field("Error", e.to_string())
                    .body(content),
            );
            return Err(StorageError::WriteError {
                path: self.path.clone(),
                source: e,
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(old) => {
                    self.entries.insert(key.to_string(), old);
                }
                None => {
                    self.entries.shift_remove(key);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let Some((index, _, old)) = self.entries.shift_remove_full(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.entries.shift_insert(index, key.to_string(), old);
            return Err(e);
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
