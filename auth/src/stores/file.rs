//! File-backed key-value store.
//!
//! This module provides a persistent [`KeyValueStore`] that keeps all entries
//! in a single JSON object on disk.
//!
//! # Architecture
//!
//! - Every operation reads the file; nothing is cached
//! - Writes go to a sibling temp file which is then renamed over the
//!   original, so a multi-key write lands completely or not at all
//! - An async mutex serialises operations within the process; other
//!   processes writing the same file are not coordinated
//! - A file that does not parse fails reads; the next write moves it aside
//!   to `<name>.corrupt` and starts from an empty map
//!
//! # Example
//!
//! ```no_run
//! use rolegate_auth::providers::KeyValueStore;
//! use rolegate_auth::stores::FileKeyValueStore;
//!
//! # async fn example() -> Result<(), rolegate_auth::error::StorageError> {
//! let store = FileKeyValueStore::new("/tmp/rolegate/session.json");
//! store.set("@auth_token", "abc").await?;
//! assert_eq!(store.get("@auth_token").await?, Some("abc".to_string()));
//! # Ok(())
//! # }
//! ```

use crate::error::StorageError;
use crate::providers::KeyValueStore;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as a JSON object file.
///
/// Clones share the same file and lock.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl FileKeyValueStore {
    /// Create a store backed by `path`.
    ///
    /// The file and its parent directories are created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("store"), OsString::from);
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    /// Where an unparsable file is moved before it is replaced.
    #[must_use]
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling_path(".corrupt")
    }

    async fn read_entries(&self) -> Result<Entries, StorageError> {
        match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Entries::new()),
            Err(error) => Err(error.into()),
        }
    }

    /// Entries to update in place; a corrupt file is moved aside and read as empty.
    async fn entries_for_write(&self) -> Result<Entries, StorageError> {
        match self.read_entries().await {
            Err(StorageError::Serialization(error)) => {
                let backup = self.corrupt_path();
                tracing::warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    %error,
                    "Store file is corrupt, replacing it"
                );
                tokio::fs::rename(self.path.as_path(), &backup).await?;
                Ok(Entries::new())
            },
            other => other,
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, self.path.as_path()).await?;

        tracing::trace!(path = %self.path.display(), keys = entries.len(), "Store file written");
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.multi_set(&[(key.to_string(), value.to_string())]).await
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.entries_for_write().await?;
        entries.extend(pairs.iter().cloned());
        self.write_entries(&entries).await
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.entries_for_write().await?;

        let before = entries.len();
        for key in keys {
            entries.remove(key);
        }
        if entries.len() == before {
            return Ok(());
        }

        self.write_entries(&entries).await
    }
}
