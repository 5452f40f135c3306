//! Mock key-value store for testing.

use crate::error::StorageError;
use crate::providers::KeyValueStore;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// In-memory key-value store.
///
/// Clones share the same map, so a test can keep a handle for inspection
/// after moving one into the environment. Reads and writes can be made to
/// fail on demand.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    latency: Duration,
}

impl InMemoryKeyValueStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every operation by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Store a raw value, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    /// Read a raw value, bypassing failure injection.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Returns `true` if `key` is stored.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Test helpers keep working after a panicking test poisoned the lock.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable(format!("injected {what} failure")))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        let entries = Arc::clone(&self.entries);
        let fail = Arc::clone(&self.fail_reads);
        let latency = self.latency;
        let key = key.to_string();

        async move {
            tokio::time::sleep(latency).await;
            Self::check(&fail, "read")?;
            let guard = entries
                .lock()
                .map_err(|_| StorageError::Unavailable("Mutex lock failed".to_string()))?;
            Ok(guard.get(&key).cloned())
        }
    }

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        let pair = [(key.to_string(), value.to_string())];
        let store = self.clone();

        async move { store.multi_set(&pair).await }
    }

    fn multi_set(
        &self,
        pairs: &[(String, String)],
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        let entries = Arc::clone(&self.entries);
        let fail = Arc::clone(&self.fail_writes);
        let latency = self.latency;
        let pairs = pairs.to_vec();

        async move {
            tokio::time::sleep(latency).await;
            Self::check(&fail, "write")?;
            let mut guard = entries
                .lock()
                .map_err(|_| StorageError::Unavailable("Mutex lock failed".to_string()))?;
            guard.extend(pairs);
            Ok(())
        }
    }

    fn multi_remove(
        &self,
        keys: &[String],
    ) -> impl Future<Output = Result<(), StorageError>> + Send {
        let entries = Arc::clone(&self.entries);
        let fail = Arc::clone(&self.fail_writes);
        let latency = self.latency;
        let keys = keys.to_vec();

        async move {
            tokio::time::sleep(latency).await;
            Self::check(&fail, "write")?;
            let mut guard = entries
                .lock()
                .map_err(|_| StorageError::Unavailable("Mutex lock failed".to_string()))?;
            for key in &keys {
                guard.remove(key);
            }
            Ok(())
        }
    }
}
