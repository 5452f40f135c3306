//! Key-value store trait.

use crate::error::StorageError;
use std::future::Future;

/// Persistent string key-value store.
///
/// This trait abstracts over the device-local storage the session lives in
/// (an in-memory map in tests, a JSON file on disk in the demo).
///
/// # Implementation Notes
///
/// - `multi_set` and `multi_remove` must be all-or-nothing: either every
///   key is written/removed or none is
/// - Removing a missing key is not an error
/// - Single process, single writer; no cross-process locking is expected
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Returns
    ///
    /// `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be read.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Write a single value.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Write several values atomically.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written; in that case
    /// none of the pairs are stored.
    fn multi_set(
        &self,
        pairs: &[(String, String)],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove several keys atomically.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written; in that case
    /// none of the keys are removed.
    fn multi_remove(
        &self,
        keys: &[String],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}
