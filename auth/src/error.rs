//! Error types for session and authentication operations.

use rolegate_runtime::StoreError;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors surfaced to callers of the authentication client.
///
/// Storage failures never appear here directly: the session store turns
/// them into negative results at its boundary. Only failures that change
/// what the user sees are represented.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Authentication Errors
    // ═══════════════════════════════════════════════════════════

    /// Invalid credentials provided.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The credential check succeeded but the session could not be stored.
    #[error("Could not save session")]
    SessionPersistFailed,

    // ═══════════════════════════════════════════════════════════
    // Lifecycle Errors
    // ═══════════════════════════════════════════════════════════

    /// An operation that needs a settled session was called before `initialize()`.
    #[error("Authentication has not been initialized")]
    NotInitialized,

    /// No outcome arrived within the client's response timeout.
    #[error("Timed out waiting for authentication result")]
    Timeout,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// The state store rejected the request (usually because it is shutting down).
    #[error("State store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Returns `true` if this error is due to invalid user input.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rolegate_auth::AuthError;
    /// assert!(AuthError::InvalidCredentials.is_user_error());
    /// assert!(!AuthError::SessionPersistFailed.is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidCredentials)
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Timeout => Self::Timeout,
            other => Self::Store(other.to_string()),
        }
    }
}

/// Failure of the underlying key-value store.
///
/// Raised by [`KeyValueStore`](crate::providers::KeyValueStore)
/// implementations and absorbed (logged) by the session store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store cannot be reached or is locked.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing medium failed.
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// The stored payload could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
