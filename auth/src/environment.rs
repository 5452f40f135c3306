//! Authentication environment.
//!
//! This module defines the environment type for dependency injection
//! in the auth reducer.

use crate::providers::{CredentialProvider, KeyValueStore};
use crate::session::SessionStore;
use rolegate_core::environment::{Clock, SystemClock};
use std::sync::Arc;

/// Authentication environment.
///
/// Contains all external dependencies needed by the auth reducer.
///
/// # Type Parameters
///
/// - `K`: Key-value store backing the session
/// - `P`: Credential provider
#[derive(Clone)]
pub struct AuthEnvironment<K, P>
where
    K: KeyValueStore + Clone,
    P: CredentialProvider + Clone,
{
    /// Session persistence.
    pub sessions: SessionStore<K>,

    /// Credential check.
    pub credentials: P,

    /// Time source for `authenticated_at`.
    pub clock: Arc<dyn Clock>,
}

impl<K, P> AuthEnvironment<K, P>
where
    K: KeyValueStore + Clone,
    P: CredentialProvider + Clone,
{
    /// Create a new authentication environment using the system clock.
    #[must_use]
    pub fn new(sessions: SessionStore<K>, credentials: P) -> Self {
        Self::with_clock(sessions, credentials, Arc::new(SystemClock))
    }

    /// Create a new authentication environment with an explicit clock.
    #[must_use]
    pub fn with_clock(sessions: SessionStore<K>, credentials: P, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            credentials,
            clock,
        }
    }
}

impl<K, P> std::fmt::Debug for AuthEnvironment<K, P>
where
    K: KeyValueStore + Clone + std::fmt::Debug,
    P: CredentialProvider + Clone + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthEnvironment")
            .field("sessions", &self.sessions)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
