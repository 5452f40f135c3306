//! Authentication client.
//!
//! [`AuthClient`] is the handle screens talk to. It owns the runtime store
//! running [`AuthReducer`], sends requests, and waits for their outcomes so
//! callers get plain `async` results:
//!
//! ```no_run
//! use rolegate_auth::mocks::{InMemoryKeyValueStore, MockCredentialProvider};
//! use rolegate_auth::{AuthClient, AuthEnvironment, Credentials, MockLatency, SessionStore};
//!
//! # async fn example() -> rolegate_auth::Result<()> {
//! let env = AuthEnvironment::new(
//!     SessionStore::new(InMemoryKeyValueStore::new()),
//!     MockCredentialProvider::new(MockLatency::NONE),
//! );
//! let client = AuthClient::new(env);
//!
//! client.initialize().await?;
//! let _user = client.login(Credentials::new("bia@example.com", "student123")).await?;
//! assert!(client.snapshot().await.is_authenticated);
//!
//! client.logout().await?;
//! client.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! Create one client per process and share it by cloning; clones drive the
//! same state.

use crate::actions::AuthAction;
use crate::config::ClientConfig;
use crate::environment::AuthEnvironment;
use crate::error::{AuthError, Result};
use crate::providers::{CredentialProvider, KeyValueStore};
use crate::reducers::AuthReducer;
use crate::state::{AuthState, Credentials, User};
use rolegate_runtime::Store;
use tokio::sync::watch;
use uuid::Uuid;

/// The runtime store specialised to the auth lifecycle.
pub type AuthStore<K, P> = Store<AuthState, AuthAction, AuthEnvironment<K, P>, AuthReducer<K, P>>;

/// Handle to the authentication lifecycle.
pub struct AuthClient<K, P>
where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    store: AuthStore<K, P>,
    config: ClientConfig,
}

impl<K, P> Clone for AuthClient<K, P>
where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config,
        }
    }
}

impl<K, P> AuthClient<K, P>
where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    /// Create a client with default settings.
    ///
    /// The state starts uninitialised and loading; call
    /// [`initialize`](Self::initialize) before anything else.
    #[must_use]
    pub fn new(environment: AuthEnvironment<K, P>) -> Self {
        Self::with_config(environment, ClientConfig::default())
    }

    /// Create a client with explicit settings.
    #[must_use]
    pub fn with_config(environment: AuthEnvironment<K, P>, config: ClientConfig) -> Self {
        Self {
            store: Store::new(AuthState::default(), AuthReducer::new(), environment),
            config,
        }
    }

    /// Restore the stored session, if any.
    ///
    /// Settles the state into authenticated or logged out and marks it
    /// initialised. Concurrent callers share a single restore; calling it
    /// after that is a no-op that returns the current state.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Timeout`] if the restore does not settle in time
    /// - [`AuthError::Store`] if the client is shutting down
    pub async fn initialize(&self) -> Result<AuthState> {
        if self.is_initialized().await {
            tracing::warn!("Auth already initialised");
            return Ok(self.snapshot().await);
        }

        // Subscribe first so the settling reduction cannot slip past us.
        let mut changes = self.store.subscribe_state();
        self.store.send(AuthAction::Initialize).await?;

        let settled = tokio::time::timeout(self.config.response_timeout, async {
            while !self.is_initialized().await {
                if changes.changed().await.is_err() {
                    return Err(AuthError::Store("State channel closed".to_string()));
                }
            }
            Ok(())
        })
        .await;
        settled.map_err(|_| AuthError::Timeout)??;

        Ok(self.snapshot().await)
    }

    /// Log in and persist the new session.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotInitialized`] before [`initialize`](Self::initialize)
    /// - [`AuthError::InvalidCredentials`] if the credentials are rejected
    /// - [`AuthError::SessionPersistFailed`] if the session cannot be stored
    /// - [`AuthError::Timeout`] / [`AuthError::Store`] from the runtime
    pub async fn login(&self, credentials: Credentials) -> Result<User> {
        if !self.is_initialized().await {
            return Err(AuthError::NotInitialized);
        }

        let request_id = Uuid::new_v4();
        let outcome = self
            .store
            .send_and_wait_for(
                AuthAction::Login {
                    request_id,
                    credentials,
                },
                |action| action.is_login_outcome(request_id),
                self.config.response_timeout,
            )
            .await?;

        match outcome {
            AuthAction::LoginSucceeded { session, .. } => Ok(session.user),
            AuthAction::LoginFailed { error, .. } => Err(error),
            other => Err(AuthError::Store(format!("Unexpected login outcome: {other:?}"))),
        }
    }

    /// Log out.
    ///
    /// The state ends logged out even if the stored session could not be
    /// removed; that failure is only logged.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotInitialized`] before [`initialize`](Self::initialize)
    /// - [`AuthError::Timeout`] / [`AuthError::Store`] from the runtime
    pub async fn logout(&self) -> Result<()> {
        if !self.is_initialized().await {
            return Err(AuthError::NotInitialized);
        }

        let request_id = Uuid::new_v4();
        self.store
            .send_and_wait_for(
                AuthAction::Logout { request_id },
                |action| action.is_logout_outcome(request_id),
                self.config.response_timeout,
            )
            .await?;
        Ok(())
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> AuthState {
        self.store.state(Clone::clone).await
    }

    /// Returns `true` once the stored session has been consulted.
    pub async fn is_initialized(&self) -> bool {
        self.store.state(|s| s.is_initialized).await
    }

    /// Notifications of state changes.
    ///
    /// The value is a version counter; read the state with
    /// [`snapshot`](Self::snapshot) when it changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe_state()
    }

    /// The underlying runtime store.
    #[must_use]
    pub const fn store(&self) -> &AuthStore<K, P> {
        &self.store
    }

    /// Stop accepting requests and wait for in-flight work.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] if in-flight work outlives the shutdown
    /// grace period.
    pub async fn shutdown(&self) -> Result<()> {
        self.store.shutdown(self.config.shutdown_timeout).await?;
        Ok(())
    }
}
