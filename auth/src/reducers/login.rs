//! Login and logout reducer.
//!
//! # Login
//!
//! 1. `Login` enters the loading state and clears the previous error
//! 2. The credential provider checks the identifier/secret pair
//! 3. The new session is persisted as one atomic pair
//! 4. `LoginSucceeded` authenticates; `LoginFailed` settles logged out with
//!    the error message attached
//!
//! A session that cannot be persisted fails the login: the state is never
//! authenticated without a stored session.
//!
//! # Logout
//!
//! `Logout` clears the session store and always ends in `LoggedOut`, even if
//! the clear fails.
//!
//! # Concurrency
//!
//! Requests are not queued or cancelled. Each one holds the state in loading
//! until its outcome arrives, and the last outcome to arrive decides the
//! session.

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::error::AuthError;
use crate::providers::{CredentialProvider, KeyValueStore};
use crate::state::AuthState;
use rolegate_core::effect::Effect;
use rolegate_core::reducer::Reducer;
use rolegate_core::{SmallVec, smallvec};

/// Login and logout reducer.
#[derive(Debug, Clone)]
pub struct LoginReducer<K, P> {
    _phantom: std::marker::PhantomData<(K, P)>,
}

impl<K, P> LoginReducer<K, P> {
    /// Create a new login reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<K, P> Default for LoginReducer<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> Reducer for LoginReducer<K, P>
where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<K, P>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Login: check credentials, then persist the session
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Login {
                request_id,
                credentials,
            } => {
                if !state.is_initialized {
                    tracing::warn!(%request_id, "Login before initialisation, ignoring");
                    return SmallVec::new();
                }

                tracing::info!(%request_id, identifier = %credentials.identifier, "Login requested");
                state.in_flight = state.in_flight.saturating_add(1);
                state.is_authenticated = false;
                state.error = None;
                state.refresh_loading();

                let sessions = env.sessions.clone();
                let provider = env.credentials.clone();

                smallvec![Effect::future(async move {
                    let session = match provider
                        .authenticate(&credentials.identifier, &credentials.secret)
                        .await
                    {
                        Ok(session) => session,
                        Err(error) => {
                            return Some(AuthAction::LoginFailed { request_id, error });
                        },
                    };

                    if sessions.save(&session).await {
                        Some(AuthAction::LoginSucceeded {
                            request_id,
                            session,
                        })
                    } else {
                        Some(AuthAction::LoginFailed {
                            request_id,
                            error: AuthError::SessionPersistFailed,
                        })
                    }
                })]
            },

            // ═══════════════════════════════════════════════════════════════
            // LoginSucceeded: authenticate
            // ═══════════════════════════════════════════════════════════════
            AuthAction::LoginSucceeded {
                request_id,
                session,
            } => {
                tracing::info!(
                    %request_id,
                    user_id = %session.user.id,
                    role = %session.user.role,
                    "Login succeeded"
                );
                state.in_flight = state.in_flight.saturating_sub(1);
                state.authenticate(session, env.clock.now());
                state.refresh_loading();
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // LoginFailed: settle logged out with the message
            // ═══════════════════════════════════════════════════════════════
            AuthAction::LoginFailed { request_id, error } => {
                tracing::warn!(%request_id, %error, "Login failed");
                state.in_flight = state.in_flight.saturating_sub(1);
                state.sign_out(Some(error.to_string()));
                state.refresh_loading();
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // Logout: clear storage, sign out regardless
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Logout { request_id } => {
                if !state.is_initialized {
                    tracing::warn!(%request_id, "Logout before initialisation, ignoring");
                    return SmallVec::new();
                }

                tracing::info!(%request_id, "Logout requested");
                state.in_flight = state.in_flight.saturating_add(1);
                state.error = None;
                state.refresh_loading();

                let sessions = env.sessions.clone();
                smallvec![Effect::future(async move {
                    if !sessions.clear().await {
                        tracing::warn!(%request_id, "Stored session could not be cleared");
                    }
                    Some(AuthAction::LoggedOut { request_id })
                })]
            },

            // ═══════════════════════════════════════════════════════════════
            // LoggedOut
            // ═══════════════════════════════════════════════════════════════
            AuthAction::LoggedOut { request_id } => {
                tracing::info!(%request_id, "Logged out");
                state.in_flight = state.in_flight.saturating_sub(1);
                state.sign_out(None);
                state.refresh_loading();
                SmallVec::new()
            },

            // Other actions are not handled by this reducer
            _ => SmallVec::new(),
        }
    }
}
