//! Startup reducer.
//!
//! Settles the state from whatever the session store holds when the process
//! starts.
//!
//! # Flow
//!
//! 1. `Initialize` checks that a token is stored
//! 2. Token and user record are read concurrently
//! 3. A complete pair becomes `SessionRestored`, trusted as-is
//! 4. Anything else is cleared and becomes `SessionMissing`
//!
//! Each outcome marks the state initialised. Initialisation happens once:
//! an `Initialize` that arrives while a restore is running or after it
//! settled is ignored, as are stray outcomes.

use crate::actions::AuthAction;
use crate::environment::AuthEnvironment;
use crate::providers::{CredentialProvider, KeyValueStore};
use crate::session::SessionStore;
use crate::state::AuthState;
use rolegate_core::effect::Effect;
use rolegate_core::reducer::Reducer;
use rolegate_core::{SmallVec, smallvec};

/// Startup reducer.
///
/// Handles `Initialize`, `SessionRestored` and `SessionMissing`.
#[derive(Debug, Clone)]
pub struct StartupReducer<K, P> {
    _phantom: std::marker::PhantomData<(K, P)>,
}

impl<K, P> StartupReducer<K, P> {
    /// Create a new startup reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<K, P> Default for StartupReducer<K, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the stored session and turn it into an outcome action.
async fn restore<K: KeyValueStore>(sessions: &SessionStore<K>) -> AuthAction {
    if !sessions.has_session().await {
        // A user record without a token is a leftover too.
        sessions.clear().await;
        return AuthAction::SessionMissing;
    }

    let parts = sessions.load_parts().await;
    if parts.is_partial() {
        tracing::warn!(
            has_token = parts.token.is_some(),
            has_user = parts.user.is_some(),
            "Clearing partial stored session"
        );
    }

    match parts.into_session() {
        Some(session) => AuthAction::SessionRestored { session },
        None => {
            sessions.clear().await;
            AuthAction::SessionMissing
        },
    }
}

impl<K, P> Reducer for StartupReducer<K, P>
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
            // Initialize: consult the session store
            // ═══════════════════════════════════════════════════════════════
            AuthAction::Initialize => {
                if state.is_initialized {
                    tracing::warn!("Initialize received after initialisation, ignoring");
                    return SmallVec::new();
                }
                if state.is_restoring {
                    tracing::warn!("Initialize received while restoring, ignoring");
                    return SmallVec::new();
                }

                tracing::debug!("Restoring stored session");
                state.is_restoring = true;
                let sessions = env.sessions.clone();
                smallvec![Effect::future(async move { Some(restore(&sessions).await) })]
            },

            // ═══════════════════════════════════════════════════════════════
            // SessionRestored: trust the stored pair
            // ═══════════════════════════════════════════════════════════════
            AuthAction::SessionRestored { session } => {
                if state.is_initialized {
                    tracing::warn!("Late SessionRestored ignored");
                    return SmallVec::new();
                }

                tracing::info!(
                    user_id = %session.user.id,
                    role = %session.user.role,
                    "Session restored"
                );
                state.authenticate(session, env.clock.now());
                state.is_restoring = false;
                state.is_initialized = true;
                state.refresh_loading();
                SmallVec::new()
            },

            // ═══════════════════════════════════════════════════════════════
            // SessionMissing: settle logged out
            // ═══════════════════════════════════════════════════════════════
            AuthAction::SessionMissing => {
                if state.is_initialized {
                    tracing::warn!("Late SessionMissing ignored");
                    return SmallVec::new();
                }

                tracing::info!("No stored session");
                state.sign_out(None);
                state.is_restoring = false;
                state.is_initialized = true;
                state.refresh_loading();
                SmallVec::new()
            },

            // Other actions are not handled by this reducer
            _ => SmallVec::new(),
        }
    }
}
