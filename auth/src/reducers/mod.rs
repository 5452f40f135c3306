//! Authentication reducers.
//!
//! This module contains pure reducer functions for the session lifecycle.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.

pub mod login;
pub mod startup;

use crate::providers::{CredentialProvider, KeyValueStore};
use crate::{AuthAction, AuthEnvironment, AuthState};
use rolegate_core::{SmallVec, effect::Effect, reducer::Reducer};

// Re-export
pub use login::LoginReducer;
pub use startup::StartupReducer;

/// Unified authentication reducer.
///
/// Routes startup actions to [`StartupReducer`] and login/logout actions to
/// [`LoginReducer`].
#[derive(Clone, Debug)]
pub struct AuthReducer<K, P>
where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    startup: StartupReducer<K, P>,
    login: LoginReducer<K, P>,
}

impl<K, P> AuthReducer<K, P>
where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    /// Create a new unified auth reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            startup: StartupReducer::new(),
            login: LoginReducer::new(),
        }
    }
}

impl<K, P> Default for AuthReducer<K, P>
where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> Reducer for AuthReducer<K, P>
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
            AuthAction::Initialize
            | AuthAction::SessionRestored { .. }
            | AuthAction::SessionMissing => self.startup.reduce(state, action, env),

            AuthAction::Login { .. }
            | AuthAction::LoginSucceeded { .. }
            | AuthAction::LoginFailed { .. }
            | AuthAction::Logout { .. }
            | AuthAction::LoggedOut { .. } => self.login.reduce(state, action, env),
        }
    }
}
