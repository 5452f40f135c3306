//! Authentication actions.
//!
//! Actions are the only way to change [`AuthState`](crate::AuthState).
//! Requests come from the client facade; outcomes are produced by effects
//! and fed back by the runtime.

use crate::error::AuthError;
use crate::state::{Credentials, Session};
use uuid::Uuid;

/// Authentication action.
///
/// This enum represents all possible inputs to the auth reducer:
/// - **Requests**: `Initialize`, `Login`, `Logout`
/// - **Outcomes**: results of the async work started by a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Startup
    // ═══════════════════════════════════════════════════════════════════════
    /// Consult the stored session. Handled once per process.
    Initialize,

    /// A complete stored session was found.
    SessionRestored {
        /// The stored session, trusted as-is.
        session: Session,
    },

    /// No usable stored session; any partial leftovers were cleared.
    SessionMissing,

    // ═══════════════════════════════════════════════════════════════════════
    // Login
    // ═══════════════════════════════════════════════════════════════════════
    /// Check credentials and persist the resulting session.
    Login {
        /// Correlates the request with its outcome.
        request_id: Uuid,

        /// Credentials to check.
        credentials: Credentials,
    },

    /// Credentials accepted and the session persisted.
    LoginSucceeded {
        /// Correlation ID of the originating `Login`.
        request_id: Uuid,

        /// The new session.
        session: Session,
    },

    /// Credentials rejected, or the session could not be persisted.
    LoginFailed {
        /// Correlation ID of the originating `Login`.
        request_id: Uuid,

        /// Why the attempt failed.
        error: AuthError,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Logout
    // ═══════════════════════════════════════════════════════════════════════
    /// Clear the stored session.
    Logout {
        /// Correlates the request with its outcome.
        request_id: Uuid,
    },

    /// The session is gone from state (storage failures are only logged).
    LoggedOut {
        /// Correlation ID of the originating `Logout`.
        request_id: Uuid,
    },
}

impl AuthAction {
    /// Build a login request with a fresh correlation ID.
    #[must_use]
    pub fn login(credentials: Credentials) -> Self {
        Self::Login {
            request_id: Uuid::new_v4(),
            credentials,
        }
    }

    /// Build a logout request with a fresh correlation ID.
    #[must_use]
    pub fn logout() -> Self {
        Self::Logout {
            request_id: Uuid::new_v4(),
        }
    }

    /// Correlation ID carried by login/logout requests and outcomes.
    #[must_use]
    pub const fn request_id(&self) -> Option<Uuid> {
        match self {
            Self::Login { request_id, .. }
            | Self::LoginSucceeded { request_id, .. }
            | Self::LoginFailed { request_id, .. }
            | Self::Logout { request_id }
            | Self::LoggedOut { request_id } => Some(*request_id),
            Self::Initialize | Self::SessionRestored { .. } | Self::SessionMissing => None,
        }
    }

    /// Returns `true` for the outcome of the login with this correlation ID.
    #[must_use]
    pub fn is_login_outcome(&self, id: Uuid) -> bool {
        matches!(
            self,
            Self::LoginSucceeded { request_id, .. } | Self::LoginFailed { request_id, .. }
                if *request_id == id
        )
    }

    /// Returns `true` for the outcome of the logout with this correlation ID.
    #[must_use]
    pub fn is_logout_outcome(&self, id: Uuid) -> bool {
        matches!(self, Self::LoggedOut { request_id } if *request_id == id)
    }
}
