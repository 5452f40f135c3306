//! Authentication state types.
//!
//! This module defines the user, session and root state types managed by the
//! auth reducer. All types are `Clone` to support the functional architecture
//! pattern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Roles
// ═══════════════════════════════════════════════════════════════════════

/// Role of an authenticated user.
///
/// Every role owns exactly one route segment (its home area). The mapping is
/// total and injective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Trainer managing students.
    Trainer,
    /// Student.
    Student,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Trainer, Self::Student];

    /// Route segment of this role's home area.
    #[must_use]
    pub const fn segment(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Trainer => "trainer",
            Self::Student => "student",
        }
    }

    /// Absolute path of this role's home area (e.g. `/trainer`).
    #[must_use]
    pub const fn home_path(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::Trainer => "/trainer",
            Self::Student => "/student",
        }
    }

    /// Recognise a role segment.
    ///
    /// Returns `None` for segments that do not belong to any role.
    #[must_use]
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.segment() == segment)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// User & Session
// ═══════════════════════════════════════════════════════════════════════

/// User record issued by the credential check.
///
/// Persisted as JSON under the session's user key. Immutable for the
/// lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque user identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// CPF tax id, 11 digits without mask.
    pub tax_id: String,

    /// Email address.
    pub email: String,

    /// Reference to the profile picture, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,

    /// Role deciding which home area the user may access.
    pub role: Role,
}

impl User {
    /// Returns `true` if the stored tax id passes the CPF check digits.
    #[must_use]
    pub fn has_valid_tax_id(&self) -> bool {
        crate::cpf::is_valid_cpf(&self.tax_id)
    }
}

/// An authenticated identity: opaque token plus user record.
///
/// Sessions are persisted and removed as a unit; see
/// [`SessionStore`](crate::session::SessionStore).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token.
    pub token: String,

    /// The user this session belongs to.
    pub user: User,
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email address or CPF (masked or not).
    pub identifier: String,

    /// Password.
    pub secret: String,
}

impl Credentials {
    /// Create credentials from an identifier and a secret.
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Root State
// ═══════════════════════════════════════════════════════════════════════

/// Coarse lifecycle phase derived from [`AuthState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    /// The stored session has not been consulted yet.
    Initializing,
    /// A login or logout is in flight.
    Loading,
    /// A complete session is active.
    Authenticated,
    /// No session (possibly with an error from the last login attempt).
    LoggedOut,
}

/// Root authentication state.
///
/// Created at process start in the loading sub-state; the `Initialize`
/// action settles it, after which only login and logout change it.
///
/// # Invariants
///
/// - `is_authenticated` implies `user` and `token` are both set and the last
///   transition was a success.
/// - `is_initialized` never goes back to `false`.
/// - At most one restore runs: `is_restoring` is set by the first
///   `Initialize` and cleared when its outcome lands.
///
/// # Examples
///
/// ```
/// # use rolegate_auth::{AuthState, AuthPhase};
/// let state = AuthState::default();
/// assert!(state.is_loading);
/// assert!(!state.is_initialized);
/// assert_eq!(state.phase(), AuthPhase::Initializing);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    /// Current user (if logged in).
    pub user: Option<User>,

    /// Current session token (if logged in).
    pub token: Option<String>,

    /// `true` while uninitialised or while a login/logout is in flight.
    pub is_loading: bool,

    /// Message from the last failed login; cleared by the next request.
    pub error: Option<String>,

    /// `true` only after a successful restore or login.
    pub is_authenticated: bool,

    /// Set once the stored session has been consulted.
    pub is_initialized: bool,

    /// `true` from the first `Initialize` until its restore settles.
    pub is_restoring: bool,

    /// Number of login/logout requests still waiting for their outcome.
    pub in_flight: u32,

    /// When the current session was restored or created.
    pub authenticated_at: Option<DateTime<Utc>>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            is_loading: true,
            error: None,
            is_authenticated: false,
            is_initialized: false,
            is_restoring: false,
            in_flight: 0,
            authenticated_at: None,
        }
    }
}

impl AuthState {
    /// Role of the authenticated user, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        if self.is_authenticated {
            self.user.as_ref().map(|user| user.role)
        } else {
            None
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> AuthPhase {
        if !self.is_initialized {
            AuthPhase::Initializing
        } else if self.in_flight > 0 {
            AuthPhase::Loading
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::LoggedOut
        }
    }

    /// Install a session and mark the state authenticated.
    pub(crate) fn authenticate(&mut self, session: Session, at: DateTime<Utc>) {
        self.token = Some(session.token);
        self.user = Some(session.user);
        self.is_authenticated = true;
        self.error = None;
        self.authenticated_at = Some(at);
    }

    /// Drop the session, optionally recording why.
    pub(crate) fn sign_out(&mut self, error: Option<String>) {
        self.user = None;
        self.token = None;
        self.is_authenticated = false;
        self.authenticated_at = None;
        self.error = error;
    }

    /// Recompute `is_loading` from the initialisation flag and in-flight count.
    pub(crate) const fn refresh_loading(&mut self) {
        self.is_loading = !self.is_initialized || self.in_flight > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> User {
        User {
            id: "3".to_string(),
            name: "Bia Souza".to_string(),
            tax_id: "39053344705".to_string(),
            email: "bia@example.com".to_string(),
            profile_image: None,
            role: Role::Student,
        }
    }

    #[test]
    fn test_role_mapping_is_injective() {
        for role in Role::ALL {
            assert_eq!(Role::from_segment(role.segment()), Some(role));
            assert_eq!(role.home_path(), format!("/{}", role.segment()));
        }
        assert_eq!(Role::from_segment("settings"), None);
    }

    #[test]
    fn test_user_json_shape() {
        let json = serde_json::to_value(student()).unwrap_or_default();
        assert_eq!(json["taxId"], "39053344705");
        assert_eq!(json["role"], "student");
        assert!(json.get("profileImage").is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let session = Session {
            token: "tok-123".to_string(),
            user: student(),
        };
        assert!(!format!("{session:?}").contains("tok-123"));

        let credentials = Credentials::new("bia@example.com", "hunter2");
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }

    #[test]
    fn test_role_only_when_authenticated() {
        let mut state = AuthState {
            user: Some(student()),
            ..AuthState::default()
        };
        assert_eq!(state.role(), None);

        state.is_authenticated = true;
        assert_eq!(state.role(), Some(Role::Student));
    }
}
