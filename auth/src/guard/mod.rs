//! Role-based route guard.
//!
//! The guard reconciles the current route with the auth state and decides
//! whether the user must be sent elsewhere:
//!
//! | Situation | Redirect |
//! |---|---|
//! | not initialised | none (still loading) |
//! | login or logout in flight | none (route held until it settles) |
//! | authenticated on a public route | own home |
//! | authenticated in another role's area | own home |
//! | authenticated on an unknown segment, policy `Deny` | own home |
//! | not authenticated on a protected route | login |
//! | anything else | none |
//!
//! Decisions are pure functions of `(path, state)`; [`GuardedNavigator`]
//! re-evaluates them whenever either changes.

pub mod navigator;

use crate::config::{GuardConfig, UnknownSegmentPolicy};
use crate::constants::routes;
use crate::state::{AuthState, Role};
use std::fmt;

pub use navigator::{GuardedNavigator, NavigationState};

/// A parsed route path.
///
/// Route groups written as `(name)` only organise screens and are dropped.
/// The root path has no segments and is reported as the `index` route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutePath {
    segments: Vec<String>,
}

impl RoutePath {
    /// Parse `"/trainer/students/42"`, `"trainer"` or `"/"`.
    ///
    /// Query strings and fragments are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = path
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !is_group(s))
            .map(ToString::to_string)
            .collect();
        Self { segments }
    }

    /// All segments, in order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The segment the guard decides on: the first one, or `index` at the root.
    #[must_use]
    pub fn first_segment(&self) -> &str {
        self.segments.first().map_or(routes::INDEX, String::as_str)
    }

    /// Returns `true` for `/`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for RoutePath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl fmt::Display for RoutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

fn is_group(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('(') && segment.ends_with(')')
}

/// What the guard decided for a `(path, state)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardDecision {
    /// Where to send the user instead, if anywhere.
    pub redirect: Option<String>,

    /// Render the screen without the navigation header.
    pub hide_header: bool,

    /// Auth is not initialised or a login/logout is in flight.
    ///
    /// No redirect is issued while this is set: a user who logs in again
    /// keeps the current route until the new outcome lands.
    pub is_loading: bool,
}

impl GuardDecision {
    /// Returns `true` if the current route may be rendered.
    #[must_use]
    pub const fn allows(&self) -> bool {
        self.redirect.is_none()
    }
}

/// How the guard classifies a route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Reachable without a session.
    Public,

    /// The home area of a role.
    RoleArea(Role),

    /// Protected, but not owned by any role.
    Unknown,
}

/// Role-based route guard.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    config: GuardConfig,
}

impl RouteGuard {
    /// Create a guard with the given configuration.
    #[must_use]
    pub const fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    /// The guard's configuration.
    #[must_use]
    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Classify a route segment.
    #[must_use]
    pub fn classify(&self, segment: &str) -> SegmentKind {
        if self.config.public_routes.contains(segment) {
            SegmentKind::Public
        } else if let Some(role) = Role::from_segment(segment) {
            SegmentKind::RoleArea(role)
        } else {
            SegmentKind::Unknown
        }
    }

    /// Returns `true` if the route renders without the navigation header.
    #[must_use]
    pub fn should_hide_header(&self, path: &RoutePath) -> bool {
        self.config.headerless_routes.contains(path.first_segment())
    }

    /// Decide on a route for the given auth state.
    #[must_use]
    pub fn evaluate(&self, path: &RoutePath, state: &AuthState) -> GuardDecision {
        GuardDecision {
            redirect: self.redirect_for(path, state),
            hide_header: self.should_hide_header(path),
            is_loading: state.is_loading,
        }
    }

    fn redirect_for(&self, path: &RoutePath, state: &AuthState) -> Option<String> {
        if !state.is_initialized || state.in_flight > 0 {
            return None;
        }

        let segment = path.first_segment();
        let kind = self.classify(segment);

        let Some(role) = state.role() else {
            return match kind {
                SegmentKind::Public => None,
                SegmentKind::RoleArea(_) | SegmentKind::Unknown => {
                    tracing::debug!(%path, "Unauthenticated access, redirecting to login");
                    Some(self.config.login_path.clone())
                },
            };
        };

        let to_home = match kind {
            SegmentKind::Public => true,
            SegmentKind::RoleArea(owner) => owner != role,
            SegmentKind::Unknown => self.config.unknown_segments == UnknownSegmentPolicy::Deny,
        };

        if to_home {
            tracing::debug!(%path, %role, "Redirecting to role home");
            Some(role.home_path().to_string())
        } else {
            None
        }
    }
}
