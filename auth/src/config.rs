//! Authentication configuration.
//!
//! Configuration structures for the session store, the route guard, the
//! mock credential check and the client facade. Values are provided by the
//! application through builders, or loaded from the environment with
//! [`AuthConfig::from_env`].

use crate::constants::{env_vars, routes, storage_keys};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration loading error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be parsed.
    #[error("Invalid value for {var}: {value}")]
    InvalidValue {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },
}

/// Storage keys the session is persisted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    /// Key of the token value.
    pub token: String,

    /// Key of the JSON user record.
    pub user: String,
}

impl SessionKeys {
    /// Create custom session keys.
    #[must_use]
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
        }
    }

    /// Both keys, token first.
    #[must_use]
    pub fn both(&self) -> [String; 2] {
        [self.token.clone(), self.user.clone()]
    }
}

impl Default for SessionKeys {
    fn default() -> Self {
        Self::new(storage_keys::TOKEN, storage_keys::USER)
    }
}

/// How the route guard treats segments that are neither public nor a role's
/// home area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownSegmentPolicy {
    /// Leave them unguarded for authenticated users.
    #[default]
    Allow,

    /// Send authenticated users back to their home area.
    Deny,
}

impl std::str::FromStr for UnknownSegmentPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            _ => Err(ConfigError::InvalidValue {
                var: env_vars::UNKNOWN_SEGMENTS,
                value: s.to_string(),
            }),
        }
    }
}

/// Route guard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardConfig {
    /// Where unauthenticated users are sent.
    ///
    /// Default: `/login`
    pub login_path: String,

    /// Segments reachable without a session.
    ///
    /// Default: `login`, `index`
    pub public_routes: BTreeSet<String>,

    /// Segments rendered without the navigation header.
    ///
    /// Default: `login`, `index`
    pub headerless_routes: BTreeSet<String>,

    /// Policy for unrecognised segments.
    ///
    /// Default: [`UnknownSegmentPolicy::Allow`]
    pub unknown_segments: UnknownSegmentPolicy,
}

impl GuardConfig {
    /// Set the login path.
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Add a public segment.
    #[must_use]
    pub fn with_public_route(mut self, segment: impl Into<String>) -> Self {
        self.public_routes.insert(segment.into());
        self
    }

    /// Add a header-less segment.
    #[must_use]
    pub fn with_headerless_route(mut self, segment: impl Into<String>) -> Self {
        self.headerless_routes.insert(segment.into());
        self
    }

    /// Set the unknown-segment policy.
    #[must_use]
    pub const fn with_unknown_segments(mut self, policy: UnknownSegmentPolicy) -> Self {
        self.unknown_segments = policy;
        self
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        let defaults = [routes::LOGIN, routes::INDEX];
        Self {
            login_path: routes::LOGIN_PATH.to_string(),
            public_routes: defaults.iter().map(ToString::to_string).collect(),
            headerless_routes: defaults.iter().map(ToString::to_string).collect(),
            unknown_segments: UnknownSegmentPolicy::Allow,
        }
    }
}

/// Artificial latency of the mock credential check.
///
/// Default: 1 second, like the fake API it stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLatency(pub Duration);

impl MockLatency {
    /// No delay, for tests.
    pub const NONE: Self = Self(Duration::ZERO);

    /// Latency in milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

impl Default for MockLatency {
    fn default() -> Self {
        Self(Duration::from_secs(1))
    }
}

/// Client facade configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upper bound on waiting for the outcome of a request.
    ///
    /// Storage and credential calls carry no timeouts of their own; this only
    /// keeps a caller from hanging if an outcome is lost.
    ///
    /// Default: 30 seconds
    pub response_timeout: Duration,

    /// Grace period for in-flight effects on shutdown.
    ///
    /// Default: 5 seconds
    pub shutdown_timeout: Duration,
}

impl ClientConfig {
    /// Set the response timeout.
    #[must_use]
    pub const fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Set the shutdown grace period.
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Complete configuration of an auth deployment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthConfig {
    /// File backing the key-value store; `None` keeps everything in memory.
    pub storage_path: Option<PathBuf>,

    /// Session storage keys.
    pub keys: SessionKeys,

    /// Route guard settings.
    pub guard: GuardConfig,

    /// Mock credential check latency.
    pub mock_latency: MockLatency,

    /// Client facade settings.
    pub client: ClientConfig,
}

impl AuthConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(env_vars::STORAGE_PATH).filter(|p| !p.trim().is_empty()) {
            config.storage_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(env_vars::MOCK_LATENCY_MS) {
            let millis = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: env_vars::MOCK_LATENCY_MS,
                value: raw.clone(),
            })?;
            config.mock_latency = MockLatency::from_millis(millis);
        }

        if let Some(raw) = lookup(env_vars::UNKNOWN_SEGMENTS) {
            config.guard.unknown_segments = raw.parse()?;
        }

        Ok(config)
    }
}
