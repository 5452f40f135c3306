//! Authentication constants.

/// Storage keys of the persisted session.
pub mod storage_keys {
    /// Key holding the opaque session token.
    pub const TOKEN: &str = "@auth_token";

    /// Key holding the JSON-serialised user record.
    pub const USER: &str = "@user_data";
}

/// Route names understood by the guard.
pub mod routes {
    /// Path of the login screen.
    pub const LOGIN_PATH: &str = "/login";

    /// Segment of the login screen.
    pub const LOGIN: &str = "login";

    /// Segment used for the root path `/`.
    pub const INDEX: &str = "index";
}

/// Environment variables read by [`AuthConfig::from_env`](crate::config::AuthConfig::from_env).
pub mod env_vars {
    /// Path of the JSON file backing the key-value store.
    pub const STORAGE_PATH: &str = "ROLEGATE_STORAGE_PATH";

    /// Artificial latency of the mock credential check, in milliseconds.
    pub const MOCK_LATENCY_MS: &str = "ROLEGATE_MOCK_LATENCY_MS";

    /// `allow` or `deny`: how the guard treats unrecognised segments.
    pub const UNKNOWN_SEGMENTS: &str = "ROLEGATE_UNKNOWN_SEGMENTS";
}
