//! # Rolegate Testing
//!
//! Testing utilities and helpers for rolegate reducers.
//!
//! This crate provides:
//! - A deterministic [`FixedClock`]
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for returned effects
//! - [`init_test_tracing`] for readable logs in failing tests
//!
//! ## Example
//!
//! ```ignore
//! use rolegate_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(AuthReducer::new())
//!     .with_env(test_environment())
//!     .given_state(AuthState::default())
//!     .when_action(AuthAction::Logout)
//!     .then_state(|state| assert!(state.is_loading))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use rolegate_core::environment::Clock;


/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use rolegate_testing::mocks::FixedClock;
    /// use rolegate_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
/// Honours `RUST_LOG`, defaulting to `debug` for rolegate crates.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rolegate_auth=debug,rolegate_runtime=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
