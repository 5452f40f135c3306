//! # Rolegate Authentication & Route Guarding
//!
//! Session lifecycle, role-based route guarding and CPF validation for a
//! dashboard client with three roles: admin, trainer and student.
//!
//! ## Features
//!
//! - **Session lifecycle**: restore on startup, login, logout, driven by a
//!   reducer over the rolegate runtime
//! - **Atomic persistence**: token and user record are stored and removed
//!   together through any [`KeyValueStore`](providers::KeyValueStore)
//! - **Route guard**: keeps every role inside its own area and anonymous
//!   users on public screens
//! - **CPF**: check-digit validation and input masking
//! - **Testable**: in-memory store and mock credential check in [`mocks`]
//!
//! ## Architecture
//!
//! The lifecycle is implemented as reducers and effects:
//!
//! ```text
//! Action → Reducer → (State, Effects) → Effect Execution → More Actions
//! ```
//!
//! [`AuthClient`] wraps the runtime store and turns request/outcome pairs
//! into plain `async` calls; [`GuardedNavigator`] re-runs the [`RouteGuard`]
//! whenever the route or the auth state changes.
//!
//! ## Example: Login
//!
//! ```rust,ignore
//! use rolegate_auth::*;
//!
//! let client = AuthClient::new(environment);
//! client.initialize().await?;
//!
//! let user = client.login(Credentials::new("529.982.247-25", "admin123")).await?;
//! assert_eq!(user.role, Role::Admin);
//!
//! let decision = RouteGuard::default()
//!     .evaluate(&RoutePath::parse("/login"), &client.snapshot().await);
//! assert_eq!(decision.redirect.as_deref(), Some("/admin"));
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod actions;
pub mod client;
pub mod config;
pub mod constants;
pub mod cpf;
pub mod environment;
pub mod error;
pub mod guard;
pub mod providers;
pub mod reducers;
pub mod session;
pub mod state;
pub mod stores;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use actions::AuthAction;
pub use client::{AuthClient, AuthStore};
pub use config::{AuthConfig, ClientConfig, GuardConfig, MockLatency, SessionKeys, UnknownSegmentPolicy};
pub use cpf::{Cpf, format_cpf, is_valid_cpf, strip_cpf_mask};
pub use environment::AuthEnvironment;
pub use error::{AuthError, Result, StorageError};
pub use guard::{GuardDecision, GuardedNavigator, NavigationState, RouteGuard, RoutePath};
pub use reducers::AuthReducer;
pub use session::{SessionStore, StoredParts};
pub use state::{AuthPhase, AuthState, Credentials, Role, Session, User};
