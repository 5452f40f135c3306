//! Authentication providers.
//!
//! This module defines traits for the external collaborators of the auth
//! system. These traits enable dependency injection and make the session
//! lifecycle testable without a device or a backend.
//!
//! # Architecture
//!
//! Providers are **interfaces**, not implementations. The reducer depends
//! on these traits; [`mocks`](crate::mocks) and [`stores`](crate::stores)
//! provide concrete implementations.
//!
//! ```text
//! AuthReducer ──effects──▶ SessionStore ──▶ KeyValueStore (trait)
//!             └─effects──▶ CredentialProvider (trait)
//! ```

pub mod credentials;
pub mod kv;

pub use credentials::CredentialProvider;
pub use kv::KeyValueStore;
