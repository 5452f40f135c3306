//! Mock provider implementations for testing.
//!
//! This module provides simple, in-memory implementations of the provider
//! traits for use in unit and integration tests, and for the demo binary.

pub mod credentials;
pub mod kv;

pub use credentials::{DemoAccount, MockCredentialProvider, demo_accounts};
pub use kv::InMemoryKeyValueStore;
