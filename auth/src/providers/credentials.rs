//! Credential check trait.

use crate::error::Result;
use crate::state::Session;
use std::future::Future;

/// Credential check.
///
/// Turns an identifier/secret pair into a fresh [`Session`]. In the mobile
/// client this is a mocked API call; production deployments would put a
/// real HTTP client behind it.
pub trait CredentialProvider: Send + Sync {
    /// Authenticate a user.
    ///
    /// # Arguments
    ///
    /// - `identifier`: email address or CPF
    /// - `secret`: password
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`](crate::AuthError::InvalidCredentials)
    /// if the pair is rejected.
    fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> impl Future<Output = Result<Session>> + Send;
}
