//! Mock credential provider.
//!
//! Stands in for the login API with a fixed directory of demo accounts, one
//! per role, and a fixed artificial delay.

use crate::config::MockLatency;
use crate::cpf::strip_cpf_mask;
use crate::error::{AuthError, Result};
use crate::providers::CredentialProvider;
use crate::state::{Role, Session, User};
use std::future::Future;
use std::sync::Arc;

/// A demo user together with the password that unlocks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    /// The user record handed out on login.
    pub user: User,

    /// Accepted password.
    pub secret: String,
}

impl DemoAccount {
    /// Returns `true` if `identifier` names this account.
    ///
    /// Emails match case-insensitively; CPFs match with or without mask.
    #[must_use]
    pub fn matches(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        if identifier.contains('@') {
            return identifier.eq_ignore_ascii_case(&self.user.email);
        }
        let digits = strip_cpf_mask(identifier);
        !digits.is_empty() && digits == self.user.tax_id
    }
}

/// The built-in demo directory: an admin, a trainer and a student.
#[must_use]
pub fn demo_accounts() -> Vec<DemoAccount> {
    let account = |id: &str, name: &str, tax_id: &str, email: &str, role: Role, secret: &str| {
        DemoAccount {
            user: User {
                id: id.to_string(),
                name: name.to_string(),
                tax_id: tax_id.to_string(),
                email: email.to_string(),
                profile_image: None,
                role,
            },
            secret: secret.to_string(),
        }
    };

    vec![
        account("1", "Marina Costa", "52998224725", "admin@example.com", Role::Admin, "admin123"),
        account("2", "Carlos Lima", "11144477735", "carlos@example.com", Role::Trainer, "trainer123"),
        account("3", "Bia Souza", "39053344705", "bia@example.com", Role::Student, "student123"),
    ]
}

/// Mock credential provider.
///
/// Waits [`MockLatency`], then checks the pair against its directory using a
/// constant-time secret comparison. Each successful login gets a fresh
/// 256-bit random token.
#[derive(Debug, Clone)]
pub struct MockCredentialProvider {
    accounts: Arc<Vec<DemoAccount>>,
    latency: MockLatency,
}

impl MockCredentialProvider {
    /// Create a provider over the demo directory.
    #[must_use]
    pub fn new(latency: MockLatency) -> Self {
        Self::with_accounts(demo_accounts(), latency)
    }

    /// Create a provider over a custom directory.
    #[must_use]
    pub fn with_accounts(accounts: Vec<DemoAccount>, latency: MockLatency) -> Self {
        Self {
            accounts: Arc::new(accounts),
            latency,
        }
    }

    /// The accounts this provider accepts.
    #[must_use]
    pub fn accounts(&self) -> &[DemoAccount] {
        &self.accounts
    }

    /// Generate a cryptographically secure random token.
    ///
    /// Returns a 256-bit random token encoded as base64url (43 characters).
    fn generate_token() -> String {
        use base64::Engine;
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        let mut random_bytes = [0u8; 32];
        rng.fill_bytes(&mut random_bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes)
    }
}

impl Default for MockCredentialProvider {
    fn default() -> Self {
        Self::new(MockLatency::default())
    }
}

impl CredentialProvider for MockCredentialProvider {
    fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> impl Future<Output = Result<Session>> + Send {
        let accounts = Arc::clone(&self.accounts);
        let latency = self.latency;
        let identifier = identifier.to_string();
        let secret = secret.to_string();

        async move {
            tokio::time::sleep(latency.0).await;

            let account = accounts.iter().find(|account| account.matches(&identifier));
            let accepted = account.filter(|account| {
                constant_time_eq::constant_time_eq(secret.as_bytes(), account.secret.as_bytes())
            });

            match accepted {
                Some(account) => Ok(Session {
                    token: Self::generate_token(),
                    user: account.user.clone(),
                }),
                None => {
                    tracing::warn!(known_identifier = account.is_some(), "Credentials rejected");
                    Err(AuthError::InvalidCredentials)
                },
            }
        }
    }
}
