//! Session persistence.
//!
//! [`SessionStore`] keeps the token and the user record of a [`Session`]
//! under two keys of a [`KeyValueStore`], always written and removed
//! together. Storage failures stop here: they are logged and turned into
//! negative results, never propagated to callers.

use crate::config::SessionKeys;
use crate::providers::KeyValueStore;
use crate::state::{Session, User};

/// What was found under the session keys, each read judged on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredParts {
    /// Token, if present and non-empty.
    pub token: Option<String>,

    /// User record, if present and parsable.
    pub user: Option<User>,
}

impl StoredParts {
    /// Returns `true` if exactly one half of a session is present.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.token.is_some() != self.user.is_some()
    }

    /// The complete session, if both halves are present.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        match (self.token, self.user) {
            (Some(token), Some(user)) => Some(Session { token, user }),
            _ => None,
        }
    }
}

/// Session persistence over a key-value store.
///
/// # Guarantees
///
/// - `save` writes both keys in one `multi_set`
/// - `clear` removes both keys in one `multi_remove` and is idempotent
/// - `load` yields a complete session or nothing
#[derive(Debug, Clone)]
pub struct SessionStore<K> {
    kv: K,
    keys: SessionKeys,
}

impl<K: KeyValueStore> SessionStore<K> {
    /// Create a session store with the default keys.
    #[must_use]
    pub fn new(kv: K) -> Self {
        Self::with_keys(kv, SessionKeys::default())
    }

    /// Create a session store with custom keys.
    #[must_use]
    pub const fn with_keys(kv: K, keys: SessionKeys) -> Self {
        Self { kv, keys }
    }

    /// The underlying key-value store.
    #[must_use]
    pub const fn kv(&self) -> &K {
        &self.kv
    }

    /// The keys the session lives under.
    #[must_use]
    pub const fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Persist a session.
    ///
    /// Returns `false` if the user record cannot be encoded or the write
    /// fails; nothing is stored in that case.
    pub async fn save(&self, session: &Session) -> bool {
        let user_json = match serde_json::to_string(&session.user) {
            Ok(json) => json,
            Err(error) => {
                tracing::error!(%error, "Failed to encode user record");
                return false;
            },
        };

        let pairs = [
            (self.keys.token.clone(), session.token.clone()),
            (self.keys.user.clone(), user_json),
        ];

        match self.kv.multi_set(&pairs).await {
            Ok(()) => {
                tracing::debug!(user_id = %session.user.id, "Session saved");
                true
            },
            Err(error) => {
                tracing::error!(%error, "Failed to save session");
                false
            },
        }
    }

    /// Returns `true` if a token is stored.
    ///
    /// A read failure counts as "no session".
    pub async fn has_session(&self) -> bool {
        self.read_token().await.is_some()
    }

    /// Read both halves of the session concurrently.
    pub async fn load_parts(&self) -> StoredParts {
        let (token, user) = futures::join!(self.read_token(), self.read_user());
        StoredParts { token, user }
    }

    /// Load the stored session.
    ///
    /// Checks for a token first, then reads token and user concurrently.
    /// Returns `None` unless both are present and well-formed.
    pub async fn load(&self) -> Option<Session> {
        if !self.has_session().await {
            return None;
        }

        let parts = self.load_parts().await;
        if parts.is_partial() {
            tracing::warn!(
                has_token = parts.token.is_some(),
                has_user = parts.user.is_some(),
                "Stored session is incomplete"
            );
        }
        parts.into_session()
    }

    /// Remove the stored session.
    ///
    /// Safe to call when nothing is stored. Returns `false` if the removal
    /// fails.
    pub async fn clear(&self) -> bool {
        match self.kv.multi_remove(&self.keys.both()).await {
            Ok(()) => {
                tracing::debug!("Session cleared");
                true
            },
            Err(error) => {
                tracing::error!(%error, "Failed to clear session");
                false
            },
        }
    }

    async fn read_token(&self) -> Option<String> {
        match self.kv.get(&self.keys.token).await {
            Ok(Some(token)) if !token.is_empty() => Some(token),
            Ok(Some(_)) => {
                tracing::warn!("Stored token is empty, ignoring it");
                None
            },
            Ok(None) => None,
            Err(error) => {
                tracing::error!(%error, "Failed to read session token");
                None
            },
        }
    }

    async fn read_user(&self) -> Option<User> {
        let raw = match self.kv.get(&self.keys.user).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::error!(%error, "Failed to read user record");
                return None;
            },
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::warn!(%error, "Stored user record is malformed, ignoring it");
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::InMemoryKeyValueStore;
    use crate::state::Role;

    fn session() -> Session {
        Session {
            token: "token-abc".to_string(),
            user: User {
                id: "2".to_string(),
                name: "Carlos Lima".to_string(),
                tax_id: "11144477735".to_string(),
                email: "carlos@example.com".to_string(),
                profile_image: Some("avatars/carlos.png".to_string()),
                role: Role::Trainer,
            },
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = SessionStore::new(InMemoryKeyValueStore::new());

        assert!(store.save(&session()).await);
        assert!(store.has_session().await);
        assert_eq!(store.load().await, Some(session()));
    }

    #[tokio::test]
    async fn test_load_with_nothing_stored() {
        let store = SessionStore::new(InMemoryKeyValueStore::new());

        assert!(!store.has_session().await);
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_malformed_user_is_absent() {
        let kv = InMemoryKeyValueStore::new();
        kv.insert_raw("@auth_token", "token-abc");
        kv.insert_raw("@user_data", "{not json");
        let store = SessionStore::new(kv);

        let parts = store.load_parts().await;
        assert_eq!(parts.token.as_deref(), Some("token-abc"));
        assert!(parts.user.is_none());
        assert!(parts.is_partial());
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_user_without_token_is_absent() {
        let kv = InMemoryKeyValueStore::new();
        let user_json = serde_json::to_string(&session().user).unwrap_or_default();
        kv.insert_raw("@user_data", &user_json);
        let store = SessionStore::new(kv);

        assert!(!store.has_session().await);
        assert_eq!(store.load().await, None);
        assert!(store.load_parts().await.is_partial());
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let kv = InMemoryKeyValueStore::new();
        let store = SessionStore::new(kv.clone());
        assert!(store.save(&session()).await);

        assert!(store.clear().await);
        assert!(store.clear().await);
        assert!(kv.is_empty());
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_failed_write_stores_nothing() {
        let kv = InMemoryKeyValueStore::new();
        kv.set_fail_writes(true);
        let store = SessionStore::new(kv.clone());

        assert!(!store.save(&session()).await);
        assert!(!store.clear().await);
        assert!(kv.is_empty());
    }

    #[tokio::test]
    async fn test_failed_read_means_no_session() {
        let kv = InMemoryKeyValueStore::new();
        let store = SessionStore::new(kv.clone());
        assert!(store.save(&session()).await);

        kv.set_fail_reads(true);
        assert_eq!(store.load().await, None);
        assert_eq!(store.load_parts().await, StoredParts::default());
    }

    #[test]
    fn test_custom_keys() {
        let kv = InMemoryKeyValueStore::new();
        let store = SessionStore::with_keys(kv.clone(), SessionKeys::new("t", "u"));

        assert!(tokio_test::block_on(store.save(&session())));
        assert!(kv.contains_key("t"));
        assert!(kv.contains_key("u"));
        assert!(!kv.contains_key("@auth_token"));
    }
}
