//! Integration tests for the session lifecycle through `AuthClient`.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use rolegate_auth::{
    AuthClient, AuthEnvironment, AuthError, AuthPhase, Credentials, MockLatency, Role,
    SessionStore,
    mocks::{InMemoryKeyValueStore, MockCredentialProvider},
    stores::FileKeyValueStore,
};
use rolegate_auth::providers::KeyValueStore;
use std::time::Duration;

type MemoryClient = AuthClient<InMemoryKeyValueStore, MockCredentialProvider>;

/// Create a client over an in-memory store, returning the store for inspection.
fn create_test_client() -> (MemoryClient, InMemoryKeyValueStore) {
    rolegate_testing::init_test_tracing();
    let kv = InMemoryKeyValueStore::new();
    let env = AuthEnvironment::new(
        SessionStore::new(kv.clone()),
        MockCredentialProvider::new(MockLatency::NONE),
    );
    (AuthClient::new(env), kv)
}

fn file_client(path: &std::path::Path) -> AuthClient<FileKeyValueStore, MockCredentialProvider> {
    AuthClient::new(AuthEnvironment::new(
        SessionStore::new(FileKeyValueStore::new(path)),
        MockCredentialProvider::new(MockLatency::NONE),
    ))
}

#[tokio::test]
async fn test_fresh_start_settles_logged_out() {
    let (client, _) = create_test_client();

    let before = client.snapshot().await;
    assert!(before.is_loading);
    assert!(!before.is_initialized);
    assert_eq!(before.phase(), AuthPhase::Initializing);

    let after = client.initialize().await;
    assert!(after.is_ok());
    let after = client.snapshot().await;
    assert!(after.is_initialized);
    assert!(!after.is_loading);
    assert!(!after.is_authenticated);
    assert!(after.error.is_none());
}

#[tokio::test]
async fn test_token_with_unparsable_user_is_cleared() {
    let (client, kv) = create_test_client();
    kv.insert_raw("@auth_token", "left-over-token");
    kv.insert_raw("@user_data", "{\"id\": 7, broken");

    assert!(client.initialize().await.is_ok());

    let state = client.snapshot().await;
    assert_eq!(state.phase(), AuthPhase::LoggedOut);
    assert!(state.user.is_none());
    assert!(state.token.is_none());
    assert!(!kv.contains_key("@auth_token"));
    assert!(!kv.contains_key("@user_data"));
}

#[tokio::test]
async fn test_bad_credentials_surface_the_message() {
    let (client, kv) = create_test_client();
    assert!(client.initialize().await.is_ok());

    let result = client.login(Credentials::new("bad", "bad")).await;
    assert_eq!(result, Err(AuthError::InvalidCredentials));

    let state = client.snapshot().await;
    assert_eq!(state.phase(), AuthPhase::LoggedOut);
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert!(!state.is_loading);
    assert!(kv.is_empty());

    // The next request clears the message.
    let user = client.login(Credentials::new("bia@example.com", "student123")).await;
    assert_eq!(user.map(|u| u.role), Ok(Role::Student));
    assert!(client.snapshot().await.error.is_none());
}

#[tokio::test]
async fn test_bad_login_while_authenticated_keeps_stored_session() {
    let (client, kv) = create_test_client();
    assert!(client.initialize().await.is_ok());
    assert!(client.login(Credentials::new("admin@example.com", "admin123")).await.is_ok());
    let stored_token = kv.get_raw("@auth_token");
    let stored_user = kv.get_raw("@user_data");
    assert!(stored_token.is_some());

    let result = client.login(Credentials::new("bad", "bad")).await;
    assert_eq!(result, Err(AuthError::InvalidCredentials));

    let state = client.snapshot().await;
    assert_eq!(state.phase(), AuthPhase::LoggedOut);
    assert_eq!(state.error.as_deref(), Some("Invalid credentials"));
    assert!(state.user.is_none());
    assert!(state.token.is_none());

    // Only a logout removes what was persisted.
    assert_eq!(kv.get_raw("@auth_token"), stored_token);
    assert_eq!(kv.get_raw("@user_data"), stored_user);
}

#[tokio::test]
async fn test_overlapping_initialize_does_not_erase_new_session() {
    let kv = InMemoryKeyValueStore::new().with_latency(Duration::from_millis(100));
    let env = AuthEnvironment::new(
        SessionStore::new(kv.clone()),
        MockCredentialProvider::new(MockLatency::NONE),
    );
    let client = AuthClient::new(env);

    let first = client.clone();
    let first = tokio::spawn(async move { first.initialize().await });
    tokio::time::sleep(Duration::from_millis(150)).await;

    // Starts while the first restore is still clearing the empty store.
    assert!(client.clone().initialize().await.is_ok());
    assert!(first.await.expect("initialize task panicked").is_ok());

    assert!(client.login(Credentials::new("bia@example.com", "student123")).await.is_ok());

    // Leave room for any second restore to reach storage.
    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = client.snapshot().await;
    assert!(state.is_authenticated);
    assert_eq!(kv.len(), 2);
    assert_eq!(kv.get_raw("@auth_token"), state.token);
}

#[tokio::test]
async fn test_login_recovers_from_corrupt_session_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, "{ broken").await.unwrap();

    let client = file_client(&path);
    let state = client.initialize().await.unwrap();
    assert_eq!(state.phase(), AuthPhase::LoggedOut);

    let user = client.login(Credentials::new("bia@example.com", "student123")).await;
    assert_eq!(user.map(|u| u.role), Ok(Role::Student));
    let again = client.login(Credentials::new("bia@example.com", "student123")).await;
    assert!(again.is_ok());

    let store = FileKeyValueStore::new(&path);
    assert_eq!(store.get("@auth_token").await, Ok(client.snapshot().await.token));
}

#[tokio::test]
async fn test_login_persists_and_logout_clears() {
    let (client, kv) = create_test_client();
    assert!(client.initialize().await.is_ok());

    let user = client.login(Credentials::new("111.444.777-35", "trainer123")).await;
    assert_eq!(user.as_ref().map(|u| u.role), Ok(Role::Trainer));

    let state = client.snapshot().await;
    assert!(state.is_authenticated);
    assert_eq!(state.role(), Some(Role::Trainer));
    assert!(state.authenticated_at.is_some());
    assert_eq!(kv.get_raw("@auth_token"), state.token);

    assert_eq!(client.logout().await, Ok(()));
    let state = client.snapshot().await;
    assert_eq!(state.phase(), AuthPhase::LoggedOut);
    assert!(kv.is_empty());
}

#[tokio::test]
async fn test_logout_succeeds_when_storage_fails() {
    let (client, kv) = create_test_client();
    assert!(client.initialize().await.is_ok());
    assert!(client.login(Credentials::new("admin@example.com", "admin123")).await.is_ok());

    kv.set_fail_writes(true);
    assert_eq!(client.logout().await, Ok(()));

    let state = client.snapshot().await;
    assert!(!state.is_authenticated);
    assert!(state.user.is_none());
    // The stored pair is still there; only the in-memory session is gone.
    assert_eq!(kv.len(), 2);
}

#[tokio::test]
async fn test_login_fails_closed_when_session_cannot_be_saved() {
    let (client, kv) = create_test_client();
    assert!(client.initialize().await.is_ok());
    kv.set_fail_writes(true);

    let result = client.login(Credentials::new("bia@example.com", "student123")).await;
    assert_eq!(result, Err(AuthError::SessionPersistFailed));

    let state = client.snapshot().await;
    assert!(!state.is_authenticated);
    assert_eq!(state.error.as_deref(), Some("Could not save session"));
}

#[tokio::test]
async fn test_concurrent_logins_both_resolve() {
    let kv = InMemoryKeyValueStore::new();
    let env = AuthEnvironment::new(
        SessionStore::new(kv.clone()),
        MockCredentialProvider::new(MockLatency::from_millis(20)),
    );
    let client = AuthClient::new(env);
    assert!(client.initialize().await.is_ok());

    let (first, second) = tokio::join!(
        client.login(Credentials::new("bia@example.com", "student123")),
        client.login(Credentials::new("carlos@example.com", "trainer123")),
    );
    assert!(first.is_ok());
    assert!(second.is_ok());

    let state = client.snapshot().await;
    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.in_flight, 0);
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = file_client(&path);
    assert!(first.initialize().await.is_ok());
    assert!(first.login(Credentials::new("bia@example.com", "student123")).await.is_ok());
    let token = first.snapshot().await.token;
    assert_eq!(first.shutdown().await, Ok(()));

    let second = file_client(&path);
    assert!(second.initialize().await.is_ok());
    let state = second.snapshot().await;
    assert!(state.is_authenticated);
    assert_eq!(state.token, token);
    assert_eq!(state.role(), Some(Role::Student));

    assert_eq!(second.logout().await, Ok(()));
    let store = FileKeyValueStore::new(&path);
    assert_eq!(store.get("@auth_token").await, Ok(None));
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_login() {
    let kv = InMemoryKeyValueStore::new();
    let env = AuthEnvironment::new(
        SessionStore::new(kv.clone()),
        MockCredentialProvider::new(MockLatency::from_millis(50)),
    );
    let client = AuthClient::new(env);
    assert!(client.initialize().await.is_ok());

    let pending = client.clone();
    let login = tokio::spawn(async move {
        pending.login(Credentials::new("bia@example.com", "student123")).await
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(client.shutdown().await, Ok(()));
    // The credential check finished and the session was written.
    assert_eq!(kv.len(), 2);
    let _ = login.await;
}

#[test]
fn test_initialize_from_blocking_context() {
    let (client, _) = create_test_client();
    let state = tokio_test::block_on(client.initialize());
    assert_eq!(state.map(|s| s.phase()), Ok(AuthPhase::LoggedOut));
}
