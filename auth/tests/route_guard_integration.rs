//! Integration tests for the route guard against live auth state.

use rolegate_auth::{
    AuthClient, AuthEnvironment, Credentials, GuardConfig, GuardedNavigator, MockLatency, Role,
    RouteGuard, RoutePath, SessionStore, UnknownSegmentPolicy,
    mocks::{InMemoryKeyValueStore, MockCredentialProvider},
};

type MemoryClient = AuthClient<InMemoryKeyValueStore, MockCredentialProvider>;

async fn logged_in(identifier: &str, secret: &str) -> MemoryClient {
    let client = AuthClient::new(AuthEnvironment::new(
        SessionStore::new(InMemoryKeyValueStore::new()),
        MockCredentialProvider::new(MockLatency::NONE),
    ));
    assert!(client.initialize().await.is_ok());
    if !identifier.is_empty() {
        assert!(client.login(Credentials::new(identifier, secret)).await.is_ok());
    }
    client
}

async fn redirect_for(client: &MemoryClient, guard: &RouteGuard, path: &str) -> Option<String> {
    guard.evaluate(&RoutePath::parse(path), &client.snapshot().await).redirect
}

#[tokio::test]
async fn test_authenticated_trainer_on_login_goes_to_trainer_home() {
    let client = logged_in("carlos@example.com", "trainer123").await;
    let guard = RouteGuard::default();
    assert_eq!(redirect_for(&client, &guard, "/login").await.as_deref(), Some("/trainer"));
}

#[tokio::test]
async fn test_student_in_admin_area_goes_to_student_home() {
    let client = logged_in("390.533.447-05", "student123").await;
    let guard = RouteGuard::default();
    assert_eq!(redirect_for(&client, &guard, "/admin").await.as_deref(), Some("/student"));
    assert_eq!(redirect_for(&client, &guard, "/student/workouts").await, None);
}

#[tokio::test]
async fn test_anonymous_in_trainer_area_goes_to_login() {
    let client = logged_in("", "").await;
    let guard = RouteGuard::default();
    assert_eq!(redirect_for(&client, &guard, "/trainer").await.as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_every_role_stays_in_own_area() {
    let accounts = [
        ("admin@example.com", "admin123", Role::Admin),
        ("carlos@example.com", "trainer123", Role::Trainer),
        ("bia@example.com", "student123", Role::Student),
    ];
    let guard = RouteGuard::default();

    for (identifier, secret, role) in accounts {
        let client = logged_in(identifier, secret).await;
        for target in Role::ALL {
            let expected = (target != role).then(|| role.home_path().to_string());
            assert_eq!(redirect_for(&client, &guard, target.home_path()).await, expected);
        }
    }
}

#[tokio::test]
async fn test_deny_policy_closes_unknown_areas() {
    let client = logged_in("admin@example.com", "admin123").await;
    let allow = RouteGuard::default();
    let deny =
        RouteGuard::new(GuardConfig::default().with_unknown_segments(UnknownSegmentPolicy::Deny));

    assert_eq!(redirect_for(&client, &allow, "/settings").await, None);
    assert_eq!(redirect_for(&client, &deny, "/settings").await.as_deref(), Some("/admin"));
}

#[tokio::test]
async fn test_navigator_restores_into_home() {
    let client = logged_in("admin@example.com", "admin123").await;
    let navigator = GuardedNavigator::spawn(client.clone(), RouteGuard::default(), "/");

    let state = navigator.wait_for(|s| s.path.first_segment() == "admin").await;
    let state = state.map(|s| (s.path.to_string(), s.decision.hide_header, s.decision.is_loading));
    assert_eq!(state, Some(("/admin".to_string(), false, false)));
}
