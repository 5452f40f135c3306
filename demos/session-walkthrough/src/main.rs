//! Session walkthrough binary
//!
//! Restores a session, logs in as each demo role, shows where the route
//! guard sends them and logs out again.
//!
//! Set `ROLEGATE_STORAGE_PATH` to keep the session in a file; run twice to
//! see the second run restore it.

use anyhow::Context;
use rolegate_auth::mocks::{InMemoryKeyValueStore, MockCredentialProvider, demo_accounts};
use rolegate_auth::providers::KeyValueStore;
use rolegate_auth::stores::FileKeyValueStore;
use rolegate_auth::{
    AuthClient, AuthConfig, AuthEnvironment, Credentials, GuardedNavigator, RouteGuard, RoutePath,
    SessionStore, format_cpf, is_valid_cpf,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SAMPLE_ROUTES: [&str; 5] = ["/", "/login", "/admin/users", "/trainer/students", "/student"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_walkthrough=info,rolegate_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AuthConfig::from_env().context("invalid rolegate configuration")?;

    println!("=== Session Walkthrough ===\n");

    match config.storage_path.clone() {
        Some(path) => {
            println!("Session file: {}", path.display());
            walkthrough(FileKeyValueStore::new(path), config).await
        },
        None => {
            println!("Session kept in memory");
            walkthrough(InMemoryKeyValueStore::new(), config).await
        },
    }
}

async fn walkthrough<K>(kv: K, config: AuthConfig) -> anyhow::Result<()>
where
    K: KeyValueStore + Clone + 'static,
{
    let env = AuthEnvironment::new(
        SessionStore::with_keys(kv, config.keys.clone()),
        MockCredentialProvider::new(config.mock_latency),
    );
    let client = AuthClient::with_config(env, config.client);
    let guard = RouteGuard::new(config.guard.clone());

    let restored = client.initialize().await?;
    match &restored.user {
        Some(user) => println!("Restored session for {} ({})", user.name, user.role),
        None => println!("No stored session"),
    }

    let navigator = GuardedNavigator::spawn(client.clone(), guard.clone(), "/");
    if let Some(state) = navigator.wait_for(|s| !s.decision.is_loading).await {
        println!("Landing route: {}", state.path);
    }

    // A restored session is replaced by each demo login below.
    if restored.is_authenticated {
        client.logout().await?;
    }

    println!("\n>>> Wrong password");
    let rejected = client.login(Credentials::new("admin@example.com", "nope")).await;
    if let Err(error) = rejected {
        println!("Rejected: {error}");
    }

    for account in demo_accounts() {
        let identifier = format_cpf(&account.user.tax_id);
        println!(
            "\n>>> Login as {} with CPF {identifier} (valid: {})",
            account.user.role,
            is_valid_cpf(&identifier)
        );

        let user = client.login(Credentials::new(identifier, account.secret.clone())).await?;
        let state = client.snapshot().await;

        for route in SAMPLE_ROUTES {
            let decision = guard.evaluate(&RoutePath::parse(route), &state);
            match decision.redirect {
                Some(target) => println!("  {route:<20} -> {target}"),
                None => println!("  {route:<20} ok"),
            }
        }

        navigator.navigate("/admin");
        let home = user.role.home_path();
        if let Some(state) = navigator.wait_for(|s| s.path.to_string() == home).await {
            println!("  navigator settled on {}", state.path);
        }

        client.logout().await?;
    }

    // Keep the last role signed in so a second run has something to restore.
    let keep = demo_accounts().into_iter().last().filter(|_| config.storage_path.is_some());
    if let Some(account) = keep {
        let user = client.login(Credentials::new(account.user.email, account.secret)).await?;
        println!("\nLeft {} signed in for the next run", user.name);
    }

    drop(navigator);
    client.shutdown().await?;

    println!("\n=== Walkthrough Complete ===");
    Ok(())
}
