//! Reactive route guarding.
//!
//! [`GuardedNavigator`] keeps the current route and re-runs the
//! [`RouteGuard`] whenever the route or the auth state changes. Redirects are
//! followed automatically and the settled result is published on a
//! `tokio::sync::watch` channel, so a renderer only ever sees routes the
//! guard allows.

use super::{GuardDecision, RouteGuard, RoutePath};
use crate::client::AuthClient;
use crate::providers::{CredentialProvider, KeyValueStore};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Consecutive redirects followed before giving up on a route.
pub const MAX_REDIRECT_HOPS: usize = 4;

/// The route being shown and the guard's verdict on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    /// Route after following redirects.
    pub path: RoutePath,

    /// Decision for `path`. Carries a redirect only if the hop limit was hit.
    pub decision: GuardDecision,
}

/// Route holder that keeps itself consistent with the auth state.
///
/// Runs a background task for as long as the navigator lives; dropping it
/// stops the task.
#[derive(Debug)]
pub struct GuardedNavigator {
    path: Arc<watch::Sender<RoutePath>>,
    current: watch::Receiver<NavigationState>,
    task: JoinHandle<()>,
}

impl GuardedNavigator {
    /// Start guarding `initial_path` against the client's state.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn<K, P>(client: AuthClient<K, P>, guard: RouteGuard, initial_path: &str) -> Self
    where
        K: KeyValueStore + Clone + 'static,
        P: CredentialProvider + Clone + 'static,
    {
        let initial = RoutePath::parse(initial_path);
        let (path_tx, path_rx) = watch::channel(initial.clone());
        let path_tx = Arc::new(path_tx);

        let (current_tx, current) = watch::channel(NavigationState {
            decision: GuardDecision {
                redirect: None,
                hide_header: guard.should_hide_header(&initial),
                is_loading: true,
            },
            path: initial,
        });

        let task = tokio::spawn(run(client, guard, Arc::clone(&path_tx), path_rx, current_tx));

        Self {
            path: path_tx,
            current,
            task,
        }
    }

    /// Request a new route. The guard may send the user elsewhere.
    pub fn navigate(&self, path: &str) {
        let path = RoutePath::parse(path);
        tracing::debug!(%path, "Navigation requested");
        self.path.send_replace(path);
    }

    /// The latest settled navigation state.
    #[must_use]
    pub fn current(&self) -> NavigationState {
        self.current.borrow().clone()
    }

    /// Observe navigation state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.current.clone()
    }

    /// Wait until the navigation state satisfies `predicate`.
    ///
    /// Returns `None` if the background task has stopped.
    pub async fn wait_for<F>(&self, mut predicate: F) -> Option<NavigationState>
    where
        F: FnMut(&NavigationState) -> bool,
    {
        let mut rx = self.current.clone();
        let state = rx.wait_for(|state| predicate(state)).await.ok()?;
        Some(state.clone())
    }
}

impl Drop for GuardedNavigator {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<K, P>(
    client: AuthClient<K, P>,
    guard: RouteGuard,
    path_tx: Arc<watch::Sender<RoutePath>>,
    mut path_rx: watch::Receiver<RoutePath>,
    current_tx: watch::Sender<NavigationState>,
) where
    K: KeyValueStore + Clone + 'static,
    P: CredentialProvider + Clone + 'static,
{
    let mut auth_rx = client.subscribe();

    loop {
        let requested = path_rx.borrow_and_update().clone();
        let state = client.snapshot().await;

        let mut path = requested.clone();
        let mut decision = guard.evaluate(&path, &state);
        let mut hops = 0;
        while let Some(target) = decision.redirect.clone() {
            if hops == MAX_REDIRECT_HOPS {
                tracing::warn!(%path, %target, "Redirect limit reached");
                break;
            }
            tracing::debug!(from = %path, to = %target, "Following redirect");
            path = RoutePath::parse(&target);
            decision = guard.evaluate(&path, &state);
            hops += 1;
        }

        if path != requested {
            // Record where we ended up without waking this loop again, unless a
            // newer navigation already replaced the request.
            path_tx.send_if_modified(|current| {
                if *current == requested {
                    *current = path.clone();
                }
                false
            });
        }

        current_tx.send_if_modified(|current| {
            let next = NavigationState { path, decision };
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });

        tokio::select! {
            changed = auth_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            },
            changed = path_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            },
        }
    }
}
