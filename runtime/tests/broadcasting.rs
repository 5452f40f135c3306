//! Integration tests for Store action broadcasting
//!
//! Covers the request/outcome pattern the auth client is built on: a caller
//! sends a request carrying a correlation id and waits for the outcome action
//! an effect feeds back.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use rolegate_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
use rolegate_runtime::{Store, StoreError};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Start a request that resolves after `steps` hops
    Request { id: u64, steps: u32 },
    /// One hop of a request finished
    StepCompleted { id: u64, step: u32, of: u32 },
    /// Request resolved (terminal action)
    Resolved { id: u64 },
    /// Request that never resolves
    Stall { id: u64 },
    /// Outcome delivered after a timer
    ResolveLater { id: u64, after: Duration },
}

#[derive(Debug, Clone, Default)]
struct TestState {
    in_flight: u32,
    steps: Vec<(u64, u32)>,
    resolved: Vec<u64>,
}

#[derive(Clone)]
struct TestReducer;

#[derive(Clone)]
struct TestEnvironment;

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::Request { id, steps } => {
                state.in_flight += 1;
                if steps == 0 {
                    smallvec![Effect::future(async move { Some(TestAction::Resolved { id }) })]
                } else {
                    smallvec![Effect::future(async move {
                        Some(TestAction::StepCompleted { id, step: 1, of: steps })
                    })]
                }
            },

            TestAction::StepCompleted { id, step, of } => {
                state.steps.push((id, step));
                let next = if step < of {
                    TestAction::StepCompleted { id, step: step + 1, of }
                } else {
                    TestAction::Resolved { id }
                };
                smallvec![Effect::future(async move {
                    tokio::task::yield_now().await;
                    Some(next)
                })]
            },

            TestAction::Resolved { id } => {
                state.in_flight = state.in_flight.saturating_sub(1);
                state.resolved.push(id);
                smallvec![Effect::None]
            },

            TestAction::Stall { .. } => {
                state.in_flight += 1;
                smallvec![Effect::future(async { None })]
            },

            TestAction::ResolveLater { id, after } => smallvec![Effect::Delay {
                duration: after,
                action: Box::new(TestAction::Resolved { id }),
            }],
        }
    }
}

fn store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    Store::new(TestState::default(), TestReducer, TestEnvironment)
}

fn drain(rx: &mut tokio::sync::broadcast::Receiver<TestAction>) -> Vec<TestAction> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_wait_for_immediate_outcome() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Request { id: 1, steps: 0 },
            |action| matches!(action, TestAction::Resolved { id: 1 }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result, Ok(TestAction::Resolved { id: 1 }));
}

/// The outcome is reduced before the waiting caller wakes up.
#[tokio::test]
async fn test_outcome_is_reduced_before_caller_wakes() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Request { id: 42, steps: 3 },
            |action| matches!(action, TestAction::Resolved { id: 42 }),
            Duration::from_secs(1),
        )
        .await;

    assert!(result.is_ok());
    let (in_flight, steps, resolved) = store
        .state(|s| (s.in_flight, s.steps.clone(), s.resolved.clone()))
        .await;
    assert_eq!(in_flight, 0);
    assert_eq!(steps, vec![(42, 1), (42, 2), (42, 3)]);
    assert_eq!(resolved, vec![42]);
}

#[tokio::test]
async fn test_wait_times_out() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::Stall { id: 7 },
            |action| matches!(action, TestAction::Resolved { id: 7 }),
            Duration::from_millis(50),
        )
        .await;

    assert_eq!(result, Err(StoreError::Timeout));
    assert_eq!(store.state(|s| s.in_flight).await, 1);
}

/// Concurrent callers each receive their own outcome.
#[tokio::test]
async fn test_correlation_ids_separate_callers() {
    let store = Arc::new(store());
    let mut handles = vec![];

    for id in 1..=5 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .send_and_wait_for(
                    TestAction::Request { id, steps: 2 },
                    move |action| matches!(action, TestAction::Resolved { id: done } if *done == id),
                    Duration::from_secs(2),
                )
                .await
        }));
    }

    for (id, handle) in (1..=5).zip(handles) {
        let result = handle.await.expect("Task panicked");
        assert_eq!(result, Ok(TestAction::Resolved { id }));
    }

    let (steps, mut resolved) = store.state(|s| (s.steps.len(), s.resolved.clone())).await;
    resolved.sort_unstable();
    assert_eq!(steps, 10);
    assert_eq!(resolved, vec![1, 2, 3, 4, 5]);
}

/// Only actions produced by effects are broadcast, in the order they are fed back.
#[tokio::test]
async fn test_subscribers_see_effect_actions_only() {
    let store = store();
    let mut rx = store.subscribe_actions();

    let result = store
        .send_and_wait_for(
            TestAction::Request { id: 9, steps: 2 },
            |action| matches!(action, TestAction::Resolved { .. }),
            Duration::from_secs(1),
        )
        .await;
    assert!(result.is_ok());

    assert_eq!(
        drain(&mut rx),
        vec![
            TestAction::StepCompleted { id: 9, step: 1, of: 2 },
            TestAction::StepCompleted { id: 9, step: 2, of: 2 },
            TestAction::Resolved { id: 9 },
        ]
    );
}

#[tokio::test]
async fn test_independent_subscribers() {
    let store = store();
    let mut first = store.subscribe_actions();
    let mut second = store.subscribe_actions();

    for id in [1, 2] {
        let result = store
            .send_and_wait_for(
                TestAction::Request { id, steps: 0 },
                move |action| matches!(action, TestAction::Resolved { id: done } if *done == id),
                Duration::from_secs(1),
            )
            .await;
        assert!(result.is_ok());
    }

    assert_eq!(drain(&mut first).len(), 2);
    assert_eq!(drain(&mut second).len(), 2);
}

#[tokio::test]
async fn test_delayed_outcome_is_broadcast() {
    let store = store();

    let result = store
        .send_and_wait_for(
            TestAction::ResolveLater { id: 3, after: Duration::from_millis(10) },
            |action| matches!(action, TestAction::Resolved { id: 3 }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result, Ok(TestAction::Resolved { id: 3 }));
}

/// A subscriber that falls behind skips old actions instead of blocking the store.
#[tokio::test]
async fn test_lagging_subscriber() {
    let store = Store::with_broadcast_capacity(TestState::default(), TestReducer, TestEnvironment, 4);
    let mut rx = store.subscribe_actions();

    for id in 0..20 {
        let result = store
            .send_and_wait_for(
                TestAction::Request { id, steps: 0 },
                move |action| matches!(action, TestAction::Resolved { id: done } if *done == id),
                Duration::from_secs(1),
            )
            .await;
        assert!(result.is_ok());
    }

    let mut received = 0;
    let mut lagged = false;
    loop {
        match rx.try_recv() {
            Ok(_) => received += 1,
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => lagged = true,
            Err(_) => break,
        }
    }

    assert!(lagged, "Expected subscriber to lag");
    assert_eq!(received, 4);
    assert_eq!(store.state(|s| s.resolved.len()).await, 20);
}

#[tokio::test]
async fn test_state_version_follows_every_reduction() {
    let store = store();
    let mut versions = store.subscribe_state();

    let result = store
        .send_and_wait_for(
            TestAction::Request { id: 1, steps: 1 },
            |action| matches!(action, TestAction::Resolved { .. }),
            Duration::from_secs(1),
        )
        .await;
    assert!(result.is_ok());

    // Request, StepCompleted, Resolved
    assert!(versions.has_changed().unwrap());
    assert_eq!(*versions.borrow_and_update(), 3);
}

#[tokio::test]
async fn test_shutdown_waits_for_effects() {
    let store = store();

    let handle = store
        .send(TestAction::ResolveLater { id: 5, after: Duration::from_millis(30) })
        .await;
    assert!(handle.is_ok());
    assert_eq!(store.pending_effects(), 1);

    assert_eq!(store.shutdown(Duration::from_secs(1)).await, Ok(()));
    assert_eq!(store.pending_effects(), 0);
    assert_eq!(
        store
            .send_and_wait_for(
                TestAction::Request { id: 6, steps: 0 },
                |_| true,
                Duration::from_millis(10),
            )
            .await,
        Err(StoreError::ShutdownInProgress)
    );
}

#[tokio::test]
async fn test_shutdown_timeout_reports_pending() {
    let store = store();

    let handle = store
        .send(TestAction::ResolveLater { id: 5, after: Duration::from_secs(5) })
        .await;
    assert!(handle.is_ok());

    assert_eq!(
        store.shutdown(Duration::from_millis(20)).await,
        Err(StoreError::ShutdownTimeout(1))
    );
}
