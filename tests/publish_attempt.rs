//! Orchestration tests for the publish attempt.

use std::sync::Arc;
use std::time::Duration;

use event_relay::config::BreakerConfig;
use event_relay::lifecycle::Shutdown;
use event_relay::publish::{EventRecord, Outcome, PublishAttempt, PublishingStatus, SendError};
use event_relay::resilience::CircuitBreaker;

mod common;

use common::{single_transport_pool, HangingTransport, ScriptedTransport};

fn breaker() -> CircuitBreaker {
    CircuitBreaker::new(BreakerConfig::default())
}

fn event() -> Arc<EventRecord> {
    Arc::new(EventRecord::new(
        "broker-0",
        "3",
        serde_json::json!({"order_id": 42}),
    ))
}

fn attempt(timeout: Duration) -> PublishAttempt {
    PublishAttempt::new("events", timeout)
}

#[tokio::test]
async fn test_successful_send_submits_and_marks_success() {
    let transport = ScriptedTransport::ok();
    let pool = single_transport_pool(transport.clone());
    let breaker = breaker();
    let event = event();
    let shutdown = Shutdown::new();

    let outcome = attempt(Duration::from_secs(1))
        .execute(&event, &breaker, &pool, shutdown.subscribe())
        .await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(event.status(), PublishingStatus::Submitted);
    assert_eq!(event.detail(), "");
    assert_eq!(transport.send_count(), 1);

    // One breaker-visible trial, no failures.
    let metrics = breaker.metrics();
    assert_eq!(metrics.total_count, 1);
    assert_eq!(metrics.failures_count, 0);

    // Producer went back into circulation.
    assert_eq!(pool.stats().idle, 1);
    assert_eq!(pool.stats().terminated, 0);
}

#[tokio::test]
async fn test_topology_error_terminates_producer_exactly_once() {
    let transport = ScriptedTransport::failing(SendError::NotLeader {
        partition: "3".into(),
    });
    let pool = single_transport_pool(transport.clone());
    let breaker = breaker();
    let event = event();
    let shutdown = Shutdown::new();

    let outcome = attempt(Duration::from_secs(1))
        .execute(&event, &breaker, &pool, shutdown.subscribe())
        .await;

    assert_eq!(outcome, Outcome::FatalTopology);
    assert_eq!(event.status(), PublishingStatus::Failed);
    assert_eq!(event.detail(), "internal error");

    // Poisoned producer was discarded, not released.
    let stats = pool.stats();
    assert_eq!(stats.terminated, 1);
    assert_eq!(stats.idle, 0);

    assert_eq!(breaker.metrics().failures_count, 1);

    // Capacity is recreated lazily: the next attempt gets a fresh producer.
    assert!(pool.acquire().await.is_ok());
}

#[tokio::test]
async fn test_network_error_keeps_producer_in_circulation() {
    let transport = ScriptedTransport::failing(SendError::Network("connection reset".into()));
    let pool = single_transport_pool(transport.clone());
    let breaker = breaker();
    let event = event();
    let shutdown = Shutdown::new();

    let outcome = attempt(Duration::from_secs(1))
        .execute(&event, &breaker, &pool, shutdown.subscribe())
        .await;

    assert_eq!(outcome, Outcome::RetryableNetwork);
    assert_eq!(event.status(), PublishingStatus::Failed);

    let stats = pool.stats();
    assert_eq!(stats.terminated, 0);
    assert_eq!(stats.idle, 1);
    assert_eq!(breaker.metrics().failures_count, 1);
}

#[tokio::test]
async fn test_timeout_is_a_retryable_failure() {
    let pool = single_transport_pool(HangingTransport::new());
    let breaker = breaker();
    let event = event();
    let shutdown = Shutdown::new();

    let outcome = attempt(Duration::from_millis(50))
        .execute(&event, &breaker, &pool, shutdown.subscribe())
        .await;

    assert_eq!(outcome, Outcome::SendTimeout);
    assert_eq!(event.status(), PublishingStatus::Failed);
    assert_eq!(event.detail(), "internal error");
    assert_eq!(breaker.metrics().failures_count, 1);

    // The producer was still released despite the hang.
    assert_eq!(pool.stats().idle, 1);
}

#[tokio::test]
async fn test_interrupt_finalizes_and_releases() {
    let pool = Arc::new(single_transport_pool(HangingTransport::new()));
    let breaker = Arc::new(breaker());
    let event = event();
    let shutdown = Shutdown::new();

    let task = {
        let pool = Arc::clone(&pool);
        let breaker = Arc::clone(&breaker);
        let event = Arc::clone(&event);
        let interrupt = shutdown.subscribe();
        tokio::spawn(async move {
            attempt(Duration::from_secs(30))
                .execute(&event, &breaker, &pool, interrupt)
                .await
        })
    };

    // Let the attempt reach its bounded wait, then interrupt it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();

    let outcome = task.await.unwrap();
    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(event.status(), PublishingStatus::Failed);
    assert_eq!(event.detail(), "interrupted");

    // No leak: the producer is back in the pool.
    assert_eq!(pool.stats().idle, 1);
    assert_eq!(breaker.metrics().failures_count, 1);
}

#[tokio::test]
async fn test_open_breaker_fast_fails_without_touching_transport() {
    let transport = ScriptedTransport::ok();
    let pool = single_transport_pool(transport.clone());
    let breaker = breaker();
    for _ in 0..20 {
        breaker.mark_failure();
    }
    assert!(!breaker.allow_request());

    let event = event();
    let shutdown = Shutdown::new();
    let outcome = attempt(Duration::from_secs(1))
        .execute(&event, &breaker, &pool, shutdown.subscribe())
        .await;

    assert_eq!(outcome, Outcome::BreakerOpen);
    assert_eq!(event.status(), PublishingStatus::Failed);
    assert_eq!(transport.send_count(), 0);

    // Short-circuited attempts never reach the breaker counters.
    assert_eq!(breaker.metrics().total_count, 20);
}

#[tokio::test]
async fn test_pool_exhaustion_is_an_internal_failure() {
    let pool = single_transport_pool(ScriptedTransport::ok());
    let breaker = breaker();
    let event = event();
    let shutdown = Shutdown::new();

    // Hold the only producer so the attempt's bounded acquire expires.
    let held = pool.acquire().await.unwrap();

    let outcome = attempt(Duration::from_secs(1))
        .execute(&event, &breaker, &pool, shutdown.subscribe())
        .await;

    assert_eq!(outcome, Outcome::Internal);
    assert_eq!(event.status(), PublishingStatus::Failed);
    assert_eq!(event.detail(), "internal error");
    assert_eq!(breaker.metrics().failures_count, 1);

    drop(held);
    assert_eq!(pool.stats().idle, 1);
}

#[tokio::test]
async fn test_half_open_trial_success_recovers_broker() {
    let transport = ScriptedTransport::ok();
    let pool = single_transport_pool(transport.clone());
    let breaker = CircuitBreaker::new(BreakerConfig {
        sleep_window_ms: 30,
        ..BreakerConfig::default()
    });
    for _ in 0..20 {
        breaker.mark_failure();
    }
    assert!(!breaker.allow_request());

    tokio::time::sleep(Duration::from_millis(40)).await;

    // This attempt wins the half-open trial, succeeds, and closes the
    // breaker for everyone.
    let event = event();
    let shutdown = Shutdown::new();
    let outcome = attempt(Duration::from_secs(1))
        .execute(&event, &breaker, &pool, shutdown.subscribe())
        .await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(event.status(), PublishingStatus::Submitted);
    assert!(breaker.allow_request());
    assert_eq!(breaker.metrics().failures_count, 0);
}
