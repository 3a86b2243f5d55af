//! One bounded publish attempt.
//!
//! # Responsibilities
//! - Gate on the broker's circuit breaker before touching the pool
//! - Acquire a producer with guaranteed release on every exit path
//! - Await the asynchronous send bounded by the per-attempt timeout
//! - Classify the result, replace poisoned producers, report to the breaker
//!
//! # Design Decisions
//! - Fire-and-report: the outcome is observable through the event's
//!   terminal status, never as an error to the caller
//! - The delivery callback and the timeout/interrupt observer race to
//!   finalize the event; the record's single-assignment status decides the
//!   winner
//! - One attempt is exactly one breaker-visible trial, no matter how many
//!   times the transport retried internally

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};

use crate::observability::metrics;
use crate::producer::{OutboundRecord, ProducerPool};
use crate::publish::event::{EventRecord, PublishingStatus};
use crate::publish::outcome::Outcome;
use crate::resilience::CircuitBreaker;

/// Orchestrates one send of one event to one broker partition.
#[derive(Debug, Clone)]
pub struct PublishAttempt {
    topic: String,
    timeout: Duration,
}

impl PublishAttempt {
    pub fn new(topic: impl Into<String>, timeout: Duration) -> Self {
        Self {
            topic: topic.into(),
            timeout,
        }
    }

    /// Run the attempt to completion. The event ends `Submitted` or
    /// `Failed`; every internal failure is absorbed into that status plus a
    /// log entry, and the final boolean outcome is reported to the breaker.
    pub async fn execute(
        &self,
        event: &Arc<EventRecord>,
        breaker: &CircuitBreaker,
        pool: &ProducerPool,
        interrupt: broadcast::Receiver<()>,
    ) -> Outcome {
        let outcome = if breaker.allow_request() {
            self.run(event, pool, interrupt).await
        } else {
            // Fast fail: the attempt is never made and stays invisible to
            // the breaker counters.
            tracing::warn!(
                broker = %event.broker_id(),
                topic = %self.topic,
                event_id = %event.id(),
                "Publish short-circuited: circuit breaker open"
            );
            event.finalize(PublishingStatus::Failed, "internal error");
            Outcome::BreakerOpen
        };

        if outcome.counts_against_breaker() {
            if outcome.is_success() {
                breaker.mark_success();
            } else {
                breaker.mark_failure();
            }
        }

        metrics::record_publish(event.broker_id(), outcome);
        metrics::record_breaker(event.broker_id(), &breaker.metrics());
        outcome
    }

    async fn run(
        &self,
        event: &Arc<EventRecord>,
        pool: &ProducerPool,
        mut interrupt: broadcast::Receiver<()>,
    ) -> Outcome {
        let producer = match pool.acquire().await {
            Ok(producer) => producer,
            Err(e) => {
                tracing::error!(
                    broker = %event.broker_id(),
                    error = %e,
                    "Failed to acquire producer for publish"
                );
                event.finalize(PublishingStatus::Failed, "internal error");
                return Outcome::Internal;
            }
        };

        let record = OutboundRecord::from_event(&self.topic, event);
        let (done_tx, done_rx) = oneshot::channel();
        let callback_event = Arc::clone(event);
        let callback_topic = self.topic.clone();

        // Completion callback: fires exactly once from the transport and
        // races the waiting side for the terminal status.
        producer.transport().send(
            record,
            Box::new(move |result| {
                match &result {
                    Ok(()) => {
                        callback_event.finalize(PublishingStatus::Submitted, "");
                    }
                    Err(err) => {
                        tracing::warn!(
                            topic = %callback_topic,
                            event_id = %callback_event.id(),
                            error = %err,
                            "Delivery failed"
                        );
                        callback_event.finalize(PublishingStatus::Failed, "internal error");
                    }
                }
                // The waiting side may already be gone (timeout/interrupt).
                let _ = done_tx.send(result);
            }),
        );

        // The producer guard is still held on every arm below: a poisoned
        // producer is terminated explicitly, anything else is released when
        // the guard drops at return.
        tokio::select! {
            waited = tokio::time::timeout(self.timeout, done_rx) => match waited {
                Ok(Ok(Ok(()))) => Outcome::Success,
                Ok(Ok(Err(send_err))) => {
                    // Callback already finalized the event; this is a
                    // no-op safety net for a misbehaving transport.
                    event.finalize(PublishingStatus::Failed, "internal error");
                    if send_err.poisons_producer() {
                        tracing::warn!(
                            broker = %event.broker_id(),
                            topic = %self.topic,
                            error = %send_err,
                            "Terminating producer after fatal topology error"
                        );
                        producer.terminate();
                    } else if send_err.is_retryable_network() {
                        tracing::warn!(
                            broker = %event.broker_id(),
                            topic = %self.topic,
                            error = %send_err,
                            "Transport failure while publishing"
                        );
                    } else {
                        tracing::error!(
                            broker = %event.broker_id(),
                            topic = %self.topic,
                            error = %send_err,
                            "Error publishing event"
                        );
                    }
                    Outcome::from_send_error(&send_err)
                }
                Ok(Err(_)) => {
                    // Transport dropped the callback without firing it.
                    tracing::error!(
                        broker = %event.broker_id(),
                        topic = %self.topic,
                        "Transport abandoned delivery callback"
                    );
                    event.finalize(PublishingStatus::Failed, "internal error");
                    Outcome::Internal
                }
                Err(_) => {
                    tracing::warn!(
                        broker = %event.broker_id(),
                        topic = %self.topic,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Timed out waiting for delivery"
                    );
                    event.finalize(PublishingStatus::Failed, "internal error");
                    Outcome::SendTimeout
                }
            },
            _ = interrupt.recv() => {
                tracing::error!(
                    broker = %event.broker_id(),
                    topic = %self.topic,
                    "Publish attempt interrupted"
                );
                event.finalize(PublishingStatus::Failed, "interrupted");
                Outcome::Interrupted
            }
        }
    }
}
