//! Demo pipeline for the resilient publish path.
//!
//! Wires the whole crate together against a loopback transport: loads
//! configuration, fans a burst of events out across a few synthetic
//! brokers, lets one of them misbehave so the circuit breaker trips, and
//! dumps the per-broker breaker state at the end.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_relay::config::{self, RelayConfig};
use event_relay::lifecycle::Shutdown;
use event_relay::producer::{DeliveryCallback, OutboundRecord, ProducerPool, ProducerTransport};
use event_relay::publish::{EventRecord, PublishAttempt, SendError};
use event_relay::resilience::BreakerRegistry;

/// Loopback transport: acknowledges sends after a short delay. Partition 0
/// plays an unhealthy broker and fails every send, which is what trips its
/// breaker during the burst.
struct LoopbackTransport;

impl ProducerTransport for LoopbackTransport {
    fn send(&self, record: OutboundRecord, on_delivery: DeliveryCallback) {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2)).await;
            if record.partition == "0" {
                on_delivery(Err(SendError::Network("connection reset by peer".into())));
            } else {
                on_delivery(Ok(()));
            }
        });
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("event-relay v0.1.0 starting");

    // Load configuration (defaults unless a path is given)
    let config = match std::env::args().nth(1) {
        Some(path) => config::load_config(Path::new(&path))?,
        None => RelayConfig::default(),
    };

    tracing::info!(
        topic = %config.publish.topic,
        timeout_ms = config.publish.timeout_ms,
        pool_capacity = config.pool.capacity,
        volume_threshold = config.breaker.request_volume_threshold,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            event_relay::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let registry = Arc::new(BreakerRegistry::new(config.breaker.clone()));
    let pool = Arc::new(ProducerPool::new(
        config.pool.capacity,
        config.pool.acquire_timeout(),
        Box::new(|| Arc::new(LoopbackTransport) as Arc<dyn ProducerTransport>),
    ));
    let attempt = PublishAttempt::new(config.publish.topic.clone(), config.publish.timeout());
    let shutdown = Shutdown::new();

    let mut handles = Vec::new();
    for seq in 0..90u32 {
        let partition = (seq % 3).to_string();
        let broker_id = format!("broker-{}", seq % 3);
        let event = Arc::new(EventRecord::new(
            &broker_id,
            &partition,
            serde_json::json!({ "seq": seq }),
        ));
        let breaker = registry.breaker(&broker_id);
        let attempt = attempt.clone();
        let pool = Arc::clone(&pool);
        let interrupt = shutdown.subscribe();

        handles.push(tokio::spawn(async move {
            let outcome = attempt.execute(&event, &breaker, &pool, interrupt).await;
            tracing::debug!(
                event_id = %event.id(),
                status = ?event.status(),
                outcome = outcome.as_label(),
                "Publish attempt finished"
            );
        }));
    }

    for handle in handles {
        let _ = handle.await;
    }

    for (broker, snapshot) in registry.snapshot() {
        tracing::info!(%broker, state = %snapshot, "Breaker state");
    }

    shutdown.trigger();
    tracing::info!("Shutdown complete");
    Ok(())
}
