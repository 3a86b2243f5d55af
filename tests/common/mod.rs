//! Shared mock transports for integration tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use event_relay::config::BreakerConfig;
use event_relay::producer::{DeliveryCallback, OutboundRecord, ProducerPool, ProducerTransport};
use event_relay::publish::SendError;

/// Completes every send with the scripted result and counts invocations.
#[allow(dead_code)]
pub struct ScriptedTransport {
    result: Result<(), SendError>,
    pub sends: AtomicU32,
}

#[allow(dead_code)]
impl ScriptedTransport {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            result: Ok(()),
            sends: AtomicU32::new(0),
        })
    }

    pub fn failing(error: SendError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            sends: AtomicU32::new(0),
        })
    }

    pub fn send_count(&self) -> u32 {
        self.sends.load(Ordering::SeqCst)
    }
}

impl ProducerTransport for ScriptedTransport {
    fn send(&self, _record: OutboundRecord, on_delivery: DeliveryCallback) {
        self.sends.fetch_add(1, Ordering::SeqCst);
        on_delivery(self.result.clone());
    }
}

#[allow(dead_code)]
/// Never completes a send. Parks the callback so the waiting side sees a
/// genuine timeout or interrupt rather than a dropped channel.
#[derive(Default)]
pub struct HangingTransport {
    parked: Mutex<Vec<DeliveryCallback>>,
}

#[allow(dead_code)]
impl HangingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl ProducerTransport for HangingTransport {
    fn send(&self, _record: OutboundRecord, on_delivery: DeliveryCallback) {
        self.parked.lock().unwrap().push(on_delivery);
    }
}

/// Pool of one whose factory always hands out the given transport.
#[allow(dead_code)]
pub fn single_transport_pool(transport: Arc<dyn ProducerTransport>) -> ProducerPool {
    ProducerPool::new(
        1,
        Duration::from_millis(100),
        Box::new(move || Arc::clone(&transport)),
    )
}

/// Breaker config with short windows so tests stay fast.
#[allow(dead_code)]
pub fn fast_breaker_config() -> BreakerConfig {
    BreakerConfig {
        error_threshold_percent: 20,
        request_volume_threshold: 20,
        rolling_window_ms: 10_000,
        sleep_window_ms: 50,
    }
}
