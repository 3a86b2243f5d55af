//! Producer transport seam.
//!
//! The publish path never talks to a broker directly; it hands an
//! `OutboundRecord` to a `ProducerTransport` and gets told the result
//! through a one-shot completion callback. Tests plug in scripted mocks,
//! the demo binary a loopback.

use crate::publish::event::EventRecord;
use crate::publish::outcome::SendError;

/// The wire-ready record handed to a transport: destination plus
/// serialized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRecord {
    pub topic: String,
    /// Partition the record is appended to; doubles as the record key.
    pub partition: String,
    pub key: String,
    pub payload: String,
}

impl OutboundRecord {
    /// Build the record for one event targeting one topic.
    pub fn from_event(topic: &str, event: &EventRecord) -> Self {
        Self {
            topic: topic.to_string(),
            partition: event.partition().to_string(),
            key: event.partition().to_string(),
            payload: event.payload().to_string(),
        }
    }
}

/// Fired exactly once when the transport finishes (or abandons) a send.
pub type DeliveryCallback = Box<dyn FnOnce(Result<(), SendError>) + Send + 'static>;

/// An asynchronous producer connection to one broker.
///
/// `send` must not block: it enqueues the record and returns, and the
/// callback fires later from whatever context completes the request.
pub trait ProducerTransport: Send + Sync {
    fn send(&self, record: OutboundRecord, on_delivery: DeliveryCallback);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_event() {
        let event = EventRecord::new("broker-0", "7", serde_json::json!({"n": 1}));
        let record = OutboundRecord::from_event("events", &event);

        assert_eq!(record.topic, "events");
        assert_eq!(record.partition, "7");
        assert_eq!(record.key, "7");
        assert_eq!(record.payload, r#"{"n":1}"#);
    }
}
