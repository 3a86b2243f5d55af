//! Event records and their terminal publishing status.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use uuid::Uuid;

/// Terminal status of one publish attempt for one event.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishingStatus {
    /// No terminal status written yet.
    Pending = 0,
    /// The broker acknowledged the send.
    Submitted = 1,
    /// The attempt failed; see the detail string.
    Failed = 2,
}

impl From<u8> for PublishingStatus {
    fn from(val: u8) -> Self {
        match val {
            1 => PublishingStatus::Submitted,
            2 => PublishingStatus::Failed,
            _ => PublishingStatus::Pending,
        }
    }
}

/// One client-submitted event on its way to a broker partition.
///
/// The status is single-assignment: the delivery callback and the
/// timeout/interrupt observer race to finalize it, the first writer wins,
/// and the loser's write is a no-op. The publish path only ever writes the
/// status; it never reads it to make decisions.
#[derive(Debug)]
pub struct EventRecord {
    id: Uuid,
    broker_id: String,
    partition: String,
    payload: serde_json::Value,
    status: AtomicU8,
    detail: OnceLock<String>,
}

impl EventRecord {
    pub fn new(
        broker_id: impl Into<String>,
        partition: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            broker_id: broker_id.into(),
            partition: partition.into(),
            payload,
            status: AtomicU8::new(PublishingStatus::Pending as u8),
            detail: OnceLock::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Identity of the broker currently leading this event's partition.
    pub fn broker_id(&self) -> &str {
        &self.broker_id
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn status(&self) -> PublishingStatus {
        self.status.load(Ordering::Acquire).into()
    }

    /// Detail attached with the terminal status; empty while pending.
    pub fn detail(&self) -> &str {
        self.detail.get().map(String::as_str).unwrap_or("")
    }

    /// Write the terminal status exactly once. Returns true for the winning
    /// writer; any later call leaves the record untouched and returns false.
    pub fn finalize(&self, status: PublishingStatus, detail: &str) -> bool {
        let won = self
            .status
            .compare_exchange(
                PublishingStatus::Pending as u8,
                status as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if won {
            let _ = self.detail.set(detail.to_string());
        }
        won
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> EventRecord {
        EventRecord::new("broker-0", "3", serde_json::json!({"k": "v"}))
    }

    #[test]
    fn test_starts_pending() {
        let e = event();
        assert_eq!(e.status(), PublishingStatus::Pending);
        assert_eq!(e.detail(), "");
    }

    #[test]
    fn test_first_writer_wins() {
        let e = event();
        assert!(e.finalize(PublishingStatus::Submitted, ""));
        assert!(!e.finalize(PublishingStatus::Failed, "internal error"));

        assert_eq!(e.status(), PublishingStatus::Submitted);
        assert_eq!(e.detail(), "");
    }

    #[test]
    fn test_failed_keeps_detail() {
        let e = event();
        assert!(e.finalize(PublishingStatus::Failed, "interrupted"));
        assert_eq!(e.status(), PublishingStatus::Failed);
        assert_eq!(e.detail(), "interrupted");
    }
}
