//! Shutdown and interrupt coordination.

use tokio::sync::broadcast;

/// Broadcast-based shutdown signal.
///
/// Long-running tasks subscribe and exit when the signal fires. A publish
/// attempt waiting on a send's completion treats the signal as an
/// interrupt: the event is finalized as failed and the producer is still
/// released.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal; all subscribers observe it.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
