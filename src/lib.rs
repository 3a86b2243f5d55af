//! Resilient publish path for an event broker's write pipeline.
//!
//! Forwards individual client-submitted events to a specific downstream
//! broker/partition while isolating per-broker failures: a lock-free,
//! time-windowed circuit breaker per broker plus a bounded, classified,
//! exactly-once-reported publish attempt over a pooled producer.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod producer;
pub mod publish;
pub mod resilience;

pub use config::RelayConfig;
pub use lifecycle::Shutdown;
pub use producer::{PooledProducer, ProducerPool, ProducerTransport};
pub use publish::{EventRecord, Outcome, PublishAttempt, PublishingStatus};
pub use resilience::{BreakerRegistry, CircuitBreaker};
