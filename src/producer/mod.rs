//! Producer subsystem: transports and the bounded pool that owns them.
//!
//! # Data Flow
//! ```text
//! publish attempt
//!     → pool.rs (bounded acquire, RAII release or terminate)
//!     → transport.rs (async send with one-shot delivery callback)
//! ```

pub mod pool;
pub mod transport;

pub use pool::{PoolError, PoolStats, PooledProducer, ProducerPool, TransportFactory};
pub use transport::{DeliveryCallback, OutboundRecord, ProducerTransport};
