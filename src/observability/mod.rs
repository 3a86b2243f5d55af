//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! publish attempts produce:
//!     → tracing events (structured logs with broker/topic context)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout via tracing-subscriber)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod metrics;
