//! Resilience subsystem: per-broker admission control.
//!
//! # Data Flow
//! ```text
//! publish attempt
//!     → registry.rs (broker id → breaker instance)
//!     → circuit_breaker.rs (allow_request gate, mark_success/mark_failure)
//! ```
//!
//! # Design Decisions
//! - One breaker per broker identity so a single unhealthy broker cannot
//!   degrade the rest of the pipeline
//! - The breaker is an approximate health signal: all state is plain
//!   atomics, races are tolerated, no operation ever blocks

pub mod circuit_breaker;
pub mod registry;

pub use circuit_breaker::{BreakerMetrics, CircuitBreaker};
pub use registry::BreakerRegistry;
