//! Per-broker breaker registry.
//!
//! # Responsibilities
//! - Hand out exactly one `CircuitBreaker` per broker identity
//! - Create breakers lazily on first use
//! - Stay lock-free on the lookup hot path

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::BreakerConfig;
use crate::resilience::circuit_breaker::{BreakerMetrics, CircuitBreaker};

/// Process-wide map of broker id → breaker. Shared and long-lived; every
/// publish attempt targeting the same broker sees the same instance.
#[derive(Debug)]
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    config: BreakerConfig,
}

impl BreakerRegistry {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            config,
        }
    }

    /// Get the breaker for a broker, creating it on first use.
    pub fn breaker(&self, broker_id: &str) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(broker_id.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(self.config.clone())))
            .clone()
    }

    /// Snapshot every known breaker, for metrics dumps and admin surfaces.
    pub fn snapshot(&self) -> Vec<(String, BreakerMetrics)> {
        self.breakers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().metrics()))
            .collect()
    }
}
