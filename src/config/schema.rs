//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the publish
//! pipeline. All types derive Serde traits for deserialization from config
//! files, and every field has a default so a minimal config is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the publish pipeline.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Publish attempt settings (topic, per-attempt timeout).
    pub publish: PublishConfig,

    /// Circuit breaker tunables, shared by every per-broker breaker.
    pub breaker: BreakerConfig,

    /// Producer pool sizing.
    pub pool: PoolConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Publish attempt configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Topic events are published to.
    pub topic: String,

    /// Bound on awaiting a single send's completion, in milliseconds.
    pub timeout_ms: u64,
}

impl PublishConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            topic: "events".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Circuit breaker tunables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Error rate (%) at or above which the breaker may open.
    pub error_threshold_percent: u32,

    /// Minimum total requests before the breaker can open.
    pub request_volume_threshold: u64,

    /// Window over which the total count decays on success, in milliseconds.
    pub rolling_window_ms: u64,

    /// Minimum time open before one half-open trial is allowed, in
    /// milliseconds.
    pub sleep_window_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            error_threshold_percent: 20,
            request_volume_threshold: 20,
            rolling_window_ms: 10_000,
            sleep_window_ms: 5_000,
        }
    }
}

/// Producer pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum producers in circulation at once.
    pub capacity: usize,

    /// Bound on waiting for a free producer, in milliseconds.
    pub acquire_timeout_ms: u64,
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            acquire_timeout_ms: 1_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Address the metrics endpoint binds to.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}
