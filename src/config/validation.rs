//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows > 0, percentages within 0..=100)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a config.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("publish.topic must not be empty")]
    EmptyTopic,

    #[error("publish.timeout_ms must be greater than zero")]
    ZeroPublishTimeout,

    #[error("breaker.error_threshold_percent must be within 1..=100, got {0}")]
    ErrorThresholdOutOfRange(u32),

    #[error("breaker.request_volume_threshold must be greater than zero")]
    ZeroVolumeThreshold,

    #[error("breaker.rolling_window_ms must be greater than zero")]
    ZeroRollingWindow,

    #[error("breaker.sleep_window_ms must be greater than zero")]
    ZeroSleepWindow,

    #[error("pool.capacity must be greater than zero")]
    ZeroPoolCapacity,

    #[error("pool.acquire_timeout_ms must be greater than zero")]
    ZeroAcquireTimeout,

    #[error("observability.metrics_address is not a valid socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Check a parsed config for semantic problems, collecting every error.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.publish.topic.is_empty() {
        errors.push(ValidationError::EmptyTopic);
    }
    if config.publish.timeout_ms == 0 {
        errors.push(ValidationError::ZeroPublishTimeout);
    }

    let threshold = config.breaker.error_threshold_percent;
    if threshold == 0 || threshold > 100 {
        errors.push(ValidationError::ErrorThresholdOutOfRange(threshold));
    }
    if config.breaker.request_volume_threshold == 0 {
        errors.push(ValidationError::ZeroVolumeThreshold);
    }
    if config.breaker.rolling_window_ms == 0 {
        errors.push(ValidationError::ZeroRollingWindow);
    }
    if config.breaker.sleep_window_ms == 0 {
        errors.push(ValidationError::ZeroSleepWindow);
    }

    if config.pool.capacity == 0 {
        errors.push(ValidationError::ZeroPoolCapacity);
    }
    if config.pool.acquire_timeout_ms == 0 {
        errors.push(ValidationError::ZeroAcquireTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
