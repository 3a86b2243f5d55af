//! Per-broker circuit breaker.
//!
//! # States
//! - Closed: normal operation, publish attempts pass through
//! - Open: broker assumed unhealthy, attempts fail fast
//! - Half-open trial: a single probe attempt is let through an open breaker
//!
//! # State Transitions
//! ```text
//! Closed → Open: total >= volume threshold AND error rate >= threshold percent
//! Open → trial granted: sleep window elapsed, caller wins the timestamp CAS
//! Open → Closed: a success mark while open
//! trial fails: breaker stays open, sleep window restarts
//! ```
//!
//! # Design Decisions
//! - Per-broker breaker (not global), one instance shared by all attempts
//! - Thresholds are checked lazily in `allow_request`, keeping the mark
//!   paths branch-free apart from the rolling-window check
//! - Pure atomics: no mutex, no blocking, races resolve to an approximate
//!   but eventually correct health signal

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use crate::config::BreakerConfig;

/// Lock-free admission control for one broker identity.
///
/// All counters and timestamps are plain atomics; timestamps are
/// milliseconds since the breaker was created, so only monotonicity
/// matters, never wall-clock time.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Current gate state.
    open: AtomicBool,
    /// Requests recorded since the last rolling-window decay took effect.
    total_count: AtomicI64,
    /// Failures recorded since the last success mark.
    failures_count: AtomicI64,
    /// When the breaker last transitioned to open; the CAS on this value
    /// grants the single half-open trial per sleep window.
    last_opened_at: AtomicU64,
    /// Last time the rolling window was decayed.
    window_last_update: AtomicU64,
    /// `total_count` captured at the last decay, subtracted on the next one.
    window_baseline: AtomicI64,
    config: BreakerConfig,
    epoch: Instant,
}

/// Point-in-time counter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerMetrics {
    pub total_count: i64,
    pub failures_count: i64,
    /// Integer truncation of `failures / total * 100`, 0 when total is 0.
    pub error_percent: i64,
}

impl std::fmt::Display for BreakerMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CircuitBreaker{{totalCount={}, failuresCount={}, error={}%}}",
            self.total_count, self.failures_count, self.error_percent
        )
    }
}

impl CircuitBreaker {
    /// Create a closed breaker with zeroed counters.
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            open: AtomicBool::new(false),
            total_count: AtomicI64::new(0),
            failures_count: AtomicI64::new(0),
            last_opened_at: AtomicU64::new(0),
            window_last_update: AtomicU64::new(0),
            window_baseline: AtomicI64::new(0),
            config,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Returns true if the breaker is closed, or if it is open and this
    /// caller wins the single half-open trial for the current sleep window.
    /// Never blocks.
    pub fn allow_request(&self) -> bool {
        !self.is_circuit_open() || self.allow_single_trial()
    }

    /// Lazy open detection: trips the breaker when both thresholds are met.
    /// The CAS loser that also observed the condition still reports "open";
    /// both answers are correct from the caller's perspective.
    fn is_circuit_open(&self) -> bool {
        if self.open.load(Ordering::Acquire) {
            return true;
        }

        let total = self.total_count.load(Ordering::Relaxed);
        let failures = self.failures_count.load(Ordering::Relaxed);

        if total < self.config.request_volume_threshold as i64 {
            return false;
        }

        let error_percent = (failures as f64 / total as f64 * 100.0) as i64;
        if error_percent < self.config.error_threshold_percent as i64 {
            return false;
        }

        if self
            .open
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.last_opened_at.store(self.now_ms(), Ordering::Release);
            tracing::warn!(total, failures, error_percent, "circuit breaker opened");
        }

        true
    }

    /// Grants at most one trial per sleep window: the CAS moves the open
    /// timestamp forward, so a failed trial implicitly restarts the window
    /// (failures never touch `last_opened_at`), while a successful trial
    /// closes the breaker and short-circuits this path entirely.
    fn allow_single_trial(&self) -> bool {
        let opened_at = self.last_opened_at.load(Ordering::Acquire);
        let now = self.now_ms();
        if self.open.load(Ordering::Acquire)
            && now > opened_at + self.config.sleep_window_ms
            && self
                .last_opened_at
                .compare_exchange(opened_at, now, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            tracing::debug!("half-open trial granted");
            return true;
        }
        false
    }

    /// Record one successful request. Closes an open breaker, decays the
    /// rolling window when it has elapsed, and resets the failure count.
    /// Never blocks.
    pub fn mark_success(&self) {
        if self
            .open
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            tracing::info!("circuit breaker closed after successful trial");
        }

        let last_update = self.window_last_update.load(Ordering::Acquire);
        let now = self.now_ms();
        if now > last_update + self.config.rolling_window_ms
            && self
                .window_last_update
                .compare_exchange(last_update, now, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        {
            // Decay winner: drop the traffic counted before the previous
            // decay, clamp at zero, and capture the new baseline.
            let baseline = self.window_baseline.load(Ordering::Acquire);
            let mut current = self.total_count.fetch_sub(baseline, Ordering::AcqRel) - baseline;
            if current < 0 {
                self.total_count.store(0, Ordering::Release);
                current = 0;
            }
            self.window_baseline.store(current, Ordering::Release);
        } else {
            self.total_count.fetch_add(1, Ordering::AcqRel);
        }

        self.failures_count.store(0, Ordering::Release);
    }

    /// Record one failed request. Never blocks.
    pub fn mark_failure(&self) {
        self.total_count.fetch_add(1, Ordering::AcqRel);
        self.failures_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Current counter snapshot for logs and gauges.
    pub fn metrics(&self) -> BreakerMetrics {
        let total = self.total_count.load(Ordering::Acquire);
        let failures = self.failures_count.load(Ordering::Acquire);
        let error_percent = if total == 0 {
            0
        } else {
            (failures as f64 / total as f64 * 100.0) as i64
        };
        BreakerMetrics {
            total_count: total,
            failures_count: failures,
            error_percent,
        }
    }
}
