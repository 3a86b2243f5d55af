//! Send errors and attempt outcome classification.
//!
//! Classification is an explicit closed set determined at the transport
//! boundary, so the orchestration never inspects a transport library's
//! error hierarchy.

use std::time::Duration;

use thiserror::Error;

/// Errors a transport can complete a send with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The targeted broker is no longer the leader for the partition.
    #[error("broker is not the leader for partition {partition}")]
    NotLeader { partition: String },

    /// The topic or partition does not exist on the targeted broker.
    #[error("unknown topic or partition {topic}/{partition}")]
    UnknownTopicOrPartition { topic: String, partition: String },

    /// The transport gave up waiting for the broker.
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure talking to the broker.
    #[error("network error: {0}")]
    Network(String),

    /// The broker reported an unclassified server-side error.
    #[error("unknown server error: {0}")]
    UnknownServer(String),

    /// Unexpected fault inside the transport itself.
    #[error("internal producer error: {0}")]
    Internal(String),
}

impl SendError {
    /// Fatal topology errors mean the pooled producer is talking to the
    /// wrong broker; it must be replaced, not returned to circulation.
    pub fn poisons_producer(&self) -> bool {
        matches!(
            self,
            SendError::NotLeader { .. } | SendError::UnknownTopicOrPartition { .. }
        )
    }

    /// Retryable connection-level trouble: counts against the breaker but
    /// leaves the producer healthy.
    pub fn is_retryable_network(&self) -> bool {
        matches!(
            self,
            SendError::Timeout(_) | SendError::Network(_) | SendError::UnknownServer(_)
        )
    }
}

/// Classified result of one publish attempt; drives breaker accounting,
/// logging, and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The broker acknowledged the send.
    Success,
    /// The breaker was open; the attempt was never made.
    BreakerOpen,
    /// The bounded wait on the completion future expired.
    SendTimeout,
    /// Timeout / network / unknown-server error from the transport.
    RetryableNetwork,
    /// Wrong leader or unknown topic-partition; producer was replaced.
    FatalTopology,
    /// Unexpected runtime fault during send setup or completion.
    Internal,
    /// The waiting task was interrupted by shutdown.
    Interrupted,
}

impl Outcome {
    /// Classify a transport error into its outcome tag.
    pub fn from_send_error(err: &SendError) -> Self {
        if err.poisons_producer() {
            Outcome::FatalTopology
        } else if err.is_retryable_network() {
            Outcome::RetryableNetwork
        } else {
            Outcome::Internal
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }

    /// A short-circuited attempt was never made, so it is invisible to the
    /// breaker; every other outcome is exactly one breaker-visible trial.
    pub fn counts_against_breaker(self) -> bool {
        self != Outcome::BreakerOpen
    }

    /// Stable label for metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::BreakerOpen => "breaker_open",
            Outcome::SendTimeout => "send_timeout",
            Outcome::RetryableNetwork => "retryable_network",
            Outcome::FatalTopology => "fatal_topology",
            Outcome::Internal => "internal",
            Outcome::Interrupted => "interrupted",
        }
    }
}
