//! Publish subsystem: events, outcome classification, and the attempt
//! orchestration.
//!
//! # Data Flow
//! ```text
//! caller
//!     → attempt.rs (breaker gate → pool acquire → async send → bounded wait)
//!     → outcome.rs (closed classification set at the transport boundary)
//!     → event.rs (single-assignment terminal status on the record)
//! ```

pub mod attempt;
pub mod event;
pub mod outcome;

pub use attempt::PublishAttempt;
pub use event::{EventRecord, PublishingStatus};
pub use outcome::{Outcome, SendError};
