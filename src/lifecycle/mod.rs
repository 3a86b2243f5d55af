//! Lifecycle management subsystem.
//!
//! Shutdown doubles as the interrupt signal for in-flight publish
//! attempts: an interrupted attempt deterministically resolves to a failed
//! terminal status without leaking its producer.

pub mod shutdown;

pub use shutdown::Shutdown;
