//! Pooled producer management.
//!
//! # Responsibilities
//! - Bound how many producers are in circulation at once
//! - Hand out producers behind a RAII guard so release is guaranteed on
//!   every exit path
//! - Let a caller terminate a poisoned producer so it never re-enters
//!   circulation; capacity is recreated lazily by the factory

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::producer::transport::ProducerTransport;

/// Creates a fresh producer when the idle list is empty.
pub type TransportFactory = Box<dyn Fn() -> Arc<dyn ProducerTransport> + Send + Sync>;

/// Error type for pool acquisition.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("producer pool exhausted after waiting {0:?}")]
    Exhausted(Duration),
}

/// Counters for tests and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub idle: usize,
    pub created: u64,
    pub terminated: u64,
}

struct PoolInner {
    idle: Mutex<Vec<Arc<dyn ProducerTransport>>>,
    permits: Arc<Semaphore>,
    factory: TransportFactory,
    acquire_timeout: Duration,
    created: AtomicU64,
    terminated: AtomicU64,
}

/// Bounded pool of producer transports.
///
/// Capacity is enforced with a semaphore; the permit travels inside the
/// guard, so a producer lost to termination frees its slot when the guard
/// drops and the factory fills it again on a later acquire.
pub struct ProducerPool {
    inner: Arc<PoolInner>,
}

impl ProducerPool {
    pub fn new(capacity: usize, acquire_timeout: Duration, factory: TransportFactory) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(Vec::with_capacity(capacity)),
                permits: Arc::new(Semaphore::new(capacity)),
                factory,
                acquire_timeout,
                created: AtomicU64::new(0),
                terminated: AtomicU64::new(0),
            }),
        }
    }

    /// Acquire a producer, waiting at most the configured bound for a free
    /// slot.
    pub async fn acquire(&self) -> Result<PooledProducer, PoolError> {
        let permit = match tokio::time::timeout(
            self.inner.acquire_timeout,
            Arc::clone(&self.inner.permits).acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            // The semaphore is never closed; both arms mean no slot freed
            // up within the bound.
            Ok(Err(_)) | Err(_) => return Err(PoolError::Exhausted(self.inner.acquire_timeout)),
        };

        let reused = {
            let mut idle = self
                .inner
                .idle
                .lock()
                .expect("producer pool idle list poisoned");
            idle.pop()
        };
        let transport = reused.unwrap_or_else(|| {
            self.inner.created.fetch_add(1, Ordering::Relaxed);
            (self.inner.factory)()
        });

        Ok(PooledProducer {
            transport: Some(transport),
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    pub fn stats(&self) -> PoolStats {
        let idle = self
            .inner
            .idle
            .lock()
            .expect("producer pool idle list poisoned")
            .len();
        PoolStats {
            idle,
            created: self.inner.created.load(Ordering::Relaxed),
            terminated: self.inner.terminated.load(Ordering::Relaxed),
        }
    }
}

/// RAII guard for one acquired producer.
///
/// Dropping the guard returns the producer to the idle list;
/// [`PooledProducer::terminate`] consumes the guard and discards the
/// producer instead. Exactly one of the two happens, on every path.
pub struct PooledProducer {
    transport: Option<Arc<dyn ProducerTransport>>,
    pool: Arc<PoolInner>,
    _permit: OwnedSemaphorePermit,
}

impl PooledProducer {
    /// The transport behind this guard.
    pub fn transport(&self) -> &dyn ProducerTransport {
        // Present until terminate() consumes self.
        self.transport.as_deref().expect("transport already taken")
    }

    /// Discard a producer presumed poisoned by a fatal topology error. The
    /// slot is freed; the factory recreates capacity on a later acquire.
    pub fn terminate(mut self) {
        self.transport.take();
        self.pool.terminated.fetch_add(1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for PooledProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledProducer")
            .field("has_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

impl Drop for PooledProducer {
    fn drop(&mut self) {
        if let Some(transport) = self.transport.take() {
            if let Ok(mut idle) = self.pool.idle.lock() {
                idle.push(transport);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::transport::{DeliveryCallback, OutboundRecord};

    struct NoopTransport;

    impl ProducerTransport for NoopTransport {
        fn send(&self, _record: OutboundRecord, on_delivery: DeliveryCallback) {
            on_delivery(Ok(()));
        }
    }

    fn pool(capacity: usize) -> ProducerPool {
        ProducerPool::new(
            capacity,
            Duration::from_millis(50),
            Box::new(|| Arc::new(NoopTransport) as Arc<dyn ProducerTransport>),
        )
    }

    #[tokio::test]
    async fn test_release_on_drop() {
        let pool = pool(1);
        {
            let guard = pool.acquire().await.unwrap();
            let _ = guard.transport();
        }
        let stats = pool.stats();
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.created, 1);

        // Reuses the idle producer instead of creating another.
        let _guard = pool.acquire().await.unwrap();
        assert_eq!(pool.stats().created, 1);
    }

    #[tokio::test]
    async fn test_terminate_discards_and_recreates() {
        let pool = pool(1);
        pool.acquire().await.unwrap().terminate();

        let stats = pool.stats();
        assert_eq!(stats.idle, 0);
        assert_eq!(stats.terminated, 1);

        // Slot freed; a fresh producer is created on demand.
        let _guard = pool.acquire().await.unwrap();
        assert_eq!(pool.stats().created, 2);
    }

    #[tokio::test]
    async fn test_exhaustion_is_bounded() {
        let pool = pool(1);
        let _held = pool.acquire().await.unwrap();

        let err = pool.acquire().await.unwrap_err();
        assert!(matches!(err, PoolError::Exhausted(_)));
    }
}
