//! Delivery queues: where a resolved [`crate::deferred::Deferred`]'s
//! callback actually runs.
//!
//! Grounded in the `Executor`-style capability-object pattern used for
//! runtime abstraction elsewhere in this corpus: a small trait object the
//! caller supplies, rather than a hardcoded executor, so the core stays
//! usable without pulling in an async runtime.

use std::sync::Arc;

/// A place a delivered callback can run.
///
/// `Deferred::on(queue)` binds one. At delivery time, if `is_current()`
/// returns `true` the callback runs inline on the resolving thread (the
/// "main queue short-circuit"); otherwise it's handed to `dispatch`.
pub trait DeliveryQueue: Send + Sync {
    /// Schedule `job` to run on this queue.
    fn dispatch(&self, job: Box<dyn FnOnce() + Send>);

    /// True when the calling thread is already executing on this queue, so
    /// a fresh dispatch would be a needless hop.
    fn is_current(&self) -> bool;
}

/// The default queue: runs jobs synchronously on whichever thread resolves
/// the `Deferred`. Requires no runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineQueue;

impl InlineQueue {
    /// A shared handle to the inline queue, convenient for `Deferred::on`.
    pub fn shared() -> Arc<dyn DeliveryQueue> {
        Arc::new(InlineQueue)
    }
}

impl DeliveryQueue for InlineQueue {
    fn dispatch(&self, job: Box<dyn FnOnce() + Send>) {
        job();
    }

    fn is_current(&self) -> bool {
        true
    }
}

#[cfg(feature = "tokio-queue")]
mod tokio_queue {
    use super::DeliveryQueue;
    use tokio::runtime::Handle;

    /// Delivers onto a Tokio runtime via `spawn_blocking`, for callers
    /// already running inside a Tokio application.
    pub struct TokioQueue {
        handle: Handle,
    }

    impl TokioQueue {
        /// Bind to the given runtime handle.
        pub fn new(handle: Handle) -> Self {
            Self { handle }
        }

        /// Bind to the handle of the runtime the caller is currently
        /// executing on.
        pub fn current() -> Self {
            Self {
                handle: Handle::current(),
            }
        }
    }

    impl DeliveryQueue for TokioQueue {
        fn dispatch(&self, job: Box<dyn FnOnce() + Send>) {
            self.handle.spawn_blocking(job);
        }

        fn is_current(&self) -> bool {
            Handle::try_current()
                .map(|h| h.id() == self.handle.id())
                .unwrap_or(false)
        }
    }
}

#[cfg(feature = "tokio-queue")]
pub use tokio_queue::TokioQueue;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_queue_runs_jobs_synchronously() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let q = InlineQueue;
        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = ran.clone();
        q.dispatch(Box::new(move || ran2.store(true, Ordering::SeqCst)));
        assert!(ran.load(Ordering::SeqCst));
        assert!(q.is_current());
    }

    #[cfg(feature = "tokio-queue")]
    #[tokio::test]
    async fn tokio_queue_dispatches_onto_the_bound_runtime() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use tokio::runtime::Handle;

        let queue = TokioQueue::current();
        assert!(queue.is_current());

        let ran = Arc::new(AtomicBool::new(false));
        let ran2 = ran.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();
        queue.dispatch(Box::new(move || {
            ran2.store(true, Ordering::SeqCst);
            let _ = tx.send(());
        }));
        rx.await.unwrap();
        assert!(ran.load(Ordering::SeqCst));

        let other = TokioQueue::new(Handle::current());
        assert!(other.is_current());
    }
}
