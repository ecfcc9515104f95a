//! # Scheduler collaborator.
//!
//! The engine never runs an event loop of its own. It hands zero-argument units of
//! [`Work`] to a [`Scheduler`] whenever something must happen "later":
//! - `Each`/`Parallel` dispatch every branch through [`Scheduler::enqueue`];
//! - `Forever` reschedules each iteration through [`Scheduler::enqueue`];
//! - `Retry` with backoff delays re-attempts through [`Scheduler::enqueue_after`].
//!
//! No ordering is promised between unrelated units; a scheduler may run them on any
//! worker thread.
//!
//! ## Implementations
//! - [`TokioScheduler`] spawns onto a tokio runtime and tracks in-flight work.
//! - [`QueueScheduler`] is a single-threaded cooperative run queue with a virtual clock.

mod queue;
mod runtime;

use std::sync::Arc;
use std::time::Duration;

pub use queue::QueueScheduler;
pub use runtime::TokioScheduler;

/// Unit of work accepted by a scheduler.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to a scheduler.
pub type SchedulerRef = Arc<dyn Scheduler>;

/// Host scheduler contract.
pub trait Scheduler: Send + Sync + 'static {
    /// Runs `work` later. Fire-and-forget.
    fn enqueue(&self, work: Work);

    /// Runs `work` no earlier than `delay` from now.
    ///
    /// Schedulers without a clock may ignore the delay; the default does exactly that.
    fn enqueue_after(&self, delay: Duration, work: Work) {
        let _ = delay;
        self.enqueue(work);
    }
}
