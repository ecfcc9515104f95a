//! # TokioScheduler: spawn work onto a tokio runtime.
//!
//! Every unit becomes a tokio task on the configured [`Handle`]. On a multi-thread
//! runtime branches of a fan-out really do run in parallel; the engine's join state is
//! atomic for that reason.
//!
//! Spawned units are registered with a [`TaskTracker`] so callers can wait until all
//! flows on this scheduler have quiesced:
//! ```text
//! enqueue(w)          ──► tracker.spawn_on(async { w() }, handle)
//! enqueue_after(d, w) ──► tracker.spawn_on(async { sleep(d).await; w() }, handle)
//! idle().await        ──► resolves once no tracked unit is left (tracker stays closed)
//! ```
//! A unit that reschedules itself (e.g. `Forever`) spawns its successor before it
//! finishes, so `idle()` keeps waiting while such a loop is alive.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;

use super::{Scheduler, Work};

/// Scheduler backed by a tokio runtime handle.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
    tracker: TaskTracker,
}

impl TokioScheduler {
    /// Creates a scheduler spawning onto `handle`.
    pub fn new(handle: Handle) -> Self {
        // A closed tracker still accepts spawns; closing only lets `wait` finish once empty.
        let tracker = TaskTracker::new();
        tracker.close();
        Self { handle, tracker }
    }

    /// Creates a scheduler for the runtime of the calling context.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime (see [`Handle::current`]).
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Number of spawned units that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits until every unit spawned so far (and everything they spawn) has finished.
    ///
    /// Any number of callers may wait at once.
    pub async fn idle(&self) {
        self.tracker.wait().await;
    }
}

impl Scheduler for TokioScheduler {
    fn enqueue(&self, work: Work) {
        self.tracker.spawn_on(async move { work() }, &self.handle);
    }

    fn enqueue_after(&self, delay: Duration, work: Work) {
        self.tracker.spawn_on(
            async move {
                tokio::time::sleep(delay).await;
                work()
            },
            &self.handle,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_idle_waits_for_all_units() {
        let sched = TokioScheduler::current();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..32 {
            let h = Arc::clone(&hits);
            sched.enqueue(Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }));
        }
        sched.idle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 32);
        assert_eq!(sched.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_work_waits_for_timer() {
        let sched = TokioScheduler::current();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        sched.enqueue_after(
            Duration::from_secs(5),
            Box::new(move || {
                h.fetch_add(1, Ordering::SeqCst);
            }),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        sched.idle().await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_idle_callers_all_return() {
        let sched = TokioScheduler::current();
        let hits = Arc::new(AtomicUsize::new(0));
        for round in 0..3 {
            for _ in 0..8 {
                let h = Arc::clone(&hits);
                sched.enqueue_after(
                    Duration::from_millis(5),
                    Box::new(move || {
                        h.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }
            let (a, b) = (sched.clone(), sched.clone());
            let waiters = tokio::time::timeout(Duration::from_secs(5), async {
                tokio::join!(
                    tokio::spawn(async move { a.idle().await }),
                    tokio::spawn(async move { b.idle().await }),
                    sched.idle(),
                )
            })
            .await
            .expect("idle callers hung");
            assert!(waiters.0.is_ok() && waiters.1.is_ok());
            assert_eq!(hits.load(Ordering::SeqCst), 8 * (round + 1));
        }
        assert_eq!(sched.in_flight(), 0);
    }
}
