//! # Each: run one branch per item, join once.
//!
//! ```text
//! run(done)
//!   ├─► items empty ──► done(Ok(()))                     (nothing dispatched)
//!   └─► for (i, item) in items:
//!         ├─ join already failed? ──► stop dispatching
//!         └─ scheduler.enqueue(|| f(item, k_i))
//!
//! k_i(Ok)  ──► FanIn::succeed() was last? ──► latch.deliver(Ok(()))
//! k_i(Err) ──► FanIn::fail() was first?   ──► latch.deliver(Err(e))
//!                                   else  ──► drop (FailureSuppressed)
//! ```
//!
//! ## Rules
//! - Branches run in whatever order the scheduler produces, possibly in parallel.
//! - `done` fires exactly once: after every branch succeeded, or on the first failure.
//! - No cancellation: branches dispatched before the failure still run; their outcomes
//!   are swallowed.

use std::borrow::Cow;
use std::sync::Arc;

use crate::core::{FanIn, Latch};
use crate::events::{Bus, EventKind, Trace};
use crate::scheduler::SchedulerRef;
use crate::tasks::{Continuation, Outcome, Task};

type ItemFn<I> = Arc<dyn Fn(I, Continuation<()>) + Send + Sync + 'static>;

/// Concurrent fan-out over a collection.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use taskflow::{Continuation, Each, Outcome, QueueScheduler, Task};
///
/// let sched = Arc::new(QueueScheduler::new());
/// let sum = Arc::new(AtomicU32::new(0));
/// let acc = Arc::clone(&sum);
///
/// let each = Each::new(vec![1, 2, 3], sched.clone(), move |n: u32, done: Continuation<()>| {
///     acc.fetch_add(n, Ordering::SeqCst);
///     done(Ok(()))
/// });
/// each.run_with(|res: Outcome<()>| assert!(res.is_ok()));
///
/// sched.run_until_idle();
/// assert_eq!(sum.load(Ordering::SeqCst), 6);
/// ```
pub struct Each<I> {
    items: Arc<[I]>,
    f: ItemFn<I>,
    scheduler: SchedulerRef,
    trace: Trace,
}

impl<I> Each<I>
where
    I: Clone + Send + Sync + 'static,
{
    /// Creates a fan-out running `f` once per item on `scheduler`.
    pub fn new<F>(items: impl IntoIterator<Item = I>, scheduler: SchedulerRef, f: F) -> Self
    where
        F: Fn(I, Continuation<()>) + Send + Sync + 'static,
    {
        Self {
            items: items.into_iter().collect(),
            f: Arc::new(f),
            scheduler,
            trace: Trace::new("each"),
        }
    }

    /// Renames the flow (used in events).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.trace.set_flow(name.into());
        self
    }

    /// Publishes progress events on `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.trace.set_bus(bus);
        self
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<I> Task<()> for Each<I>
where
    I: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        self.trace.flow()
    }

    fn run(&self, done: Continuation<()>) {
        self.trace.starting();
        if self.items.is_empty() {
            self.trace.completed();
            done(Ok(()));
            return;
        }

        let run = Arc::new(EachRun {
            join: FanIn::new(self.items.len()),
            latch: Latch::new(done),
            trace: self.trace.clone(),
        });

        for (index, item) in self.items.iter().enumerate() {
            if run.join.has_failed() {
                break;
            }
            let run = Arc::clone(&run);
            let f = Arc::clone(&self.f);
            let item = item.clone();
            self.scheduler.enqueue(Box::new(move || {
                f(
                    item,
                    Box::new(move |res: Outcome<()>| run.settle(index, res)),
                )
            }));
        }
    }
}

/// Join state of one `run` call, shared by all branches.
struct EachRun {
    join: FanIn,
    latch: Latch<()>,
    trace: Trace,
}

impl EachRun {
    fn settle(&self, index: usize, res: Outcome<()>) {
        match res {
            Ok(()) => {
                self.trace
                    .emit(EventKind::BranchCompleted, |ev| ev.with_index(index));
                if self.join.succeed() {
                    self.trace.completed();
                    self.latch.deliver(Ok(()));
                }
            }
            Err(err) if self.join.fail() => {
                self.trace.emit(EventKind::BranchFailed, |ev| {
                    ev.with_index(index).with_reason(err.as_message())
                });
                self.trace.failed(&err);
                self.latch.deliver(Err(err));
            }
            Err(err) => {
                self.trace.emit(EventKind::FailureSuppressed, |ev| {
                    ev.with_index(index).with_reason(err.as_message())
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QueueScheduler, Scheduler, Slot, TaskFailure, TokioScheduler, Work};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Runs work on the caller's stack, so branches complete during dispatch.
    struct Inline;

    impl Scheduler for Inline {
        fn enqueue(&self, work: Work) {
            work()
        }
    }

    type Outcomes = Arc<Mutex<Vec<Outcome<()>>>>;

    fn capture() -> (Outcomes, Continuation<()>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, Box::new(move |res| sink.lock().unwrap().push(res)))
    }

    #[test]
    fn test_empty_collection_succeeds_without_dispatch() {
        let sched = Arc::new(QueueScheduler::new());
        let each = Each::new(Vec::<u8>::new(), sched.clone(), |_, done| done(Ok(())));
        let (seen, done) = capture();
        each.run(done);

        assert_eq!(sched.pending(), 0);
        assert!(seen.lock().unwrap()[0].is_ok());
    }

    #[test]
    fn test_all_success_fires_after_every_branch() {
        let sched = Arc::new(QueueScheduler::new());
        let parked: Slot<HashMap<u8, Continuation<()>>> = Slot::new(HashMap::new());
        let p = parked.clone();
        let each = Each::new(0..4u8, sched.clone(), move |i, done| {
            p.with(|m| m.as_mut().map(|m| m.insert(i, done)));
        });
        let (seen, done) = capture();
        each.run(done);

        assert_eq!(sched.run_until_idle(), 4);
        for i in 0..4u8 {
            assert!(seen.lock().unwrap().is_empty(), "fired before branch {i}");
            let k = parked.with(|m| m.as_mut().and_then(|m| m.remove(&i))).unwrap();
            k(Ok(()));
        }
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_ok());
    }

    #[test]
    fn test_single_failure_delivered_once_in_any_order() {
        let orders: [[u8; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orders {
            let sched = Arc::new(QueueScheduler::new());
            let parked: Slot<HashMap<u8, Continuation<()>>> = Slot::new(HashMap::new());
            let p = parked.clone();
            let each = Each::new([0u8, 1, 2], sched.clone(), move |i, done| {
                p.with(|m| m.as_mut().map(|m| m.insert(i, done)));
            });
            let (seen, done) = capture();
            each.run(done);
            sched.run_until_idle();

            for i in order {
                let k = parked.with(|m| m.as_mut().and_then(|m| m.remove(&i))).unwrap();
                if i == 1 {
                    k(Err(TaskFailure::msg("x2")));
                } else {
                    k(Ok(()));
                }
            }

            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1, "order {order:?}");
            assert_eq!(seen[0].as_ref().unwrap_err().as_message(), "x2");
        }
    }

    #[test]
    fn test_later_failures_are_suppressed() {
        let bus = Bus::new(32);
        let mut rx = bus.subscribe();
        let sched = Arc::new(QueueScheduler::new());
        let each = Each::new(0..3u32, sched.clone(), |i, done| {
            done(Err(TaskFailure::msg(format!("item {i}"))))
        })
        .with_bus(bus);
        let (seen, done) = capture();
        each.run(done);
        sched.run_until_idle();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_ref().unwrap_err().as_message(), "item 0");

        let suppressed = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::FailureSuppressed)
            .count();
        assert_eq!(suppressed, 2);
    }

    #[test]
    fn test_dispatch_stops_after_observed_failure() {
        let started = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&started);
        let each = Each::new(0..5u32, Arc::new(Inline), move |i, done| {
            s.fetch_add(1, Ordering::SeqCst);
            if i == 1 {
                done(Err(TaskFailure::msg("stop")))
            } else {
                done(Ok(()))
            }
        });
        let (seen, done) = capture();
        each.run(done);

        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_branches_join_exactly_once() {
        for fail_every in [0usize, 3, 7] {
            let sched = TokioScheduler::current();
            let ran = Arc::new(AtomicUsize::new(0));
            let r = Arc::clone(&ran);
            let each = Each::new(0..64usize, Arc::new(sched.clone()), move |i, done| {
                r.fetch_add(1, Ordering::SeqCst);
                if fail_every != 0 && i % fail_every == 0 {
                    done(Err(TaskFailure::msg("flaky")))
                } else {
                    done(Ok(()))
                }
            });
            let (seen, done) = capture();
            each.run(done);
            sched.idle().await;

            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1, "fail_every={fail_every}");
            assert_eq!(seen[0].is_ok(), fail_every == 0);
        }
    }
}
