//! # Retry: re-run a failing task up to `times` extra attempts.
//!
//! ```text
//! attempt(n = 1..)
//!   ├─► task.run(k)
//!   │     ├─ Ok(v)  ──► done(Ok(v))
//!   │     └─ Err(e) ──► publish AttemptFailed{n}
//!   │                   ├─ n ≤ times ──► publish RetryScheduled{n + 1}
//!   │                   │                ├─ no backoff ──► attempt n + 1         (right away)
//!   │                   │                └─ backoff    ──► enqueue_after(delay(n - 1), attempt(n + 1))
//!   │                   └─ n > times ──► publish RetryExhausted, done(Err(e))   (last failure)
//! ```
//!
//! ## Rules
//! - At most `times + 1` executions; `times = 0` runs the task exactly once.
//! - A success is delivered as soon as it happens; remaining attempts are not used.
//! - Only the final failure reaches `done`. Earlier failures are visible as events.
//! - Attempts that fail before their `run` returns are re-run by a loop, so a large
//!   `times` does not grow the stack.

use std::borrow::Cow;
use std::sync::Arc;

use crate::core::Handoff;
use crate::events::{Bus, EventKind, Trace};
use crate::policies::BackoffPolicy;
use crate::scheduler::SchedulerRef;
use crate::tasks::{Continuation, Outcome, Task, TaskRef};

/// Bounded re-execution of a task.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use taskflow::{Continuation, Outcome, Retry, Task, TaskFailure, TaskFn, TaskRef};
///
/// let calls = Arc::new(AtomicU32::new(0));
/// let c = Arc::clone(&calls);
/// let flaky: TaskRef<&'static str> = TaskFn::arc("flaky", move |done: Continuation<&'static str>| {
///     if c.fetch_add(1, Ordering::SeqCst) < 2 {
///         done(Err(TaskFailure::msg("not yet")))
///     } else {
///         done(Ok("ok"))
///     }
/// });
///
/// Retry::new(flaky, 5).run_with(|res: Outcome<&'static str>| assert_eq!(res.unwrap(), "ok"));
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// ```
pub struct Retry<T> {
    task: TaskRef<T>,
    times: u32,
    backoff: Option<(BackoffPolicy, SchedulerRef)>,
    trace: Trace,
}

impl<T: Send + 'static> Retry<T> {
    /// Retries `task` up to `times` times after its first failure.
    pub fn new(task: TaskRef<T>, times: u32) -> Self {
        Self {
            task,
            times,
            backoff: None,
            trace: Trace::new("retry"),
        }
    }

    /// Waits according to `policy` before every re-attempt, using `scheduler`'s timers.
    pub fn with_backoff(mut self, policy: BackoffPolicy, scheduler: SchedulerRef) -> Self {
        self.backoff = Some((policy, scheduler));
        self
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

    /// Maximum number of re-attempts.
    pub fn times(&self) -> u32 {
        self.times
    }
}

impl<T: Send + 'static> Task<T> for Retry<T> {
    fn name(&self) -> &str {
        self.trace.flow()
    }

    fn run(&self, done: Continuation<T>) {
        self.trace.starting();
        let run = Arc::new(RetryRun {
            task: Arc::clone(&self.task),
            task_name: Arc::from(self.task.name()),
            times: self.times,
            backoff: self.backoff.clone(),
            trace: self.trace.clone(),
        });
        run.attempt(1, done);
    }
}

/// State of one `run` call.
struct RetryRun<T> {
    task: TaskRef<T>,
    task_name: Arc<str>,
    times: u32,
    backoff: Option<(BackoffPolicy, SchedulerRef)>,
    trace: Trace,
}

impl<T: Send + 'static> RetryRun<T> {
    /// Runs attempts from `n` on; loops while they fail before `run` returns.
    fn attempt(self: Arc<Self>, mut n: u32, done: Continuation<T>) {
        let mut carry = done;
        loop {
            let gate: Arc<Handoff<Outcome<T>, Continuation<T>>> = Arc::new(Handoff::new());
            let run = Arc::clone(&self);
            let k = Arc::clone(&gate);
            self.task.run(Box::new(move |res: Outcome<T>| {
                if let Some((done, res)) = k.settle(res) {
                    run.resume(n, done, res);
                }
            }));

            let Some((parked, res)) = gate.park(carry) else {
                return;
            };
            match self.advance(n, parked, res) {
                Some(next) => {
                    carry = next;
                    n += 1;
                }
                None => return,
            }
        }
    }

    fn resume(self: Arc<Self>, n: u32, done: Continuation<T>, res: Outcome<T>) {
        if let Some(done) = self.advance(n, done, res) {
            self.attempt(n + 1, done);
        }
    }

    /// Applies attempt `n`'s outcome. Returns `done` when the next attempt should run
    /// right away; `None` once `done` was called or handed to the scheduler.
    fn advance(
        self: &Arc<Self>,
        n: u32,
        done: Continuation<T>,
        res: Outcome<T>,
    ) -> Option<Continuation<T>> {
        let err = match res {
            Ok(value) => {
                self.trace.completed();
                done(Ok(value));
                return None;
            }
            Err(err) => err,
        };

        self.trace.emit(EventKind::AttemptFailed, |ev| {
            ev.with_task(Arc::clone(&self.task_name))
                .with_attempt(n)
                .with_reason(err.as_message())
        });

        if n > self.times {
            self.trace.emit(EventKind::RetryExhausted, |ev| {
                ev.with_task(Arc::clone(&self.task_name))
                    .with_attempt(n)
                    .with_reason(err.as_message())
            });
            self.trace.failed(&err);
            done(Err(err));
            return None;
        }

        let Some((policy, scheduler)) = &self.backoff else {
            self.trace.emit(EventKind::RetryScheduled, |ev| {
                ev.with_task(Arc::clone(&self.task_name)).with_attempt(n + 1)
            });
            return Some(done);
        };

        let delay = policy.delay(n - 1);
        self.trace.emit(EventKind::RetryScheduled, |ev| {
            ev.with_task(Arc::clone(&self.task_name))
                .with_attempt(n + 1)
                .with_delay(delay)
        });
        let run = Arc::clone(self);
        scheduler.enqueue_after(delay, Box::new(move || run.attempt(n + 1, done)));
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QueueScheduler, Scheduler, TaskFailure, TaskFn};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Fails the first `failures` calls, then succeeds with the call number.
    fn flaky(failures: u32, calls: &Arc<AtomicU32>) -> TaskRef<u32> {
        let calls = Arc::clone(calls);
        TaskFn::arc("flaky", move |done: Continuation<u32>| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= failures {
                done(Err(TaskFailure::msg(format!("failure {n}"))))
            } else {
                done(Ok(n))
            }
        })
    }

    fn capture() -> (Arc<Mutex<Vec<Outcome<u32>>>>, Continuation<u32>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, Box::new(move |res| sink.lock().unwrap().push(res)))
    }

    #[test]
    fn test_always_failing_runs_times_plus_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let (seen, done) = capture();
        Retry::new(flaky(u32::MAX, &calls), 5).run(done);

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_ref().unwrap_err().as_message(), "failure 6");
    }

    #[test]
    fn test_success_stops_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let (seen, done) = capture();
        Retry::new(flaky(2, &calls), 5).run(done);

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(*seen.lock().unwrap()[0].as_ref().unwrap(), 3);
    }

    #[test]
    fn test_zero_times_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let (seen, done) = capture();
        let retry = Retry::new(flaky(1, &calls), 0);
        retry.run(done);

        assert_eq!(retry.times(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(seen.lock().unwrap()[0].is_err());
    }

    #[test]
    fn test_backoff_delays_reattempts() {
        let sched = Arc::new(QueueScheduler::new());
        let calls = Arc::new(AtomicU32::new(0));
        let policy =
            BackoffPolicy::exponential(Duration::from_millis(10), 2.0, Duration::from_secs(1));
        let retry = Retry::new(flaky(u32::MAX, &calls), 3).with_backoff(policy, sched.clone());
        let (seen, done) = capture();
        retry.run(done);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(seen.lock().unwrap().is_empty());

        sched.run_until_idle();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(sched.now(), Duration::from_millis(10 + 20 + 40));
    }

    #[test]
    fn test_attempt_events() {
        let bus = Bus::new(32);
        let mut rx = bus.subscribe();
        let calls = Arc::new(AtomicU32::new(0));
        Retry::new(flaky(2, &calls), 5)
            .with_name("fetch")
            .with_bus(bus)
            .run(Box::new(|_| {}));

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| (ev.kind, ev.attempt))
            .collect();
        assert_eq!(
            events,
            vec![
                (EventKind::FlowStarting, None),
                (EventKind::AttemptFailed, Some(1)),
                (EventKind::RetryScheduled, Some(2)),
                (EventKind::AttemptFailed, Some(2)),
                (EventKind::RetryScheduled, Some(3)),
                (EventKind::FlowCompleted, None),
            ]
        );
    }

    #[test]
    fn test_exhaustion_is_published() {
        let bus = Bus::new(32);
        let mut rx = bus.subscribe();
        let calls = Arc::new(AtomicU32::new(0));
        Retry::new(flaky(u32::MAX, &calls), 1)
            .with_bus(bus)
            .run(Box::new(|_| {}));

        let tail: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .skip(3)
            .map(|ev| (ev.kind, ev.task.as_deref().map(str::to_owned)))
            .collect();
        assert_eq!(
            tail,
            vec![
                (EventKind::AttemptFailed, Some("flaky".to_owned())),
                (EventKind::RetryExhausted, Some("flaky".to_owned())),
                (EventKind::FlowFailed, None),
            ]
        );
    }

    #[test]
    fn test_many_synchronous_failures_keep_stack_flat() {
        const TIMES: u32 = 100_000;
        let frames = Arc::new(Mutex::new((usize::MAX, 0usize)));
        let calls = Arc::new(AtomicU32::new(0));

        let (f, c) = (Arc::clone(&frames), Arc::clone(&calls));
        let down: TaskRef<u32> = TaskFn::arc("down", move |done: Continuation<u32>| {
            let marker = 0u8;
            let addr = std::ptr::addr_of!(marker) as usize;
            {
                let mut f = f.lock().unwrap();
                f.0 = f.0.min(addr);
                f.1 = f.1.max(addr);
            }
            c.fetch_add(1, Ordering::SeqCst);
            done(Err(TaskFailure::msg("down")))
        });

        let (seen, done) = capture();
        Retry::new(down, TIMES).run(done);

        assert_eq!(calls.load(Ordering::SeqCst), TIMES + 1);
        assert!(seen.lock().unwrap()[0].is_err());
        let (lo, hi) = *frames.lock().unwrap();
        assert!(hi - lo < 64 * 1024, "stack grew by {} bytes", hi - lo);
    }

    #[test]
    fn test_deferred_failures_resume_attempts() {
        let sched = Arc::new(QueueScheduler::new());
        let calls = Arc::new(AtomicU32::new(0));
        let (s, c) = (Arc::clone(&sched), Arc::clone(&calls));
        let remote: TaskRef<u32> = TaskFn::arc("remote", move |done: Continuation<u32>| {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            if n % 2 == 0 {
                s.enqueue(Box::new(move || done(Err(TaskFailure::msg("later")))));
            } else if n < 7 {
                done(Err(TaskFailure::msg("now")))
            } else {
                s.enqueue(Box::new(move || done(Ok(n))));
            }
        });

        let (seen, done) = capture();
        Retry::new(remote, 10).run(done);
        assert!(seen.lock().unwrap().is_empty());

        sched.run_until_idle();
        assert_eq!(calls.load(Ordering::SeqCst), 7);
        assert_eq!(*seen.lock().unwrap()[0].as_ref().unwrap(), 7);
    }
}
