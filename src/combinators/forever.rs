//! # Forever: repeat a task until it fails.
//!
//! ```text
//! iterate(n)
//!   └─► task.run(k)
//!         ├─ Ok(())  ──► publish IterationCompleted{n}
//!         │              scheduler.enqueue(|| iterate(n + 1))     (fresh stack frame)
//!         └─ Err(e)  ──► publish FlowFailed, done(Err(e))
//! ```
//!
//! The loop only ever ends with a failure, so it is a `Task<Infallible>`: the success
//! branch of its outcome cannot be constructed.
//!
//! Every iteration is handed back to the scheduler instead of being started from the
//! previous iteration's continuation. Tasks that complete synchronously would otherwise
//! nest one frame per iteration and eventually overflow the stack.

use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::Arc;

use crate::events::{Bus, EventKind, Trace};
use crate::scheduler::SchedulerRef;
use crate::tasks::{Continuation, Outcome, Task, TaskRef};

/// Unbounded repetition of a task.
///
/// # Example
/// ```
/// use std::convert::Infallible;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use taskflow::{Continuation, Forever, Outcome, QueueScheduler, Task, TaskFailure, TaskFn, TaskRef};
///
/// let sched = Arc::new(QueueScheduler::new());
/// let polls = Arc::new(AtomicU32::new(0));
/// let p = Arc::clone(&polls);
/// let poll: TaskRef<()> = TaskFn::arc("poll", move |done: Continuation<()>| {
///     if p.fetch_add(1, Ordering::SeqCst) == 9 {
///         done(Err(TaskFailure::msg("upstream gone")))
///     } else {
///         done(Ok(()))
///     }
/// });
///
/// Forever::new(poll, sched.clone()).run_with(|res: Outcome<Infallible>| {
///     assert_eq!(res.unwrap_err().as_message(), "upstream gone");
/// });
/// sched.run_until_idle();
/// assert_eq!(polls.load(Ordering::SeqCst), 10);
/// ```
pub struct Forever {
    task: TaskRef<()>,
    scheduler: SchedulerRef,
    trace: Trace,
}

impl Forever {
    /// Repeats `task`, scheduling every next iteration on `scheduler`.
    pub fn new(task: TaskRef<()>, scheduler: SchedulerRef) -> Self {
        Self {
            task,
            scheduler,
            trace: Trace::new("forever"),
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
}

impl Task<Infallible> for Forever {
    fn name(&self) -> &str {
        self.trace.flow()
    }

    fn run(&self, done: Continuation<Infallible>) {
        self.trace.starting();
        let run = Arc::new(ForeverRun {
            task: Arc::clone(&self.task),
            task_name: Arc::from(self.task.name()),
            scheduler: Arc::clone(&self.scheduler),
            trace: self.trace.clone(),
        });
        run.iterate(1, done);
    }
}

struct ForeverRun {
    task: TaskRef<()>,
    task_name: Arc<str>,
    scheduler: SchedulerRef,
    trace: Trace,
}

impl ForeverRun {
    fn iterate(self: Arc<Self>, n: u32, done: Continuation<Infallible>) {
        let task = Arc::clone(&self.task);
        task.run(Box::new(move |res: Outcome<()>| match res {
            Ok(()) => {
                self.trace.emit(EventKind::IterationCompleted, |ev| {
                    ev.with_task(Arc::clone(&self.task_name)).with_attempt(n)
                });
                let scheduler = Arc::clone(&self.scheduler);
                scheduler.enqueue(Box::new(move || self.iterate(n.saturating_add(1), done)));
            }
            Err(err) => {
                self.trace.failed(&err);
                done(Err(err));
            }
        }));
    }
}
