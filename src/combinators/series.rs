//! # Series: run tasks one after another, collect ordered values.
//!
//! ```text
//! run(done)
//!   step(0, [])
//!     ├─► tasks[i].run(k)
//!     │     ├─ Ok(v)  ──► acc.push(v), publish StageCompleted{i}, next i
//!     │     └─ Err(e) ──► publish FlowFailed, done(Err(e))      (later tasks never start)
//!     └─► i == len ──► publish FlowCompleted, done(Ok(acc))
//! ```
//!
//! ## Rules
//! - Task `i + 1` starts only from task `i`'s continuation.
//! - The first failure is delivered as-is; nothing is aggregated.
//! - An empty series delivers `Ok(vec![])` before `run` returns.
//! - Tasks that complete before their `run` returns are stepped by a loop, so long
//!   synchronous series do not grow the stack.

use std::borrow::Cow;
use std::sync::Arc;

use crate::core::Handoff;
use crate::events::{Bus, EventKind, Trace};
use crate::tasks::{Continuation, Outcome, Task, TaskRef};

/// Ordered, short-circuiting sequence of same-typed tasks.
///
/// # Example
/// ```
/// use taskflow::{Continuation, Outcome, Series, Task, TaskFn, TaskRef};
///
/// let one: TaskRef<u8> = TaskFn::arc("one", |done: Continuation<u8>| done(Ok(1)));
/// let two: TaskRef<u8> = TaskFn::arc("two", |done: Continuation<u8>| done(Ok(2)));
///
/// Series::new(vec![one, two]).run_with(|res: Outcome<Vec<u8>>| {
///     assert_eq!(res.unwrap(), vec![1, 2]);
/// });
/// ```
pub struct Series<T> {
    tasks: Arc<[TaskRef<T>]>,
    trace: Trace,
}

impl<T: Send + 'static> Series<T> {
    /// Creates a series over `tasks`, run in the given order.
    pub fn new(tasks: Vec<TaskRef<T>>) -> Self {
        Self {
            tasks: tasks.into(),
            trace: Trace::new("series"),
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

    /// Number of tasks in the series.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if the series has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T: Send + 'static> Task<Vec<T>> for Series<T> {
    fn name(&self) -> &str {
        self.trace.flow()
    }

    fn run(&self, done: Continuation<Vec<T>>) {
        self.trace.starting();
        let run = Arc::new(SeriesRun {
            tasks: Arc::clone(&self.tasks),
            trace: self.trace.clone(),
        });
        run.step(0, Vec::with_capacity(self.tasks.len()), done);
    }
}

/// State of one `run` call.
struct SeriesRun<T> {
    tasks: Arc<[TaskRef<T>]>,
    trace: Trace,
}

type Carry<T> = (Vec<T>, Continuation<Vec<T>>);

impl<T: Send + 'static> SeriesRun<T> {
    /// Runs tasks from `index` on; loops while they complete before `run` returns.
    fn step(self: Arc<Self>, mut index: usize, acc: Vec<T>, done: Continuation<Vec<T>>) {
        let mut carry = (acc, done);
        loop {
            let Some(task) = self.tasks.get(index).cloned() else {
                let (acc, done) = carry;
                self.trace.completed();
                done(Ok(acc));
                return;
            };

            let gate: Arc<Handoff<Outcome<T>, Carry<T>>> = Arc::new(Handoff::new());
            let run = Arc::clone(&self);
            let k = Arc::clone(&gate);
            task.run(Box::new(move |res: Outcome<T>| {
                if let Some((carry, res)) = k.settle(res) {
                    run.resume(index, carry, res);
                }
            }));

            let Some((parked, res)) = gate.park(carry) else {
                return;
            };
            match self.advance(index, parked, res) {
                Some(next) => {
                    carry = next;
                    index += 1;
                }
                None => return,
            }
        }
    }

    fn resume(self: Arc<Self>, index: usize, carry: Carry<T>, res: Outcome<T>) {
        if let Some((acc, done)) = self.advance(index, carry, res) {
            self.step(index + 1, acc, done);
        }
    }

    /// Applies task `index`'s outcome; `None` once `done` has been called.
    fn advance(
        &self,
        index: usize,
        (mut acc, done): Carry<T>,
        res: Outcome<T>,
    ) -> Option<Carry<T>> {
        match res {
            Ok(value) => {
                acc.push(value);
                self.trace
                    .emit(EventKind::StageCompleted, |ev| ev.with_index(index));
                Some((acc, done))
            }
            Err(err) => {
                self.trace.failed(&err);
                done(Err(err));
                None
            }
        }
    }
}
