//! # Waterfall: thread each stage's value into the next stage.
//!
//! Stages are declared in forward order and may change the value type at every
//! boundary. Each [`Waterfall::then`] composes the chain built so far with one more
//! stage, so the finished waterfall is a single continuation-passing function:
//! ```text
//! Waterfall::new(t0)                 chain0(k)  = t0.run(k)
//!     .then(s1)                      chain1(k)  = chain0(|r| r ? s1(v, k) : k(Err))
//!     .then(s2)                      chain2(k)  = chain1(|r| r ? s2(v, k) : k(Err))
//!
//! run(done) ──► chain2(done): t0 runs first, s2 last
//! ```
//!
//! ## Rules
//! - Stage `k + 1` starts only from stage `k`'s success.
//! - A failure skips every later stage and reaches `done` unchanged.
//! - Type safety across stages is enforced by `then`'s signature, not at runtime.

use std::borrow::Cow;
use std::sync::Arc;

use crate::events::{Bus, EventKind, Trace};
use crate::tasks::{Continuation, Outcome, Task, TaskRef};

type Chain<T> = Arc<dyn Fn(Trace, Continuation<T>) + Send + Sync + 'static>;

/// Heterogeneous pipeline of stages.
///
/// # Example
/// ```
/// use taskflow::{Continuation, Outcome, Task, TaskFailure, TaskFn, Waterfall};
///
/// let flow = Waterfall::new(TaskFn::arc("read", |done: Continuation<String>| {
///     done(Ok("42".to_string()))
/// }))
/// .then(|text: String, done: Continuation<i64>| {
///     done(text.parse::<i64>().map_err(TaskFailure::new))
/// });
///
/// flow.run_with(|res: Outcome<i64>| assert_eq!(res.unwrap(), 42));
/// ```
pub struct Waterfall<T> {
    chain: Chain<T>,
    stages: usize,
    trace: Trace,
}

impl<T: Send + 'static> Waterfall<T> {
    /// Starts a waterfall whose first stage is `first`.
    pub fn new(first: TaskRef<T>) -> Self {
        let chain: Chain<T> =
            Arc::new(move |_trace: Trace, done: Continuation<T>| first.run(done));
        Self {
            chain,
            stages: 1,
            trace: Trace::new("waterfall"),
        }
    }

    /// Appends a stage receiving the previous stage's value.
    pub fn then<U, F>(self, stage: F) -> Waterfall<U>
    where
        U: Send + 'static,
        F: Fn(T, Continuation<U>) + Send + Sync + 'static,
    {
        let parent = self.chain;
        let index = self.stages - 1;
        let stage = Arc::new(stage);

        let chain: Chain<U> = Arc::new(move |trace: Trace, done: Continuation<U>| {
            let stage = Arc::clone(&stage);
            let inner = trace.clone();
            parent(
                trace,
                Box::new(move |res: Outcome<T>| match res {
                    Ok(value) => {
                        inner.emit(EventKind::StageCompleted, |ev| ev.with_index(index));
                        stage(value, done);
                    }
                    Err(err) => done(Err(err)),
                }),
            );
        });

        Waterfall {
            chain,
            stages: self.stages + 1,
            trace: self.trace,
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

    /// Number of stages, including the first task.
    pub fn stages(&self) -> usize {
        self.stages
    }
}

impl<T: Send + 'static> Task<T> for Waterfall<T> {
    fn name(&self) -> &str {
        self.trace.flow()
    }

    fn run(&self, done: Continuation<T>) {
        self.trace.starting();
        let trace = self.trace.clone();
        let last = self.stages - 1;
        (self.chain)(
            self.trace.clone(),
            Box::new(move |res: Outcome<T>| {
                match &res {
                    Ok(_) => {
                        trace.emit(EventKind::StageCompleted, |ev| ev.with_index(last));
                        trace.completed();
                    }
                    Err(err) => trace.failed(err),
                }
                done(res);
            }),
        );
    }
}
