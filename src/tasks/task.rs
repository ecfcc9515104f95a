//! # Task abstraction.
//!
//! A [`Task`] is a one-shot unit of asynchronous work: given a [`Continuation`] it begins
//! work and guarantees the continuation is invoked exactly once, either synchronously
//! before [`Task::run`] returns or later from any thread.
//!
//! The continuation is a boxed `FnOnce`, so a second invocation is unrepresentable:
//! whoever holds it can call it at most once.
//!
//! A task may be run many times (retry and forever re-run the same task); each `run`
//! receives a fresh continuation.

use std::sync::Arc;

use crate::error::TaskFailure;

/// Terminal outcome of a task: a value or a failure, never both.
pub type Outcome<T> = Result<T, TaskFailure>;

/// Callback receiving a task's terminal outcome.
pub type Continuation<T> = Box<dyn FnOnce(Outcome<T>) + Send + 'static>;

/// Shared handle to a task.
pub type TaskRef<T> = Arc<dyn Task<T>>;

/// # Callback-style asynchronous unit.
///
/// Implementors must invoke `done` exactly once per [`run`](Task::run) call. Combinators
/// in this crate implement `Task` themselves, so flows nest freely.
///
/// # Example
/// ```
/// use taskflow::{Continuation, Outcome, Task};
///
/// struct Answer;
///
/// impl Task<u32> for Answer {
///     fn name(&self) -> &str { "answer" }
///
///     fn run(&self, done: Continuation<u32>) {
///         done(Ok(42));
///     }
/// }
///
/// Answer.run_with(|res: Outcome<u32>| assert_eq!(res.unwrap(), 42));
/// ```
pub trait Task<T>: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Begins the work; `done` receives the outcome exactly once.
    fn run(&self, done: Continuation<T>);

    /// Convenience for [`run`](Task::run) with an unboxed closure.
    fn run_with<F>(&self, done: F)
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
        Self: Sized,
    {
        self.run(Box::new(done));
    }
}

impl<T, K> Task<T> for Arc<K>
where
    K: Task<T> + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run(&self, done: Continuation<T>) {
        (**self).run(done)
    }
}
