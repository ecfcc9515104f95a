//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(Continuation<T>)`. The closure is called once per
//! [`Task::run`], so retrying or repeating a `TaskFn` repeats its side effects.
//!
//! ## Example
//! ```rust
//! use taskflow::{Continuation, TaskFn, TaskRef};
//!
//! let t: TaskRef<u32> = TaskFn::arc("answer", |done: Continuation<u32>| done(Ok(42)));
//! assert_eq!(t.name(), "answer");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::tasks::task::{Continuation, Task};

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<T, F> Task<T> for TaskFn<F>
where
    F: Fn(Continuation<T>) + Send + Sync + 'static, // Fn, not FnMut
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, done: Continuation<T>) {
        (self.f)(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskFailure;
    use crate::tasks::task::Outcome;
    use std::sync::Mutex;

    #[test]
    fn test_closure_runs_once_per_call() {
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let task = TaskFn::arc("count", move |done: Continuation<()>| {
            *counter.lock().unwrap() += 1;
            done(Ok(()))
        });

        task.run_with(|res: Outcome<()>| assert!(res.is_ok()));
        task.run_with(|res: Outcome<()>| assert!(res.is_ok()));
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_failure_passes_through() {
        let task = TaskFn::new("fail", |done: Continuation<u8>| {
            done(Err(TaskFailure::msg("nope")))
        });
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        task.run_with(move |res: Outcome<u8>| {
            *slot.lock().unwrap() = Some(res.unwrap_err().as_message());
        });
        assert_eq!(seen.lock().unwrap().as_deref(), Some("nope"));
    }
}
