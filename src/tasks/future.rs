//! # Bridges between callback tasks and futures.
//!
//! - [`complete`] drives any [`Task`] and resolves to its outcome (`async` side waits,
//!   callback side stays unchanged).
//! - [`FutureTask`] wraps a future factory as a [`Task`]: each run spawns a fresh future
//!   onto a tokio runtime and reports its output through the continuation.
//!
//! ## Example
//! ```rust
//! use taskflow::{complete, FutureTask, Outcome, TaskRef};
//! use tokio::runtime::Handle;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let fetch: TaskRef<u32> = FutureTask::arc("fetch", Handle::current(), || async {
//!         Ok::<u32, taskflow::TaskFailure>(7)
//!     });
//!     let res: Outcome<u32> = complete(&fetch).await;
//!     assert_eq!(res.unwrap(), 7);
//! }
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::error::FlowError;
use crate::tasks::task::{Continuation, Outcome, Task};

/// Runs `task` once and waits for its outcome.
///
/// If the task drops its continuation without calling it, resolves to a failure
/// caused by [`FlowError::Abandoned`].
pub async fn complete<T, K>(task: &K) -> Outcome<T>
where
    K: Task<T> + ?Sized,
    T: Send + 'static,
{
    let name = task.name().to_owned();
    let (tx, rx) = oneshot::channel::<Outcome<T>>();
    task.run(Box::new(move |res| {
        let _ = tx.send(res);
    }));

    match rx.await {
        Ok(res) => res,
        Err(_dropped) => Err(FlowError::Abandoned { task: name }.into()),
    }
}

/// Future-backed task implementation.
///
/// Wraps a closure that *creates* a new future per run; the future is spawned on the
/// given runtime handle.
pub struct FutureTask<F> {
    name: Cow<'static, str>,
    handle: Handle,
    f: F,
}

impl<F> FutureTask<F> {
    /// Creates a new future-backed task spawning onto `handle`.
    pub fn new(name: impl Into<Cow<'static, str>>, handle: Handle, f: F) -> Self {
        Self {
            name: name.into(),
            handle,
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, handle: Handle, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, handle, f))
    }
}

impl<T, F, Fut> Task<T> for FutureTask<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome<T>> + Send + 'static,
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, done: Continuation<T>) {
        let fut = (self.f)();
        self.handle.spawn(async move {
            done(fut.await);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TaskFailure, TaskFn};
    use std::time::Duration;

    #[tokio::test]
    async fn test_complete_resolves_synchronous_task() {
        let task = TaskFn::new("sync", |done: Continuation<&'static str>| done(Ok("ready")));
        assert_eq!(complete(&task).await.unwrap(), "ready");
    }

    #[tokio::test]
    async fn test_complete_reports_abandoned_continuation() {
        let task = TaskFn::new("leaky", |done: Continuation<()>| drop(done));
        let err = complete(&task).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlowError>(),
            Some(&FlowError::Abandoned {
                task: "leaky".into()
            })
        );
    }

    #[tokio::test]
    async fn test_future_task_reports_later() {
        let task = FutureTask::new("slow", Handle::current(), || async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err::<u8, _>(TaskFailure::msg("late failure"))
        });
        let err = complete(&task).await.unwrap_err();
        assert_eq!(err.as_message(), "late failure");
    }
}
