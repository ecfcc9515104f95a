//! # Tasks and continuations.
//!
//! - [`Task`]: anything that, given a [`Continuation`], eventually calls it exactly once
//! - [`TaskFn`]: closure-backed task
//! - [`TaskRef`]: shared handle (`Arc<dyn Task<T>>`)
//! - [`complete`] and [`FutureTask`]: bridges between tasks and `async` code

mod future;
mod task;
mod task_fn;

pub use future::{FutureTask, complete};
pub use task::{Continuation, Outcome, Task, TaskRef};
pub use task_fn::TaskFn;
