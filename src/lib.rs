//! # taskflow
//!
//! **Taskflow** is a small library of continuation-passing control-flow combinators.
//!
//! A task is anything that, handed a continuation, eventually calls it exactly once with
//! an outcome. Combinators compose tasks into larger tasks: run them in order, feed
//! one's value into the next, fan out over a collection, retry, or repeat. The library
//! never blocks and owns no event loop; work that must happen "later" is handed to a
//! [`Scheduler`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    TaskFn    │   │  FutureTask  │   │  user Task   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Combinators (each is itself a Task)                              │
//! │  Series · Waterfall · Each · Parallel · Retry · Forever           │
//! └──────┬──────────────────────────────┬─────────────────────────────┘
//!        │ enqueue / enqueue_after      │ publish(Event)   (with_bus)
//!        ▼                              ▼
//! ┌──────────────────────┐   ┌──────────────────────────────────────┐
//! │ Scheduler            │   │ Bus (broadcast channel)              │
//! │ - TokioScheduler     │   │ (capacity: Config::bus_capacity)     │
//! │ - QueueScheduler     │   └──────────────────┬───────────────────┘
//! └──────────────────────┘                      ▼
//!                                     ┌───────────────────┐
//!                                     │  Flows listener   │
//!                                     └─────────┬─────────┘
//!                                               ▼
//!                                         SubscriberSet
//!                                      ┌────────┼────────┐
//!                                      ▼        ▼        ▼
//!                                   worker1  worker2  workerN
//!                                      ▼        ▼        ▼
//!                                   sub.on_event(&Event)
//! ```
//!
//! ### Exactly-once delivery
//! ```text
//! Series / Waterfall  ── the continuation is a Box<dyn FnOnce>, moved into the next step
//! Retry / Forever     ── a single attempt is in flight at any time
//! Each / Parallel     ── FanIn (atomic counter + first-failure flag) + Latch
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Tasks**         | Define tasks from closures or futures, await any task.        | [`Task`], [`TaskFn`], [`FutureTask`], [`complete`] |
//! | **Combinators**   | Sequential, fan-out and repeating flows.                      | [`Series`], [`Waterfall`], [`Each`], [`Parallel`], [`Retry`], [`Forever`] |
//! | **Scheduling**    | Pluggable host scheduler.                                     | [`Scheduler`], [`TokioScheduler`], [`QueueScheduler`] |
//! | **Policies**      | Delay re-attempts.                                            | [`BackoffPolicy`], [`JitterPolicy`]        |
//! | **Subscriber API**| Observe flow progress.                                        | [`Subscribe`], [`SubscriberSet`], [`Event`] |
//! | **Errors**        | One failure type for tasks, typed engine errors.              | [`TaskFailure`], [`FlowError`]             |
//! | **Configuration** | Defaults for combinators built through the factory.           | [`Config`], [`Flows`]                      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskflow::{Config, Continuation, Flows, TaskFailure, TaskFn, TaskRef, TokioScheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn taskflow::Subscribe>> = vec![Arc::new(taskflow::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn taskflow::Subscribe>> = Vec::new();
//!
//!     let sched = TokioScheduler::current();
//!     let flows = Flows::builder(Config::default(), Arc::new(sched.clone()))
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     let read: TaskRef<String> = TaskFn::arc("read", |done: Continuation<String>| {
//!         done(Ok(" 41 ".to_string()))
//!     });
//!     let answer = flows
//!         .waterfall(read)
//!         .then(|text: String, done: Continuation<i64>| {
//!             done(text.trim().parse::<i64>().map_err(TaskFailure::new))
//!         })
//!         .then(|n: i64, done: Continuation<i64>| done(Ok(n + 1)));
//!
//!     let value = taskflow::complete(&answer).await?;
//!     assert_eq!(value, 42);
//!
//!     flows.shutdown().await;
//!     Ok(())
//! }
//! ```

mod combinators;
mod core;
mod error;
mod events;
mod policies;
mod scheduler;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use combinators::{Each, Forever, Parallel, Retry, Series, Waterfall};
pub use core::{Config, Flows, FlowsBuilder, Latch, Slot};
pub use error::{Cause, FlowError, TaskFailure};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use scheduler::{QueueScheduler, Scheduler, SchedulerRef, TokioScheduler, Work};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Continuation, FutureTask, Outcome, Task, TaskFn, TaskRef, complete};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
