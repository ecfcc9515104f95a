//! # Flows: factory for pre-wired combinators.
//!
//! A [`Flows`] instance owns a scheduler, a [`Config`] and an event [`Bus`]. Every
//! combinator it hands out is already bound to them, so call sites only supply tasks.
//!
//! ## Wiring
//! ```text
//! Flows::builder(cfg, scheduler)
//!     .with_subscribers(subs)                  (optional)
//!     .build()
//!         ├─► Bus::new(cfg.bus_capacity)
//!         └─► subscribers given?
//!               └─► SubscriberSet::new(subs)  + listener: Bus.subscribe() ─► SubscriberSet::emit
//!
//! flows.series(..) / waterfall / each / parallel / retry / forever
//!     └─► combinator.with_bus(bus) [+ scheduler, + cfg.retries / cfg.retry_backoff]
//!
//! flows.shutdown().await
//!     └─► cancel listener ─► drain buffered events ─► SubscriberSet::shutdown (workers drain)
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use taskflow::{Config, Continuation, Flows, Outcome, QueueScheduler, Task, TaskFn, TaskRef};
//!
//! let sched = Arc::new(QueueScheduler::new());
//! let flows = Flows::builder(Config::default(), sched.clone()).build().unwrap();
//!
//! let a: TaskRef<u8> = TaskFn::arc("a", |done: Continuation<u8>| done(Ok(1)));
//! let b: TaskRef<u8> = TaskFn::arc("b", |done: Continuation<u8>| done(Ok(2)));
//! flows.parallel(vec![a, b]).run_with(|res: Outcome<Vec<u8>>| {
//!     assert_eq!(res.unwrap(), vec![1, 2]);
//! });
//! sched.run_until_idle();
//! ```

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{builder::FlowsBuilder, config::Config};
use crate::combinators::{Each, Forever, Parallel, Retry, Series, Waterfall};
use crate::events::Bus;
use crate::scheduler::SchedulerRef;
use crate::subscribers::SubscriberSet;
use crate::tasks::{Continuation, TaskRef};

/// Factory binding combinators to a scheduler, a config and an event bus.
pub struct Flows {
    cfg: Config,
    scheduler: SchedulerRef,
    bus: Bus,
    listener: Option<(CancellationToken, JoinHandle<()>)>,
}

impl Flows {
    /// Starts building a factory.
    pub fn builder(cfg: Config, scheduler: SchedulerRef) -> FlowsBuilder {
        FlowsBuilder::new(cfg, scheduler)
    }

    pub(super) fn new_internal(
        cfg: Config,
        scheduler: SchedulerRef,
        bus: Bus,
        listener: Option<(CancellationToken, JoinHandle<()>)>,
    ) -> Self {
        Self {
            cfg,
            scheduler,
            bus,
            listener,
        }
    }

    /// Subscribes to the bus and forwards events to `subs` until `token` is cancelled.
    ///
    /// Events already buffered when the token fires are still forwarded.
    pub(super) fn subscriber_listener(
        bus: &Bus,
        subs: SubscriberSet,
        token: CancellationToken,
        runtime: &Handle,
    ) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        runtime.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => subs.emit_arc(Arc::new(ev)),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    () = token.cancelled() => break,
                }
            }
            subs.shutdown().await;
        })
    }

    /// Sequential, short-circuiting flow over `tasks`.
    pub fn series<T: Send + 'static>(&self, tasks: Vec<TaskRef<T>>) -> Series<T> {
        Series::new(tasks).with_bus(self.bus.clone())
    }

    /// Pipeline starting with `first`; extend it with [`Waterfall::then`].
    pub fn waterfall<T: Send + 'static>(&self, first: TaskRef<T>) -> Waterfall<T> {
        Waterfall::new(first).with_bus(self.bus.clone())
    }

    /// Fan-out of `f` over `items` on this factory's scheduler.
    pub fn each<I, F>(&self, items: impl IntoIterator<Item = I>, f: F) -> Each<I>
    where
        I: Clone + Send + Sync + 'static,
        F: Fn(I, Continuation<()>) + Send + Sync + 'static,
    {
        Each::new(items, Arc::clone(&self.scheduler), f).with_bus(self.bus.clone())
    }

    /// Fan-out over `tasks` on this factory's scheduler.
    pub fn parallel<T: Send + 'static>(&self, tasks: Vec<TaskRef<T>>) -> Parallel<T> {
        Parallel::new(tasks, Arc::clone(&self.scheduler)).with_bus(self.bus.clone())
    }

    /// Retry with [`Config::retries`] and [`Config::retry_backoff`].
    pub fn retry<T: Send + 'static>(&self, task: TaskRef<T>) -> Retry<T> {
        self.retry_times(task, self.cfg.retries)
    }

    /// Retry with an explicit attempt budget and the configured backoff.
    pub fn retry_times<T: Send + 'static>(&self, task: TaskRef<T>, times: u32) -> Retry<T> {
        let retry = Retry::new(task, times).with_bus(self.bus.clone());
        match self.cfg.retry_backoff {
            Some(policy) => retry.with_backoff(policy, Arc::clone(&self.scheduler)),
            None => retry,
        }
    }

    /// Repeats `task` on this factory's scheduler until it fails.
    pub fn forever(&self, task: TaskRef<()>) -> Forever {
        Forever::new(task, Arc::clone(&self.scheduler)).with_bus(self.bus.clone())
    }

    /// The bus every combinator from this factory publishes on.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The scheduler used for fan-out, repetition and backoff.
    pub fn scheduler(&self) -> SchedulerRef {
        Arc::clone(&self.scheduler)
    }

    /// The configuration this factory was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Delivers every event published so far to the subscribers, then stops them.
    ///
    /// Does not wait for running flows; drain the scheduler first if their events matter.
    pub async fn shutdown(mut self) {
        if let Some((token, listener)) = self.listener.take() {
            token.cancel();
            let _ = listener.await;
        }
    }
}

impl Drop for Flows {
    fn drop(&mut self) {
        if let Some((token, _)) = &self.listener {
            token.cancel();
        }
    }
}
