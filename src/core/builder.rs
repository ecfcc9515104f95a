use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use super::{config::Config, flows::Flows};
use crate::error::FlowError;
use crate::events::Bus;
use crate::scheduler::SchedulerRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for a [`Flows`] factory.
pub struct FlowsBuilder {
    cfg: Config,
    scheduler: SchedulerRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
    runtime: Option<Handle>,
}

impl FlowsBuilder {
    /// Creates a builder with the given configuration and scheduler.
    pub fn new(cfg: Config, scheduler: SchedulerRef) -> Self {
        Self {
            cfg,
            scheduler,
            subscribers: Vec::new(),
            runtime: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive every event published by combinators from this factory,
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Runtime driving the subscriber workers and the bus listener.
    ///
    /// Defaults to the runtime of the calling context.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the factory.
    ///
    /// Without subscribers no runtime is needed and nothing is spawned.
    ///
    /// # Errors
    /// [`FlowError::NoRuntime`] if subscribers were given but no runtime was set and
    /// none is current.
    pub fn build(self) -> Result<Flows, FlowError> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        if self.subscribers.is_empty() {
            return Ok(Flows::new_internal(self.cfg, self.scheduler, bus, None));
        }

        let runtime = self
            .runtime
            .or_else(|| Handle::try_current().ok())
            .ok_or(FlowError::NoRuntime)?;

        let subs = SubscriberSet::new(self.subscribers, bus.clone(), &runtime);
        let token = CancellationToken::new();
        let listener = Flows::subscriber_listener(&bus, subs, token.clone(), &runtime);

        Ok(Flows::new_internal(
            self.cfg,
            self.scheduler,
            bus,
            Some((token, listener)),
        ))
    }
}
