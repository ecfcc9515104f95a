//! Engine events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to publish
//! progress of combinator runs.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: every combinator with a bus attached (`with_bus`), and
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the `Flows` listener, which fans out to a `SubscriberSet`.
//!
//! Combinators without a bus publish nothing and allocate no events.

mod bus;
mod event;

use std::borrow::Cow;
use std::sync::Arc;

pub use bus::Bus;
pub use event::{Event, EventKind};

use crate::error::TaskFailure;

/// Per-combinator publishing context: the flow name plus an optional bus.
#[derive(Clone, Debug)]
pub(crate) struct Trace {
    flow: Arc<str>,
    bus: Option<Bus>,
}

impl Trace {
    pub(crate) fn new(flow: &str) -> Self {
        Self {
            flow: Arc::from(flow),
            bus: None,
        }
    }

    pub(crate) fn set_flow(&mut self, flow: Cow<'static, str>) {
        self.flow = Arc::from(flow);
    }

    pub(crate) fn set_bus(&mut self, bus: Bus) {
        self.bus = Some(bus);
    }

    pub(crate) fn flow(&self) -> &str {
        &self.flow
    }

    /// Publishes an event of `kind`, letting `fill` attach the remaining fields.
    pub(crate) fn emit(&self, kind: EventKind, fill: impl FnOnce(Event) -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(fill(Event::new(kind).with_flow(Arc::clone(&self.flow))));
        }
    }

    pub(crate) fn starting(&self) {
        self.emit(EventKind::FlowStarting, |ev| ev);
    }

    pub(crate) fn completed(&self) {
        self.emit(EventKind::FlowCompleted, |ev| ev);
    }

    pub(crate) fn failed(&self, err: &TaskFailure) {
        self.emit(EventKind::FlowFailed, |ev| ev.with_reason(err.as_message()));
    }
}
