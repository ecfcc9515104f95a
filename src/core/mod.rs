//! Engine core: shared run state and the `Flows` factory.
//!
//! - [`slot`]: shared single-value cell;
//! - [`latch`]: once-only holder of a continuation;
//! - [`handoff`]: lets sequential loops absorb synchronous completions;
//! - [`join`]: completion counter and first-failure flag for fan-outs;
//! - [`config`]: defaults applied by the factory;
//! - [`flows`] and [`builder`]: the factory wiring scheduler, bus and subscribers.

mod builder;
mod config;
mod flows;
mod handoff;
mod join;
mod latch;
mod slot;

pub use builder::FlowsBuilder;
pub use config::Config;
pub use flows::Flows;
pub(crate) use handoff::Handoff;
pub(crate) use join::FanIn;
pub use latch::Latch;
pub use slot::Slot;
