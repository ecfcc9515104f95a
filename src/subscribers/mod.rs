//! # Event subscribers.
//!
//! Combinators with a bus attached publish [`Event`](crate::Event)s; a [`Flows`](crate::Flows)
//! instance listens on that bus and hands every event to its [`SubscriberSet`].
//!
//! ```text
//!   Series / Each / Retry ... ── publish(Event) ──► Bus ──► Flows listener
//!                                                               │
//!                                                         SubscriberSet::emit
//!                                                   ┌───────────┼───────────┐
//!                                                   ▼           ▼           ▼
//!                                               LogWriter    metrics     custom
//! ```
//!
//! - [`Subscribe`]: the trait to implement.
//! - [`SubscriberSet`]: per-subscriber queues and workers.
//! - `LogWriter` (feature `logging`): prints events to stdout.

#[cfg(feature = "logging")]
mod embedded;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
