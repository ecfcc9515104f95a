//! # Events emitted by combinators while a flow runs.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Flow events**: a combinator run starting, completing or failing
//! - **Step events**: progress inside a run (stages, branches, attempts, iterations)
//! - **Subscriber events**: problems delivering events to subscribers
//!
//! The [`Event`] struct carries metadata such as the flow name, the step index or
//! attempt number, and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Branches of a fan-out may publish concurrently; use `seq` to restore publish order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use taskflow::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_flow("fetch")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(200));
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.flow.as_deref(), Some("fetch"));
//! assert_eq!(ev.delay_ms, Some(200));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Flow events ===
    /// A combinator run started.
    ///
    /// Sets:
    /// - `flow`: combinator name
    FlowStarting,

    /// A combinator run delivered success to its continuation.
    ///
    /// Sets:
    /// - `flow`: combinator name
    FlowCompleted,

    /// A combinator run delivered a failure to its continuation.
    ///
    /// Sets:
    /// - `flow`: combinator name
    /// - `reason`: failure message
    FlowFailed,

    // === Step events ===
    /// A sequential step (series task or waterfall stage) succeeded.
    ///
    /// Sets:
    /// - `flow`: combinator name
    /// - `index`: 0-based step index
    StageCompleted,

    /// A fan-out branch succeeded.
    ///
    /// Sets:
    /// - `flow`: combinator name
    /// - `index`: 0-based branch index
    BranchCompleted,

    /// A fan-out branch reported the first failure of the run.
    ///
    /// Sets:
    /// - `flow`, `index`, `reason`
    BranchFailed,

    /// A fan-out branch failed after the run already failed; the outcome was dropped.
    ///
    /// Sets:
    /// - `flow`, `index`, `reason`
    FailureSuppressed,

    /// A retry attempt failed (delivered or not).
    ///
    /// Sets:
    /// - `flow`: combinator name
    /// - `task`: retried task name
    /// - `attempt`: 1-based attempt number
    /// - `reason`: failure message
    AttemptFailed,

    /// The next retry attempt was scheduled.
    ///
    /// Sets:
    /// - `flow`, `task`
    /// - `attempt`: number of the attempt about to run
    /// - `delay_ms`: delay before it (only with backoff)
    RetryScheduled,

    /// All retry attempts failed; the last failure is delivered.
    ///
    /// Sets:
    /// - `flow`, `task`, `attempt`, `reason`
    RetryExhausted,

    /// One successful iteration of a forever loop finished.
    ///
    /// Sets:
    /// - `flow`, `task`
    /// - `attempt`: 1-based iteration number
    IterationCompleted,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,
}

impl EventKind {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::FlowStarting => "flow_starting",
            EventKind::FlowCompleted => "flow_completed",
            EventKind::FlowFailed => "flow_failed",
            EventKind::StageCompleted => "stage_completed",
            EventKind::BranchCompleted => "branch_completed",
            EventKind::BranchFailed => "branch_failed",
            EventKind::FailureSuppressed => "failure_suppressed",
            EventKind::AttemptFailed => "attempt_failed",
            EventKind::RetryScheduled => "retry_scheduled",
            EventKind::RetryExhausted => "retry_exhausted",
            EventKind::IterationCompleted => "iteration_completed",
            EventKind::SubscriberPanicked => "subscriber_panicked",
            EventKind::SubscriberOverflow => "subscriber_overflow",
        }
    }
}

/// Engine event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the combinator that published the event.
    pub flow: Option<Arc<str>>,
    /// Name of the task (or subscriber) involved, if any.
    pub task: Option<Arc<str>>,
    /// Step or branch index (0-based).
    pub index: Option<u32>,
    /// Attempt or iteration number (1-based).
    pub attempt: Option<u32>,
    /// Delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (failures, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            flow: None,
            task: None,
            index: None,
            attempt: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches the publishing combinator's name.
    #[inline]
    pub fn with_flow(mut self, flow: impl Into<Arc<str>>) -> Self {
        self.flow = Some(flow.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a step/branch index (saturates at `u32::MAX`).
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(u32::try_from(index).unwrap_or(u32::MAX));
        self
    }

    /// Attaches an attempt/iteration number.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::FlowStarting);
        let b = Event::new(EventKind::FlowCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_delay_saturates_at_u32() {
        let ev = Event::new(EventKind::RetryScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_overflow_helper_sets_reason() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
