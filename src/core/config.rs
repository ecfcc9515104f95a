//! # Flow configuration.
//!
//! [`Config`] holds the defaults a [`Flows`](crate::Flows) factory applies to the
//! combinators it hands out. Combinators built by hand take their settings explicitly
//! and never read a `Config`.

use crate::policies::BackoffPolicy;

/// Defaults for combinators created through [`Flows`](crate::Flows).
///
/// ## Field semantics
/// - `retries`: extra attempts used by `Flows::retry` (`0` = run once)
/// - `retry_backoff`: delay policy between attempts (`None` = re-attempt right away)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Maximum number of re-attempts after the first failure.
    pub retries: u32,

    /// Backoff between re-attempts.
    ///
    /// With a policy, re-attempts go through `Scheduler::enqueue_after`; a scheduler
    /// without a clock runs them as soon as possible.
    pub retry_backoff: Option<BackoffPolicy>,

    /// Capacity of the event bus broadcast channel.
    ///
    /// A listener that falls more than `bus_capacity` events behind skips the oldest ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// - `retries = 3`
    /// - `retry_backoff = None`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            retries: 3,
            retry_backoff: None,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.retries, 3);
        assert!(cfg.retry_backoff.is_none());
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
