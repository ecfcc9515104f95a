//! # Backoff between retry attempts.
//!
//! [`BackoffPolicy`] turns "how many failures so far" into "how long to wait before the
//! next attempt". `Retry` consults it only when configured with one; without a policy
//! re-attempts happen immediately.
//!
//! The base delay for the `n`-th re-attempt (0-indexed) is `first × factor^n`, capped at
//! `max`. Jitter is applied to that base and never fed back into later attempts.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskflow::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(50),
//!     max: Duration::from_secs(1),
//!     factor: 3.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! assert_eq!(backoff.delay(0), Duration::from_millis(50));
//! assert_eq!(backoff.delay(2), Duration::from_millis(450));
//! assert_eq!(backoff.delay(5), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Delay schedule for re-attempts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first re-attempt.
    pub first: Duration,
    /// Upper bound for any delay.
    pub max: Duration,
    /// Growth factor per re-attempt (`1.0` = constant).
    pub factor: f64,
    /// Randomization applied to each delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Constant 100ms delay, capped at 30s, no jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Constant delay between attempts.
    pub fn constant(delay: Duration) -> Self {
        Self {
            first: delay,
            max: delay,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Exponential delays: `first`, `first × factor`, ... capped at `max`.
    pub fn exponential(first: Duration, factor: f64, max: Duration) -> Self {
        Self {
            first,
            max,
            factor,
            jitter: JitterPolicy::None,
        }
    }

    /// Returns a copy with the given jitter.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before re-attempt number `n` (0 = the first re-attempt).
    pub fn delay(&self, n: u32) -> Duration {
        let base = self.base(n);
        self.jitter.apply(base, self.first.min(self.max), self.max)
    }

    /// Un-jittered delay, clamped to `max`; non-finite or negative growth clamps too.
    fn base(&self, n: u32) -> Duration {
        let exp = i32::try_from(n).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        if secs.is_finite() && secs >= 0.0 && secs <= self.max.as_secs_f64() {
            Duration::from_secs_f64(secs)
        } else {
            self.max
        }
    }
}
