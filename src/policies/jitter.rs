//! # Jitter for retry delays.
//!
//! Spreads re-attempts of many concurrent retries (e.g. every branch of an `Each` wrapped
//! in `Retry`) so they do not hit a shared dependency in lockstep.
//!
//! - [`JitterPolicy::None`] exact delay
//! - [`JitterPolicy::Full`] uniform in `[0, base]`
//! - [`JitterPolicy::Equal`] `base/2 + uniform[0, base/2]`
//! - [`JitterPolicy::Decorrelated`] uniform in `[floor, min(base × 3, cap)]`

use std::time::Duration;

use rand::Rng;

/// Randomization strategy for backoff delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// Use the delay as computed.
    #[default]
    None,
    /// Anywhere between zero and the delay.
    Full,
    /// At least half the delay.
    Equal,
    /// Between the policy's floor and three times the delay, capped.
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to `base`; `floor` and `cap` bound the decorrelated range.
    pub fn apply(&self, base: Duration, floor: Duration, cap: Duration) -> Duration {
        let base_ms = millis(base);
        match self {
            JitterPolicy::None => base,
            JitterPolicy::Full => Duration::from_millis(uniform(0, base_ms)),
            JitterPolicy::Equal => {
                let half = base_ms / 2;
                Duration::from_millis(half + uniform(0, base_ms - half))
            }
            JitterPolicy::Decorrelated => {
                let lo = millis(floor);
                let hi = base_ms.saturating_mul(3).min(millis(cap)).max(lo);
                Duration::from_millis(uniform(lo, hi))
            }
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn uniform(lo: u64, hi: u64) -> u64 {
    if lo >= hi {
        return lo;
    }
    rand::rng().random_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(123);
        assert_eq!(JitterPolicy::None.apply(d, Duration::ZERO, d), d);
    }

    #[test]
    fn test_zero_delay_stays_zero() {
        for policy in [JitterPolicy::Full, JitterPolicy::Equal] {
            assert_eq!(
                policy.apply(Duration::ZERO, Duration::ZERO, Duration::ZERO),
                Duration::ZERO
            );
        }
    }

    #[test]
    fn test_decorrelated_collapses_to_floor_when_range_empty() {
        let floor = Duration::from_millis(500);
        let d = JitterPolicy::Decorrelated.apply(Duration::from_millis(10), floor, floor);
        assert_eq!(d, floor);
    }
}
