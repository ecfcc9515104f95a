//! Retry timing policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how long `Retry` waits before each re-attempt (first / factor / max)
//! - [`JitterPolicy`]  randomization applied on top of the computed delay
//!
//! ## Quick wiring
//! ```text
//! Retry::new(task, times).with_backoff(policy, scheduler)
//!      └─► on failure n (1-based, n <= times):
//!           scheduler.enqueue_after(policy.delay(n - 1), re-attempt)
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=100ms, factor=1.0 (constant), max=30s, jitter=None.
//! - `Config::retry_backoff` is `None` by default: re-attempts are immediate.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
