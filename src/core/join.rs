//! # FanIn: shared join state for concurrent branches.
//!
//! One [`FanIn`] is created per fan-out run and shared by all its branches. It answers
//! two questions atomically:
//! - "was this the last success?" ([`FanIn::succeed`], `fetch_add` on a counter);
//! - "was this the first failure?" ([`FanIn::fail`], `swap` on a flag).
//!
//! A failed branch never increments the counter, so once any branch fails the success
//! path can no longer reach the total.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Completion counter plus once-only failure flag.
#[derive(Debug)]
pub struct FanIn {
    total: usize,
    completed: AtomicUsize,
    failed: AtomicBool,
}

impl FanIn {
    /// Creates join state for `total` branches.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            failed: AtomicBool::new(false),
        }
    }

    /// Records one success; returns `true` if it completed the whole set.
    pub fn succeed(&self) -> bool {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1 == self.total
    }

    /// Records one failure; returns `true` only for the first one.
    pub fn fail(&self) -> bool {
        !self.failed.swap(true, Ordering::AcqRel)
    }

    /// True once any branch has failed.
    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }
}
