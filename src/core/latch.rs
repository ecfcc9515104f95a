//! # Latch: once-only continuation delivery.
//!
//! Several branches may race to report the final outcome of a fan-out. The latch holds
//! the pending [`Continuation`] in a [`Slot`] and guards it with an atomic flag: the
//! first [`deliver`](Latch::deliver) wins, every later call is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::slot::Slot;
use crate::tasks::{Continuation, Outcome};

/// Once-only holder for a continuation.
pub struct Latch<T> {
    delivered: AtomicBool,
    done: Slot<Continuation<T>>,
}

impl<T> Latch<T> {
    /// Arms the latch with the continuation to call.
    pub fn new(done: Continuation<T>) -> Self {
        Self {
            delivered: AtomicBool::new(false),
            done: Slot::new(done),
        }
    }

    /// Delivers `outcome` if nothing was delivered before.
    ///
    /// Returns `true` for the single winning call. The continuation runs on the
    /// caller's thread, outside any lock.
    pub fn deliver(&self, outcome: Outcome<T>) -> bool {
        if self.delivered.swap(true, Ordering::AcqRel) {
            return false;
        }
        match self.done.take() {
            Some(done) => {
                done(outcome);
                true
            }
            None => false,
        }
    }

    /// True once an outcome has been delivered.
    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }
}
