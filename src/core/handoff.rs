//! # Handoff: meeting point between a driving loop and one task's continuation.
//!
//! Sequential combinators start a task, then look at whether it already finished:
//! ```text
//! driver                                   continuation
//!   task.run(k) ──────────────────────────► settle(res)
//!   park(carry)                               ├─ driver still here ─► store res
//!     ├─ res stored   ─► (carry, res)         └─ driver parked     ─► (carry, res)
//!     │                  keep looping                                 resume on this stack
//!     └─ nothing yet  ─► store carry, return
//! ```
//! Exactly one side receives `(carry, res)`, whichever arrives second. A task that
//! completes before `run` returns is therefore handled by the loop instead of a nested
//! call, and the stack stays flat however many steps complete synchronously.

use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

enum State<R, S> {
    Waiting,
    Settled(R),
    Parked(S),
    Taken,
}

/// One-step rendezvous of an outcome `R` and the state `S` needed to continue.
pub(crate) struct Handoff<R, S> {
    state: Mutex<State<R, S>>,
}

impl<R, S> Handoff<R, S> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::Waiting),
        }
    }

    /// Continuation side. Returns the parked state if the driver already left.
    pub(crate) fn settle(&self, res: R) -> Option<(S, R)> {
        let mut state = self.lock();
        match mem::replace(&mut *state, State::Taken) {
            State::Waiting => {
                *state = State::Settled(res);
                None
            }
            State::Parked(carry) => Some((carry, res)),
            other => {
                *state = other;
                None
            }
        }
    }

    /// Driver side. Returns `carry` with the outcome if the task already settled,
    /// otherwise keeps `carry` for the continuation.
    pub(crate) fn park(&self, carry: S) -> Option<(S, R)> {
        let mut state = self.lock();
        match mem::replace(&mut *state, State::Taken) {
            State::Settled(res) => Some((carry, res)),
            State::Waiting => {
                *state = State::Parked(carry);
                None
            }
            other => {
                *state = other;
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<R, S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;

    #[test]
    fn test_settled_first_goes_to_driver() {
        let h: Handoff<u32, &str> = Handoff::new();
        assert!(h.settle(7).is_none());
        assert_eq!(h.park("carry"), Some(("carry", 7)));
    }

    #[test]
    fn test_parked_first_goes_to_continuation() {
        let h: Handoff<u32, &str> = Handoff::new();
        assert!(h.park("carry").is_none());
        assert_eq!(h.settle(7), Some(("carry", 7)));
    }

    #[test]
    fn test_exactly_one_side_wins_across_threads() {
        for _ in 0..200 {
            let h: Arc<Handoff<u32, u32>> = Arc::new(Handoff::new());
            let barrier = Arc::new(Barrier::new(2));
            let (h2, b2) = (Arc::clone(&h), Arc::clone(&barrier));
            let other = thread::spawn(move || {
                b2.wait();
                h2.settle(1)
            });
            barrier.wait();
            let mine = h.park(2);
            let theirs = other.join().unwrap();
            assert!(mine.is_some() ^ theirs.is_some());
            assert_eq!(mine.or(theirs), Some((2, 1)));
        }
    }
}
