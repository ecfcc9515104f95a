//! # QueueScheduler: cooperative FIFO run queue.
//!
//! A single-threaded event loop the caller drives explicitly:
//! ```text
//! enqueue(w)            ──► ready queue (FIFO)
//! enqueue_after(d, w)   ──► timer heap, due = now + d
//!
//! run_until_idle():
//!   loop {
//!     ├─► pop ready work      → run it
//!     ├─► else pop next timer → advance virtual clock to its due time, run it
//!     └─► else                → idle, return
//!   }
//! ```
//!
//! Time is virtual: delays never sleep, they only order work and advance [`now`].
//! Work runs from the driving loop's frame, so a chain of rescheduled units does not
//! grow the stack.
//!
//! [`now`]: QueueScheduler::now

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{Scheduler, Work};

struct Timer {
    due: Duration,
    id: u64,
    work: Work,
}

// Min-heap by (due, id): earlier deadline first, FIFO among equal deadlines.
impl Ord for Timer {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Timer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Timer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.id == other.id
    }
}

impl Eq for Timer {}

#[derive(Default)]
struct QueueState {
    ready: VecDeque<Work>,
    timers: BinaryHeap<Timer>,
    now: Duration,
    next_id: u64,
}

/// Cooperative run queue with a virtual clock.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use taskflow::{QueueScheduler, Scheduler};
///
/// let sched = QueueScheduler::new();
/// let hits = Arc::new(AtomicUsize::new(0));
/// let h = Arc::clone(&hits);
/// sched.enqueue(Box::new(move || { h.fetch_add(1, Ordering::SeqCst); }));
///
/// assert_eq!(hits.load(Ordering::SeqCst), 0);
/// assert_eq!(sched.run_until_idle(), 1);
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct QueueScheduler {
    state: Mutex<QueueState>,
}

impl QueueScheduler {
    /// Creates an idle scheduler at virtual time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs queued work (advancing the virtual clock for timers) until nothing is left.
    ///
    /// Returns the number of units executed.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }

    /// Runs a single unit of work; returns `false` if the scheduler was idle.
    pub fn run_one(&self) -> bool {
        let next = {
            let mut st = self.lock();
            match st.ready.pop_front() {
                Some(work) => Some(work),
                None => st.timers.pop().map(|timer| {
                    st.now = st.now.max(timer.due);
                    timer.work
                }),
            }
        };
        match next {
            Some(work) => {
                work();
                true
            }
            None => false,
        }
    }

    /// Number of units waiting (ready plus timers).
    pub fn pending(&self) -> usize {
        let st = self.lock();
        st.ready.len() + st.timers.len()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for QueueScheduler {
    fn enqueue(&self, work: Work) {
        self.lock().ready.push_back(work);
    }

    fn enqueue_after(&self, delay: Duration, work: Work) {
        let mut st = self.lock();
        let id = st.next_id;
        st.next_id += 1;
        let due = st.now.saturating_add(delay);
        st.timers.push(Timer { due, id, work });
    }
}
