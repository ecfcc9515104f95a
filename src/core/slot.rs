//! # Slot: shared single-value cell.
//!
//! [`Slot`] is a lockable `Option<T>` behind an `Arc`. Clones share the same cell, so a
//! value written by one branch or invocation is visible to every other holder.
//!
//! Lock poisoning is ignored: a panic inside a continuation must not make the cell
//! unusable for the remaining branches.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared, mutable single-slot container.
///
/// # Example
/// ```
/// use taskflow::Slot;
///
/// let slot = Slot::empty();
/// let writer = slot.clone();
/// writer.set(5);
/// assert_eq!(slot.take(), Some(5));
/// assert!(slot.is_empty());
/// ```
pub struct Slot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Slot<T> {
    /// Creates a slot holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(value))),
        }
    }

    /// Creates an empty slot.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Stores `value`, dropping any previous content.
    pub fn set(&self, value: T) {
        *self.lock() = Some(value);
    }

    /// Stores `value` and returns the previous content.
    pub fn replace(&self, value: T) -> Option<T> {
        self.lock().replace(value)
    }

    /// Removes and returns the content.
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Runs `f` with exclusive access to the content.
    ///
    /// Keep `f` short: other holders block until it returns.
    pub fn with<R>(&self, f: impl FnOnce(&mut Option<T>) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Slot<T> {
    /// Returns a copy of the content.
    pub fn get(&self) -> Option<T> {
        self.lock().clone()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clones_share_content() {
        let a = Slot::new(1);
        let b = a.clone();
        assert_eq!(b.replace(2), Some(1));
        assert_eq!(a.get(), Some(2));
    }

    #[test]
    fn test_with_mutates_in_place() {
        let slot = Slot::new(vec![1]);
        slot.with(|v| v.as_mut().map(|v| v.push(2)));
        assert_eq!(slot.take(), Some(vec![1, 2]));
        assert!(slot.is_empty());
    }

    #[test]
    fn test_take_is_exclusive_across_threads() {
        let slot = Slot::new(());
        let winners: usize = (0..8)
            .map(|_| {
                let s = slot.clone();
                thread::spawn(move || s.take().is_some())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let slot = Slot::new(3);
        let s = slot.clone();
        let _ = thread::spawn(move || {
            s.with(|v| {
                if v.is_some() {
                    panic!("poison");
                }
            });
        })
        .join();
        assert_eq!(slot.get(), Some(3));
    }
}
