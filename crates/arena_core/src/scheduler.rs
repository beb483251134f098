//! Virtual-time deferred task queue.
//!
//! Telegraphs, delayed hitboxes and spawn warnings are "fire later" actions.
//! They are stored here as plain data keyed by a due time on the session
//! clock and handed back to the caller in the tick whose accumulated time
//! crosses that due time. Nothing runs concurrently with the tick that
//! scheduled it.

use crate::math::Fixed;

/// A scheduled entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Deferred<T> {
    due: Fixed,
    seq: u64,
    task: T,
}

/// Queue of tasks waiting for the simulation clock.
#[derive(Debug, Clone)]
pub struct DeferredQueue<T> {
    now: Fixed,
    next_seq: u64,
    entries: Vec<Deferred<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeferredQueue<T> {
    /// Create an empty queue at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Fixed::ZERO,
            next_seq: 0,
            entries: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds.
    #[must_use]
    pub fn now(&self) -> Fixed {
        self.now
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Schedule `task` to fire `delay` milliseconds from now.
    ///
    /// Negative delays are treated as zero: the task fires on the next advance.
    pub fn schedule(&mut self, delay: Fixed, task: T) {
        let due = self.now + delay.max(Fixed::ZERO);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Deferred { due, seq, task });
    }

    /// Advance the clock and return every task that became due, in due order.
    ///
    /// Tasks scheduled for the same instant come back in scheduling order.
    pub fn advance(&mut self, delta: Fixed) -> Vec<T> {
        self.now += delta.max(Fixed::ZERO);
        let now = self.now;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.entries.drain(..).partition(|entry| entry.due <= now);
        self.entries = pending;

        due.sort_by_key(|entry| (entry.due, entry.seq));
        due.into_iter().map(|entry| entry.task).collect()
    }

    /// Drop every pending task matching `predicate`, returning how many were removed.
    pub fn cancel_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| !predicate(&entry.task));
        before - self.entries.len()
    }

    /// Iterate over pending tasks (unordered).
    pub fn pending(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: i32) -> Fixed {
        Fixed::from_num(n)
    }

    #[test]
    fn test_task_fires_when_time_crosses_due() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(1000), "fire");

        assert!(queue.advance(ms(600)).is_empty());
        assert_eq!(queue.advance(ms(400)), vec!["fire"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_large_delta_drains_in_due_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(300), 3);
        queue.schedule(ms(100), 1);
        queue.schedule(ms(200), 2);
        queue.schedule(ms(100), 11);

        assert_eq!(queue.advance(ms(5000)), vec![1, 11, 2, 3]);
    }

    #[test]
    fn test_schedule_is_relative_to_current_clock() {
        let mut queue = DeferredQueue::new();
        queue.advance(ms(10_000));
        queue.schedule(ms(50), "late");
        assert!(queue.advance(ms(49)).is_empty());
        assert_eq!(queue.advance(ms(1)), vec!["late"]);
    }

    #[test]
    fn test_cancel_where() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(10), (1_u64, "a"));
        queue.schedule(ms(10), (2_u64, "b"));
        assert_eq!(queue.cancel_where(|(owner, _)| *owner == 1), 1);
        assert_eq!(queue.advance(ms(10)), vec![(2, "b")]);
    }
}
