//! One-shot timer queue.
//!
//! A [`TimerManager`] holds pending one-shot timers, each carrying a payload
//! that tells the owner what to do when it fires. The manager does not run a
//! thread: the owner polls [`TimerManager::process_expired`] with the current
//! instant (typically from its event loop tick) and dispatches the payloads.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::TimerError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Internal timer data.
#[derive(Debug)]
struct TimerData<T> {
    fire_time: Instant,
    payload: T,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
    /// Insertion order, so timers due at the same instant fire FIFO.
    seq: u64,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.seq == other.seq
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manages pending one-shot timers.
#[derive(Debug)]
pub struct TimerManager<T> {
    /// All registered timers.
    timers: SlotMap<TimerId, TimerData<T>>,
    /// Priority queue of pending timer fires.
    queue: BinaryHeap<TimerQueueEntry>,
    next_seq: u64,
}

impl<T> TimerManager<T> {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Start a one-shot timer that fires `duration` after `now`.
    ///
    /// Returns the timer ID that can be used to cancel the timer.
    pub fn start_one_shot(&mut self, now: Instant, duration: Duration, payload: T) -> TimerId {
        let fire_time = now + duration;
        let id = self.timers.insert(TimerData { fire_time, payload });
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(TimerQueueEntry { id, fire_time, seq });
        tracing::trace!(target: targets::TIMER, ?id, ?duration, "timer started");
        id
    }

    /// Stop and remove a timer, returning its payload.
    pub fn stop(&mut self, id: TimerId) -> Result<T, TimerError> {
        self.timers
            .remove(id)
            .map(|data| data.payload)
            .ok_or(TimerError::InvalidTimerId)
    }

    /// Check if a timer is still pending.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the duration from `now` until the next timer fires, if any.
    pub fn time_until_next(&mut self, now: Instant) -> Option<Duration> {
        self.prune_stopped();
        self.queue
            .peek()
            .map(|entry| entry.fire_time.saturating_duration_since(now))
    }

    /// Remove every timer that is due at `now` and return their payloads in
    /// firing order.
    #[tracing::instrument(skip(self), target = "typeahead_core::timer", level = "trace")]
    pub fn process_expired(&mut self, now: Instant) -> Vec<(TimerId, T)> {
        let mut fired = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.fire_time > now {
                break;
            }
            self.queue.pop();

            // Stopped timers leave their queue entry behind.
            let Some(data) = self.timers.remove(entry.id) else {
                continue;
            };

            tracing::trace!(target: targets::TIMER, id = ?entry.id, "timer fired");
            fired.push((entry.id, data.payload));
        }

        fired
    }

    /// Stop every pending timer.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    /// Get the number of pending timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    fn prune_stopped(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.timers.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<T> Default for TimerManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(start, ms(100), "debounce");

        assert!(timers.process_expired(start + ms(99)).is_empty());
        assert_eq!(timers.process_expired(start + ms(100)), vec![(id, "debounce")]);
        assert!(timers.process_expired(start + ms(500)).is_empty());
        assert!(!timers.is_active(id));
    }

    #[test]
    fn test_stopped_timer_never_fires() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let id = timers.start_one_shot(start, ms(10), 1);

        assert_eq!(timers.stop(id), Ok(1));
        assert_eq!(timers.stop(id), Err(TimerError::InvalidTimerId));
        assert!(timers.process_expired(start + ms(20)).is_empty());
        assert_eq!(timers.time_until_next(start), None);
    }

    #[test]
    fn test_fire_order_and_ties() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        timers.start_one_shot(start, ms(30), 'c');
        timers.start_one_shot(start, ms(10), 'a');
        timers.start_one_shot(start, ms(10), 'b');

        let order: Vec<char> = timers
            .process_expired(start + ms(30))
            .into_iter()
            .map(|(_, payload)| payload)
            .collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
    }

    #[test]
    fn test_time_until_next_skips_stopped() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        let first = timers.start_one_shot(start, ms(10), ());
        timers.start_one_shot(start, ms(40), ());
        timers.stop(first).unwrap();

        assert_eq!(timers.time_until_next(start), Some(ms(40)));
        assert_eq!(timers.time_until_next(start + ms(50)), Some(Duration::ZERO));
    }

    #[test]
    fn test_clear() {
        let start = Instant::now();
        let mut timers = TimerManager::new();
        timers.start_one_shot(start, ms(10), ());
        timers.start_one_shot(start, ms(20), ());
        assert_eq!(timers.active_count(), 2);

        timers.clear();
        assert_eq!(timers.active_count(), 0);
        assert!(timers.process_expired(start + ms(100)).is_empty());
    }
}
