//! Debounced query scheduling.
//!
//! Turns a stream of keystrokes into "search now" triggers. Each keystroke
//! that passes the minimum-length gate restarts a single one-shot timer; only
//! when the input has been quiet for the full delay does the timer fire and
//! yield the text of the last keystroke.

use std::time::{Duration, Instant};

use typeahead_core::logging::targets;
use typeahead_core::{TimerId, TimerManager};

/// What a keystroke asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keystroke {
    /// The text is shorter than the minimum length; the popup should hide.
    TooShort,
    /// A search is scheduled.
    Scheduled,
}

/// Debounces keystrokes into search triggers.
#[derive(Debug)]
pub struct DebounceScheduler {
    delay: Duration,
    min_length: usize,
    timers: TimerManager<String>,
    pending: Option<TimerId>,
}

impl DebounceScheduler {
    /// Create a scheduler with the given delay and minimum query length.
    pub fn new(delay: Duration, min_length: usize) -> Self {
        Self {
            delay,
            min_length,
            timers: TimerManager::new(),
            pending: None,
        }
    }

    /// Record a keystroke that left the input holding `text`.
    ///
    /// Text shorter than the minimum length cancels any pending search.
    /// Otherwise the pending search (if any) is replaced by one that fires
    /// `delay` after `now`.
    pub fn on_keystroke(&mut self, now: Instant, text: &str) -> Keystroke {
        self.cancel();

        let length = text.chars().count();
        if length < self.min_length {
            tracing::trace!(target: targets::SCHEDULER, length, min_length = self.min_length, "query too short");
            return Keystroke::TooShort;
        }

        self.pending = Some(self.timers.start_one_shot(now, self.delay, text.to_owned()));
        tracing::trace!(target: targets::SCHEDULER, delay = ?self.delay, "search scheduled");
        Keystroke::Scheduled
    }

    /// Cancel the pending search, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(id) => {
                let _ = self.timers.stop(id);
                tracing::trace!(target: targets::SCHEDULER, "pending search cancelled");
                true
            }
            None => false,
        }
    }

    /// Return the query to search for if the quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let (id, query) = self.timers.process_expired(now).pop()?;
        if self.pending == Some(id) {
            self.pending = None;
        }
        tracing::debug!(target: targets::SCHEDULER, %query, "debounce elapsed");
        Some(query)
    }

    /// Whether a search is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time from `now` until the pending search fires.
    pub fn time_until_fire(&mut self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next(now)
    }

    /// The configured minimum query length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_only_last_keystroke_fires() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(100), 1);

        assert_eq!(scheduler.on_keystroke(start, "l"), Keystroke::Scheduled);
        assert_eq!(scheduler.on_keystroke(start + ms(60), "lo"), Keystroke::Scheduled);
        assert_eq!(scheduler.on_keystroke(start + ms(120), "lon"), Keystroke::Scheduled);

        assert_eq!(scheduler.poll(start + ms(200)), None);
        assert_eq!(scheduler.poll(start + ms(220)), Some("lon".to_string()));
        assert_eq!(scheduler.poll(start + ms(1000)), None);
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn test_short_text_cancels_pending() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(100), 2);

        scheduler.on_keystroke(start, "pa");
        assert!(scheduler.is_pending());

        assert_eq!(scheduler.on_keystroke(start + ms(10), "p"), Keystroke::TooShort);
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.poll(start + ms(500)), None);
    }

    #[test]
    fn test_min_length_counts_characters() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(100), 2);
        assert_eq!(scheduler.on_keystroke(start, "é"), Keystroke::TooShort);
        assert_eq!(scheduler.on_keystroke(start, "ép"), Keystroke::Scheduled);
    }

    #[test]
    fn test_time_until_fire() {
        let start = Instant::now();
        let mut scheduler = DebounceScheduler::new(ms(100), 1);
        assert_eq!(scheduler.time_until_fire(start), None);

        scheduler.on_keystroke(start, "a");
        assert_eq!(scheduler.time_until_fire(start + ms(30)), Some(ms(70)));
        assert!(scheduler.cancel());
        assert!(!scheduler.cancel());
        assert_eq!(scheduler.time_until_fire(start), None);
    }
}
