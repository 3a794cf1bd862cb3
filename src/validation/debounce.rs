//! Debounce service for validate-on-change.
//!
//! Re-validating a field on every keystroke thrashes; the UI layer instead
//! schedules the latest pending value here and polls for it once the quiet
//! period has elapsed. The service is owned by the component that created it
//! and must be stopped (or dropped) when that component goes away, so no
//! timer state outlives its owner.

use std::time::{Duration, Instant};

/// Holds at most one pending item and releases it after a quiet period.
///
/// `schedule` replaces any previously pending item, so only the latest value
/// is ever released. `flush` releases immediately (used on submit, where
/// validation must not wait), `stop` discards without releasing.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
        }
    }

    /// Schedule an item, restarting the quiet period
    pub fn schedule(&mut self, item: T, now: Instant) {
        self.pending = Some(item);
        self.deadline = Some(now + self.delay);
    }

    /// Take the pending item if its quiet period has elapsed
    pub fn due(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.take(),
            _ => None,
        }
    }

    /// Take the pending item immediately, ignoring the deadline
    pub fn flush(&mut self) -> Option<T> {
        self.take()
    }

    /// Discard any pending item without releasing it
    pub fn stop(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn take(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_only_after_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        debouncer.schedule("email", start);
        assert!(debouncer.due(start).is_none());
        assert!(debouncer.due(start + Duration::from_millis(299)).is_none());
        assert_eq!(
            debouncer.due(start + Duration::from_millis(300)),
            Some("email")
        );
        // Released once, not repeatedly.
        assert!(debouncer.due(start + Duration::from_millis(400)).is_none());
    }

    #[test]
    fn test_reschedule_keeps_latest_and_restarts_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        debouncer.schedule("a@", start);
        debouncer.schedule("a@b.com", start + Duration::from_millis(200));

        // Original deadline has passed but the period was restarted.
        assert!(debouncer.due(start + Duration::from_millis(300)).is_none());
        assert_eq!(
            debouncer.due(start + Duration::from_millis(500)),
            Some("a@b.com")
        );
    }

    #[test]
    fn test_flush_and_stop() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();

        debouncer.schedule(1, start);
        assert_eq!(debouncer.flush(), Some(1));
        assert!(!debouncer.is_pending());

        debouncer.schedule(2, start);
        debouncer.stop();
        assert!(debouncer.flush().is_none());
        assert!(debouncer.due(start + Duration::from_secs(10)).is_none());
    }
}
