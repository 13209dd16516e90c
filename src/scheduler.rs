// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

/// Fixed-interval frame clock. The render loop asks how long it may wait
/// for input, and fires the rain once the deadline passes.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    pub fn every(interval: Duration, now: Instant) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Books the next deadline one interval out. A frame that ran late does
    /// not trigger a burst of catch-up frames.
    pub fn fire(&mut self, now: Instant) {
        self.next += self.interval;
        if self.next < now {
            self.next = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let t0 = Instant::now();
        let mut t = Ticker::every(Duration::from_millis(50), t0);
        assert!(t.is_due(t0));
        t.fire(t0);
        assert!(!t.is_due(t0 + Duration::from_millis(49)));
        assert_eq!(
            t.time_until_due(t0 + Duration::from_millis(20)),
            Duration::from_millis(30)
        );
        assert!(t.is_due(t0 + Duration::from_millis(50)));
    }

    #[test]
    fn late_frames_do_not_schedule_into_the_past() {
        let t0 = Instant::now();
        let mut t = Ticker::every(Duration::from_millis(30), t0);
        let late = t0 + Duration::from_millis(500);
        t.fire(late);
        assert_eq!(t.time_until_due(late), Duration::ZERO);
        t.fire(late);
        assert_eq!(t.time_until_due(late), Duration::from_millis(30));
    }
}
