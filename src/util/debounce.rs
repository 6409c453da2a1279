// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Deadline-based debounce timer.
//!
//! Mutations arm the timer; re-arming cancels the previous deadline so
//! rapid edits coalesce into one firing after a quiet period. The
//! owner polls `fire_due` from the event loop.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Schedule (or reschedule) the deadline `delay` from `now`.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the deadline, if armed.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let mut d = Debouncer::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        d.arm(t0);

        assert!(!d.fire_due(t0 + Duration::from_millis(999)));
        assert!(d.fire_due(t0 + Duration::from_millis(1000)));
        // One-shot: no second firing without re-arming.
        assert!(!d.fire_due(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn test_rearm_coalesces() {
        let mut d = Debouncer::new(Duration::from_millis(1000));
        let t0 = Instant::now();
        d.arm(t0);
        d.arm(t0 + Duration::from_millis(800));

        // The first deadline was cancelled by the re-arm.
        assert!(!d.fire_due(t0 + Duration::from_millis(1000)));
        assert!(d.fire_due(t0 + Duration::from_millis(1800)));
    }

    #[test]
    fn test_cancel() {
        let mut d = Debouncer::new(Duration::from_millis(100));
        let t0 = Instant::now();
        d.arm(t0);
        d.cancel();
        assert!(!d.is_armed());
        assert!(!d.fire_due(t0 + Duration::from_millis(200)));
    }
}
