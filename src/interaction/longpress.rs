// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Long-press confirmation gate.
//!
//! Guards the exit from presentation mode: the lock control must be
//! held for the full duration before the exit fires. Progress is
//! polled on a short cadence and exposed as 0-100 for the ring
//! indicator. Releasing early cancels and resets; an interrupted
//! attempt never carries elapsed time into the next one.

use std::time::{Duration, Instant};

/// Hold duration required to fire the gate.
pub const HOLD_DURATION: Duration = Duration::from_millis(3000);

/// Suggested poll cadence for the owner's repaint scheduling.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
pub struct LongPressGate {
    pressed_at: Option<Instant>,
    progress: f64,
}

impl LongPressGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a hold attempt, restarting progress from zero.
    pub fn press(&mut self, now: Instant) {
        self.pressed_at = Some(now);
        self.progress = 0.0;
    }

    /// Cancel the attempt without firing.
    pub fn release(&mut self) {
        self.pressed_at = None;
        self.progress = 0.0;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }

    /// Progress of the current attempt as a percentage, clamped at 100.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Advance the ramp. Returns true exactly once, at the poll where
    /// the hold duration is reached; progress then resets to zero.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(pressed_at) = self.pressed_at else {
            return false;
        };

        let elapsed = now.saturating_duration_since(pressed_at);
        self.progress =
            (elapsed.as_secs_f64() / HOLD_DURATION.as_secs_f64() * 100.0).min(100.0);

        if self.progress >= 100.0 {
            self.pressed_at = None;
            self.progress = 0.0;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_hold_fires_exactly_once() {
        let mut gate = LongPressGate::new();
        let t0 = Instant::now();
        gate.press(t0);

        assert!(!gate.poll(t0 + Duration::from_millis(2950)));
        assert!(gate.poll(t0 + Duration::from_millis(3000)));
        assert_eq!(gate.progress(), 0.0);

        // Still held past the firing point: no second firing.
        assert!(!gate.poll(t0 + Duration::from_millis(4000)));
    }

    #[test]
    fn test_early_release_cancels() {
        let mut gate = LongPressGate::new();
        let t0 = Instant::now();
        gate.press(t0);
        assert!(!gate.poll(t0 + Duration::from_millis(1500)));
        assert!(gate.progress() > 0.0);

        gate.release();
        assert_eq!(gate.progress(), 0.0);
        assert!(!gate.poll(t0 + Duration::from_millis(5000)));
    }

    #[test]
    fn test_interrupted_time_does_not_carry_over() {
        let mut gate = LongPressGate::new();
        let t0 = Instant::now();
        gate.press(t0);
        gate.poll(t0 + Duration::from_millis(1500));
        gate.release();

        // Re-press: the ramp restarts from zero, so 1500ms of old hold
        // plus 1600ms of new hold must not fire.
        let t1 = t0 + Duration::from_millis(2000);
        gate.press(t1);
        assert!(!gate.poll(t1 + Duration::from_millis(1600)));
        assert!((gate.progress() - (1600.0 / 3000.0 * 100.0)).abs() < 1e-6);

        assert!(gate.poll(t1 + Duration::from_millis(3000)));
    }

    #[test]
    fn test_progress_clamps_at_hundred() {
        let mut gate = LongPressGate::new();
        let t0 = Instant::now();
        gate.press(t0);
        // A late poll (e.g. a stalled frame) still reads as complete.
        assert!(gate.poll(t0 + Duration::from_millis(9000)));
    }
}
