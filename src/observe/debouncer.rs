//! Trailing-edge debounce timer.
//!
//! Every qualifying event re-arms the timer; the pass fires once the quiet
//! period has elapsed since the *last* event. Time is passed in explicitly so
//! the event loop owns the clock and tests can drive it deterministically.

use std::time::{Duration, Instant};

/// Idle sleep when nothing is armed.
pub const IDLE: Duration = Duration::from_secs(86400);

#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    last_event: Option<Instant>,
    /// Events folded into the pending fire
    pending: usize,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_event: None,
            pending: 0,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Re-arm the timer.
    pub fn trigger(&mut self, now: Instant) {
        self.last_event = Some(now);
        self.pending += 1;
    }

    pub fn is_armed(&self) -> bool {
        self.last_event.is_some()
    }

    /// When the pending fire is due, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.last_event.map(|t| t + self.quiet)
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.deadline().is_some_and(|d| now >= d)
    }

    /// Fire if due. Returns how many events were coalesced.
    pub fn take_if_ready(&mut self, now: Instant) -> Option<usize> {
        if !self.is_ready(now) {
            return None;
        }
        self.last_event = None;
        Some(std::mem::take(&mut self.pending))
    }

    /// Drop a pending fire without running it.
    pub fn cancel(&mut self) -> usize {
        self.last_event = None;
        std::mem::take(&mut self.pending)
    }

    /// Precise sleep until the next possible fire.
    pub fn sleep_duration(&self, now: Instant) -> Duration {
        match self.deadline() {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .max(Duration::from_millis(1)),
            None => IDLE,
        }
    }
}
