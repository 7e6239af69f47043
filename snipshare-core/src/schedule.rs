//! Debounce timers
//!
//! A [`Debounce`] is a deadline that restarts on every [`arm`](Debounce::arm)
//! and fires once when polled after it elapses. Deadlines use
//! `tokio::time::Instant`, so tests can freeze the clock with
//! `tokio::time::pause()` and step it with `tokio::time::advance()`.
//!
//! Owners poll their timers from a single loop; nothing runs in the
//! background and cancelling is just clearing the deadline.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Start (or restart) the countdown from now.
    pub fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Make the timer due right away.
    pub fn arm_now(&mut self) {
        self.deadline = Some(Instant::now());
    }

    /// Drop the pending deadline, if any.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once after the deadline has passed.
    pub fn fire_if_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of several optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}
