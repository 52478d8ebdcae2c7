use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

/// Debounce with a bounded wait.
///
/// A burst of inputs fires once, `window` after its first input. Later
/// inputs in the same burst are folded in without moving the deadline, so
/// continuous input cannot hold a change back for longer than one window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records an input, opening a burst if none is pending
    pub fn note(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.window);
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// `true` once per burst, when the quiet window has passed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            },
            _ => false,
        }
    }
}
