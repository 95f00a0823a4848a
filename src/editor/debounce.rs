use std::time::{Duration, Instant};

/// Trailing-edge debounce: every `note` restarts the delay, and `fire`
/// reports (once) when a quiet period of the full delay has passed.
/// Deterministic by design; callers supply the clock.
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

    /// Record a triggering event, restarting the pending delay.
    pub fn note(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True when the quiet period has elapsed. Consumes the pending
    /// deadline, so a burst of events yields exactly one firing.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}
