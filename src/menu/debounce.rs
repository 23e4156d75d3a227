use std::time::{Duration, Instant};

/// Coalesces bursts of requests into a single deferred run.
///
/// `schedule` arms the timer only if it is not already pending; later calls
/// before it fires are absorbed. There is no cancellation: a pending run
/// fires at its deadline and reads whatever state is current then.
#[derive(Debug, Clone)]
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

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Takes effect for the next schedule; a pending deadline is kept.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Arm the timer. Returns `true` if this call armed it.
    pub fn schedule(&mut self, now: Instant) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(now + self.delay);
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once per armed period, when `now` has reached
    /// the deadline. Disarms the timer when it fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
