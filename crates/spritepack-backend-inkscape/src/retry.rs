//! Bounded retry policy for filesystem polling and cleanup.

use std::time::Duration;

/// Default number of attempts.
pub const DEFAULT_ATTEMPTS: u32 = 10;

/// Default pause between attempts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// How often and how patiently an operation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero behaves like one.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// A policy that never sleeps.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Runs `op` until it succeeds or attempts run out, returning the last
    /// error. `op` receives the 1-based attempt number.
    pub fn run<T, E>(&self, mut op: impl FnMut(u32) -> Result<T, E>) -> Result<T, E> {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => return Err(err),
                Err(_) => {
                    attempt += 1;
                    self.pause();
                }
            }
        }
    }

    /// Polls `condition` until it holds. Returns false if it never did.
    pub fn wait_for(&self, mut condition: impl FnMut() -> bool) -> bool {
        self.run(|_| if condition() { Ok(()) } else { Err(()) }).is_ok()
    }

    fn pause(&self) {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
    }
}
