//! Sliding-window limiter for outbound calls.

use crate::config::RateLimitConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Allows at most `max_requests` acquisitions in any trailing `window`.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    granted: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowLimiter {
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        let max_requests = max_requests as usize;
        Self {
            max_requests,
            window,
            granted: Mutex::new(VecDeque::with_capacity(max_requests)),
        }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Take one slot, or report how long until the oldest one frees up.
    ///
    /// # Errors
    ///
    /// Returns the wait time when the window is full.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> Result<(), Duration> {
        let mut granted = self.granted.lock();

        while granted
            .front()
            .is_some_and(|&t| now.saturating_duration_since(t) >= self.window)
        {
            granted.pop_front();
        }

        if granted.len() < self.max_requests {
            granted.push_back(now);
            return Ok(());
        }

        let retry_after = granted
            .front()
            .map_or(self.window, |&oldest| {
                self.window
                    .saturating_sub(now.saturating_duration_since(oldest))
            });
        Err(retry_after)
    }

    /// Slots currently in use.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.granted.lock().len()
    }
}
