//! Sliding-window rate limiter
//!
//! Bounds outbound throughput to at most M calls in any trailing window of
//! T seconds. The window holds the timestamps of recent calls; expired
//! entries are pruned on every check.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// What to do when the window is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Wait (bounded by one window length) until capacity frees
    Block,
    /// Fail immediately with `RateLimited`
    Reject,
}

/// Timestamps of recent calls within the trailing window
#[derive(Debug)]
pub struct RateWindow {
    max_calls: usize,
    window: Duration,
    timestamps: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            timestamps: VecDeque::with_capacity(max_calls),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn prune(&mut self, now: Instant) {
        while let Some(oldest) = self.timestamps.front() {
            if now.saturating_duration_since(*oldest) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Record a call if capacity allows
    ///
    /// `Err(wait)` reports how long until the oldest entry leaves the window.
    pub fn try_record(&mut self, now: Instant) -> std::result::Result<(), Duration> {
        self.prune(now);
        if self.timestamps.len() < self.max_calls {
            self.timestamps.push_back(now);
            Ok(())
        } else {
            Err(self.wait_time(now))
        }
    }

    /// Time until the next call would be admitted
    pub fn wait_time(&self, now: Instant) -> Duration {
        if self.timestamps.len() < self.max_calls {
            return Duration::ZERO;
        }
        match self.timestamps.front() {
            Some(oldest) => self
                .window
                .saturating_sub(now.saturating_duration_since(*oldest)),
            None => Duration::ZERO,
        }
    }

    /// Number of calls currently inside the window
    pub fn in_flight(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.timestamps.len()
    }
}
