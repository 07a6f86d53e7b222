//! Circuit breaker
//!
//! Prevents cascade failures by failing fast while the endpoint is
//! consistently unhealthy. One breaker instance is shared by all callers of
//! a gateway; the gateway serializes access to it.

use std::time::{Duration, Instant};

use tracing::{info, warn};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation; calls pass through
    Closed,
    /// Failing fast; no network attempts until the cooldown elapses
    Open,
    /// Cooldown elapsed; exactly one probe call is in flight
    HalfOpen,
}

/// Consecutive-failure circuit breaker with a single-probe recovery
///
/// Transitions:
/// `Closed` --N consecutive failures--> `Open` --cooldown--> `HalfOpen`
/// (one probe admitted) --success--> `Closed` / --failure--> `Open`.
///
/// All methods take `now` explicitly so transitions are deterministic under
/// test; the gateway passes `Instant::now()`.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cooldown: Duration,
    state: CircuitState,
    failure_count: u32,
    opened_at: Instant,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            failure_threshold,
            cooldown,
            state: CircuitState::Closed,
            failure_count: 0,
            opened_at: Instant::now(),
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Gate check before a network attempt
    ///
    /// `Ok(())` admits the call. `Err(remaining)` fails fast with the time
    /// left until a probe will be admitted (zero while a probe from another
    /// caller is already in flight).
    pub fn try_acquire(&mut self, now: Instant) -> std::result::Result<(), Duration> {
        match self.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = now.saturating_duration_since(self.opened_at);
                if elapsed >= self.cooldown {
                    info!("circuit half-open, admitting probe");
                    self.state = CircuitState::HalfOpen;
                    Ok(())
                } else {
                    Err(self.cooldown - elapsed)
                }
            }
            // The caller that moved us to HalfOpen holds the probe slot
            CircuitState::HalfOpen => Err(Duration::ZERO),
        }
    }

    /// Record the final outcome of a successful call
    pub fn record_success(&mut self) {
        match self.state {
            CircuitState::HalfOpen => {
                info!("circuit closed after successful probe");
                self.state = CircuitState::Closed;
                self.failure_count = 0;
            }
            CircuitState::Closed => {
                self.failure_count = 0;
            }
            CircuitState::Open => {}
        }
    }

    /// Record the final outcome of a failed call
    pub fn record_failure(&mut self, now: Instant) {
        self.failure_count += 1;

        match self.state {
            CircuitState::HalfOpen => {
                warn!("circuit re-opened after failed probe");
                self.state = CircuitState::Open;
                self.opened_at = now;
            }
            CircuitState::Closed if self.failure_count >= self.failure_threshold => {
                warn!(
                    failures = self.failure_count,
                    "circuit opened after consecutive failures"
                );
                self.state = CircuitState::Open;
                self.opened_at = now;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, cooldown: Duration) -> CircuitBreaker {
        CircuitBreaker::new(threshold, cooldown)
    }

    #[test]
    fn test_initial_state_is_closed() {
        let mut cb = breaker(5, Duration::from_secs(300));
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert!(cb.try_acquire(Instant::now()).is_ok());
    }

    #[test]
    fn test_success_resets_failure_count() {
        let mut cb = breaker(5, Duration::from_secs(300));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);
        assert_eq!(cb.failure_count(), 2);
        cb.record_success();
        assert_eq!(cb.failure_count(), 0);
    }

    #[test]
    fn test_opens_after_threshold_failures() {
        let mut cb = breaker(3, Duration::from_secs(300));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure(now);
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn test_blocks_while_open() {
        let mut cb = breaker(2, Duration::from_secs(300));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);

        let remaining = cb.try_acquire(now).unwrap_err();
        assert!(remaining <= Duration::from_secs(300));
        assert!(remaining > Duration::from_secs(299));
    }

    #[test]
    fn test_half_open_after_cooldown_admits_one_probe() {
        let mut cb = breaker(2, Duration::from_secs(10));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);
        assert_eq!(cb.state(), CircuitState::Open);

        let later = now + Duration::from_secs(15);
        assert!(cb.try_acquire(later).is_ok());
        assert_eq!(cb.state(), CircuitState::HalfOpen);

        // Second caller is rejected while the probe is outstanding
        assert_eq!(cb.try_acquire(later).unwrap_err(), Duration::ZERO);
    }

    #[test]
    fn test_probe_success_closes_and_resets() {
        let mut cb = breaker(2, Duration::from_secs(10));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);
        assert!(cb.try_acquire(now + Duration::from_secs(10)).is_ok());

        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert!(cb.try_acquire(Instant::now()).is_ok());
    }

    #[test]
    fn test_probe_failure_reopens_and_restarts_cooldown() {
        let mut cb = breaker(2, Duration::from_secs(10));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);

        let probe_at = now + Duration::from_secs(10);
        assert!(cb.try_acquire(probe_at).is_ok());
        cb.record_failure(probe_at);
        assert_eq!(cb.state(), CircuitState::Open);

        // Cooldown restarted from the probe failure, not the first opening
        let remaining = cb.try_acquire(probe_at + Duration::from_secs(5)).unwrap_err();
        assert_eq!(remaining, Duration::from_secs(5));
    }

    #[test]
    fn test_not_yet_cooled_down_stays_open() {
        let mut cb = breaker(2, Duration::from_secs(300));
        let now = Instant::now();
        cb.record_failure(now);
        cb.record_failure(now);
        assert!(cb.try_acquire(now + Duration::from_secs(299)).is_err());
        assert_eq!(cb.state(), CircuitState::Open);
    }
}
