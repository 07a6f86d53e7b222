//! Resilience gateway
//!
//! Every outbound call flows through [`ResilientClient::execute`], which
//! composes, in order: the rate-limiter gate, the circuit-breaker check, the
//! attempt-with-retry loop, and a final circuit-state update. The breaker and
//! the rate window are the only shared mutable state; both live behind
//! `tokio::sync::Mutex` so concurrent callers observe strictly ordered
//! success/failure transitions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::TokenProvider;
use crate::backoff::RetryPolicy;
use crate::circuit::CircuitBreaker;
use crate::error::{ApiError, Result};
use crate::rate::{OverflowPolicy, RateWindow};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};

/// Configuration for the resilience gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Maximum calls admitted in any trailing rate window
    /// Default: 30
    pub max_calls_per_window: usize,

    /// Length of the trailing rate window
    /// Default: 60 seconds
    pub rate_window: Duration,

    /// Behavior when the rate window is full
    /// Default: Reject
    pub overflow: OverflowPolicy,

    /// Consecutive failures before the circuit opens
    /// Default: 5
    pub failure_threshold: u32,

    /// How long the circuit stays open before admitting a probe
    /// Default: 300 seconds
    pub cooldown: Duration,

    /// Retry schedule for transient failures
    pub retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            max_calls_per_window: 30,
            rate_window: Duration::from_secs(60),
            overflow: OverflowPolicy::Reject,
            failure_threshold: 5,
            cooldown: Duration::from_secs(300),
            retry: RetryPolicy::default(),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_calls_per_window == 0 {
            return Err("max_calls_per_window must be greater than 0".to_string());
        }
        if self.rate_window == Duration::ZERO {
            return Err("rate_window must be greater than 0".to_string());
        }
        if self.failure_threshold == 0 {
            return Err("failure_threshold must be greater than 0".to_string());
        }
        if self.retry.max_attempts == 0 {
            return Err("retry.max_attempts must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn with_rate_limit(mut self, max_calls: usize, window: Duration) -> Self {
        self.max_calls_per_window = max_calls;
        self.rate_window = window;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_circuit(mut self, failure_threshold: u32, cooldown: Duration) -> Self {
        self.failure_threshold = failure_threshold;
        self.cooldown = cooldown;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Classify a response status into an outcome
///
/// 2xx passes through. 401/403 mean the bearer token was rejected. 429 is
/// the endpoint's own rate limiting. Timeouts, connection faults, 408 and
/// 5xx are transient. Any other status means we sent something the endpoint
/// did not understand, which retrying will not fix.
fn classify(response: ApiResponse, rate_window: Duration) -> Result<ApiResponse> {
    match response.status {
        200..=299 => Ok(response),
        401 | 403 => Err(ApiError::AuthExpired),
        429 => Err(ApiError::RateLimited {
            retry_in: rate_window,
        }),
        408 | 500..=599 => Err(ApiError::Transient(format!(
            "server returned status {}",
            response.status
        ))),
        status => Err(ApiError::Malformed(format!(
            "unexpected status {}",
            status
        ))),
    }
}

/// Gateway wrapping a transport with rate limiting, circuit breaking and
/// retry
///
/// Cheap to share: clone the `Arc` it is usually held in. All internal state
/// is synchronized; callers never observe a partially applied transition.
pub struct ResilientClient {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenProvider>,
    circuit: Mutex<CircuitBreaker>,
    window: Mutex<RateWindow>,
    config: GatewayConfig,
}

impl ResilientClient {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_config(transport, tokens, GatewayConfig::default())
    }

    pub fn with_config(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenProvider>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            transport,
            tokens,
            circuit: Mutex::new(CircuitBreaker::new(
                config.failure_threshold,
                config.cooldown,
            )),
            window: Mutex::new(RateWindow::new(
                config.max_calls_per_window,
                config.rate_window,
            )),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Execute a request through the full resilience pipeline
    ///
    /// `idempotent` marks the request safe to repeat; only then are
    /// transient failures retried. Read calls pass `true`; mutating calls
    /// pass `true` only when replaying them is harmless (absolute-value
    /// writes are, increments would not be).
    pub async fn execute(&self, request: &ApiRequest, idempotent: bool) -> Result<ApiResponse> {
        self.acquire_rate_slot().await?;
        self.acquire_circuit_slot().await?;

        let outcome = self.attempt_with_retry(request, idempotent).await;

        let mut circuit = self.circuit.lock().await;
        match &outcome {
            Ok(_) => circuit.record_success(),
            // Only endpoint-health faults trip the breaker; a rejected token
            // or a payload we mis-built says nothing about the endpoint.
            Err(ApiError::Transient(_)) => circuit.record_failure(Instant::now()),
            Err(_) => {}
        }

        outcome
    }

    async fn acquire_rate_slot(&self) -> Result<()> {
        // Block mode waits at most one window length before giving up
        let deadline = Instant::now() + self.config.rate_window;
        loop {
            let wait = {
                let mut window = self.window.lock().await;
                match window.try_record(Instant::now()) {
                    Ok(()) => return Ok(()),
                    Err(wait) => wait,
                }
            };

            if self.config.overflow == OverflowPolicy::Reject
                || Instant::now() + wait > deadline
            {
                return Err(ApiError::RateLimited { retry_in: wait });
            }

            debug!(?wait, "rate window full, waiting for capacity");
            tokio::time::sleep(wait).await;
        }
    }

    async fn acquire_circuit_slot(&self) -> Result<()> {
        let mut circuit = self.circuit.lock().await;
        circuit
            .try_acquire(Instant::now())
            .map_err(|remaining| ApiError::CircuitOpen { remaining })
    }

    async fn attempt_with_retry(
        &self,
        request: &ApiRequest,
        idempotent: bool,
    ) -> Result<ApiResponse> {
        let mut refreshed = false;
        let mut retry_index = 0u32;

        loop {
            let bearer = self.tokens.bearer_token().await?;

            let outcome = match self.transport.send(request, &bearer).await {
                Ok(response) => classify(response, self.config.rate_window),
                Err(TransportError::Timeout) => {
                    Err(ApiError::Transient("request timed out".to_string()))
                }
                Err(TransportError::Connection(msg)) => Err(ApiError::Transient(msg)),
            };

            match outcome {
                Ok(response) => return Ok(response),
                Err(ApiError::AuthExpired) if !refreshed => {
                    // One refresh + replay per call; a second rejection
                    // surfaces to the caller for external re-authentication.
                    refreshed = true;
                    self.tokens.refresh().await?;
                    debug!("bearer token refreshed, replaying request");
                }
                Err(err @ ApiError::Transient(_)) => {
                    let retries_left = retry_index + 1 < self.config.retry.max_attempts;
                    if !idempotent || !retries_left {
                        warn!(error = %err, attempts = retry_index + 1, "giving up on request");
                        return Err(err);
                    }
                    let delay = self.config.retry.delay_for(retry_index);
                    retry_index += 1;
                    debug!(?delay, retry = retry_index, "transient failure, backing off");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GatewayConfig::default();
        assert_eq!(config.max_calls_per_window, 30);
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.cooldown, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_rejects_zeros() {
        let config = GatewayConfig {
            max_calls_per_window: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GatewayConfig {
            failure_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = GatewayConfig::new()
            .with_rate_limit(10, Duration::from_secs(30))
            .with_overflow(OverflowPolicy::Block)
            .with_circuit(3, Duration::from_secs(60));

        assert_eq!(config.max_calls_per_window, 10);
        assert_eq!(config.overflow, OverflowPolicy::Block);
        assert_eq!(config.failure_threshold, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_classify_statuses() {
        let window = Duration::from_secs(60);
        let response = |status| ApiResponse {
            status,
            body: serde_json::Value::Null,
        };

        assert!(classify(response(200), window).is_ok());
        assert!(matches!(
            classify(response(401), window),
            Err(ApiError::AuthExpired)
        ));
        assert!(matches!(
            classify(response(403), window),
            Err(ApiError::AuthExpired)
        ));
        assert!(matches!(
            classify(response(429), window),
            Err(ApiError::RateLimited { .. })
        ));
        assert!(matches!(
            classify(response(503), window),
            Err(ApiError::Transient(_))
        ));
        assert!(matches!(
            classify(response(404), window),
            Err(ApiError::Malformed(_))
        ));
    }
}
