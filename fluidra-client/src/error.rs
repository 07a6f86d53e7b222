use std::time::Duration;
use thiserror::Error;

/// High-level errors for Fluidra cloud operations
///
/// This enum is the single failure taxonomy seen by callers of the gateway
/// and the typed API surface. Transport-level details (timeouts, connection
/// resets, status codes) are classified into these variants before they
/// leave this crate.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Retryable network or server fault
    ///
    /// Covers request timeouts, connection errors and 5xx responses. The
    /// gateway resolves these internally via retry; callers only see this
    /// variant once the retry budget is exhausted.
    #[error("transient error: {0}")]
    Transient(String),

    /// Call rejected by the rate limiter or a 429 from the endpoint
    ///
    /// `retry_in` is the best-known wait until window capacity frees.
    #[error("rate limited, retry in {retry_in:?}")]
    RateLimited { retry_in: Duration },

    /// Circuit breaker is open; no network attempt was made
    #[error("circuit open, {remaining:?} of cooldown remaining")]
    CircuitOpen { remaining: Duration },

    /// Bearer token rejected and could not be refreshed
    ///
    /// Requires external re-authentication. Never retried locally beyond
    /// the gateway's single token-refresh replay.
    #[error("authentication expired")]
    AuthExpired,

    /// Response payload had an unexpected shape
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Whether the gateway's retry loop may repeat the attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Transient(_))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_is_retryable() {
        assert!(ApiError::Transient("timeout".to_string()).is_retryable());
        assert!(!ApiError::AuthExpired.is_retryable());
        assert!(!ApiError::RateLimited { retry_in: Duration::ZERO }.is_retryable());
        assert!(!ApiError::CircuitOpen { remaining: Duration::ZERO }.is_retryable());
        assert!(!ApiError::Malformed("not json".to_string()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Transient("connection reset".to_string());
        assert_eq!(format!("{}", err), "transient error: connection reset");

        let err = ApiError::AuthExpired;
        assert_eq!(format!("{}", err), "authentication expired");
    }
}
