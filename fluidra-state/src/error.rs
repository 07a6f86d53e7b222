//! Error types for fluidra-state

use fluidra_client::ApiError;
use thiserror::Error;

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, PollError>;

/// Coordinator-level failures
///
/// Per-device problems never surface here; they degrade to unavailable
/// devices inside the published snapshot. This error means the cycle as a
/// whole produced no fresh data.
#[derive(Debug, Clone, Error)]
pub enum PollError {
    /// The device-tree fetch failed; the previous snapshot was retained
    /// and marked stale
    #[error("no fresh data obtainable: {0}")]
    Unavailable(#[from] ApiError),

    /// The coordinator (or the cycle serving this call) went away
    #[error("poll coordinator shut down")]
    Shutdown,
}

impl PollError {
    /// Whether the failure requires external re-authentication
    ///
    /// Shells use this to surface a re-auth prompt instead of a generic
    /// connectivity warning.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, PollError::Unavailable(ApiError::AuthExpired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_expiry_is_distinguishable() {
        assert!(PollError::Unavailable(ApiError::AuthExpired).is_auth_expired());
        assert!(!PollError::Unavailable(ApiError::Transient("x".to_string())).is_auth_expired());
        assert!(!PollError::Shutdown.is_auth_expired());
    }
}
