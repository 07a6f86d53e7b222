//! Bearer-token seam
//!
//! Authentication itself (the Cognito flow, credential storage, re-auth UI)
//! lives outside this crate. The gateway only needs two things from its
//! credential collaborator: the current bearer token, and a forced refresh
//! when the endpoint rejects it.

use async_trait::async_trait;

use crate::error::{ApiError, Result};

/// External credential collaborator
///
/// `refresh` is invoked by the gateway exactly once per call, only after the
/// endpoint reported the current token expired. A provider that cannot
/// refresh returns [`ApiError::AuthExpired`], which surfaces to the caller
/// as a re-authentication request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current bearer token for outbound requests
    async fn bearer_token(&self) -> Result<String>;

    /// Obtain a fresh token after the current one was rejected
    async fn refresh(&self) -> Result<String>;
}

/// Fixed-token provider for tests and short-lived tooling
///
/// Never refreshes; a rejected token surfaces as [`ApiError::AuthExpired`].
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }

    async fn refresh(&self) -> Result<String> {
        Err(ApiError::AuthExpired)
    }
}
