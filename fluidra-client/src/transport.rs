//! HTTP transport seam
//!
//! The gateway never talks to the network directly; it sends [`ApiRequest`]s
//! through an injected [`HttpTransport`]. A [`ReqwestTransport`] backed by
//! `reqwest` is provided for production use, and tests inject scripted
//! transports.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::error::{ApiError, Result};

/// Default per-attempt timeout for a single network request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("fluidra-sdk/", env!("CARGO_PKG_VERSION"));

/// HTTP method subset used by the vendor API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
}

/// A single outbound request, relative to the API base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path plus query string, e.g. `/generic/devices?poolId=p1&format=tree`
    pub path: String,
    /// JSON body for PUT requests
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// A decoded response: status code plus JSON body
///
/// Bodies that are empty or not JSON decode to `Value::Null`; status
/// classification happens in the gateway, payload decoding in [`Self::json`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Deserialize the body into a typed payload
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

/// Transport-level failures, classified into [`ApiError`] by the gateway
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Injected HTTP client seam
///
/// Implementations attach the bearer token, enforce the per-attempt timeout
/// and return the raw status plus decoded JSON body. They do not retry,
/// rate-limit or interpret status codes; that is the gateway's job.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: &str,
    ) -> std::result::Result<ApiResponse, TransportError>;
}

/// Production transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport against the given API base URL
    pub fn new(base: Url) -> Self {
        Self::with_timeout(base, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a transport with a custom per-attempt timeout
    pub fn with_timeout(base: Url, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_default(),
            base,
            timeout,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: &str,
    ) -> std::result::Result<ApiResponse, TransportError> {
        let url = self
            .base
            .join(&request.path)
            .map_err(|e| TransportError::Connection(format!("invalid url: {}", e)))?;

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Put => self.http.put(url),
        };
        builder = builder
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                // Non-JSON and empty bodies are represented as Null
                let body = response
                    .json::<serde_json::Value>()
                    .await
                    .unwrap_or(serde_json::Value::Null);
                Ok(ApiResponse { status, body })
            }
            Err(e) if e.is_timeout() => Err(TransportError::Timeout),
            Err(e) => Err(TransportError::Connection(e.to_string())),
        }
    }
}
