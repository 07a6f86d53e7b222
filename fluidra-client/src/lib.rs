//! Resilient client for the Fluidra pool cloud REST API
//!
//! This crate owns everything between the poll coordinator and the wire:
//! the HTTP transport seam, the bearer-token seam, the wire payload types,
//! and the resilience gateway that shields all outbound calls from a flaky,
//! rate-limited endpoint.
//!
//! # Architecture
//!
//! ```text
//! FluidraApi (typed endpoints)
//!     └── ResilientClient
//!           rate gate → circuit check → retry loop → circuit update
//!               └── HttpTransport (injected; ReqwestTransport by default)
//! ```
//!
//! # Resilience pipeline
//!
//! Per call, in order:
//!
//! 1. **Rate limiter**: sliding window of at most M calls per T seconds;
//!    overflow either blocks (bounded) or rejects, per [`OverflowPolicy`].
//! 2. **Circuit breaker**: after N consecutive transient failures the
//!    circuit opens and calls fail fast with zero network attempts; after a
//!    cooldown exactly one probe is admitted.
//! 3. **Retry**: transient outcomes are retried with exponential backoff
//!    plus jitter, only for requests marked safe to repeat.
//! 4. Rejected bearer tokens trigger a single [`TokenProvider::refresh`]
//!    and replay; a second rejection surfaces [`ApiError::AuthExpired`].
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fluidra_client::{FluidraApi, ReqwestTransport};
//!
//! let transport = Arc::new(ReqwestTransport::new(
//!     "https://api.fluidra-emea.com".parse()?,
//! ));
//! let api = FluidraApi::new(transport, token_provider);
//!
//! let pools = api.get_pools().await?;
//! let devices = api.get_device_tree(&pools[0].id).await?;
//! ```

mod api;
mod auth;
mod backoff;
mod circuit;
mod error;
mod gateway;
mod rate;
mod transport;
mod wire;

pub use api::{FluidraApi, SCHEDULE_COMPONENT};
pub use auth::{StaticTokenProvider, TokenProvider};
pub use backoff::RetryPolicy;
pub use circuit::{CircuitBreaker, CircuitState};
pub use error::{ApiError, Result};
pub use gateway::{GatewayConfig, ResilientClient};
pub use rate::{OverflowPolicy, RateWindow};
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, TransportError,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use wire::{ComponentState, DeviceInfo, DeviceNode, PoolSummary};
