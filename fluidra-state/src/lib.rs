//! Poll coordination and snapshot state for the Fluidra pool cloud
//!
//! Sits on top of `fluidra-client` (resilient typed API), `fluidra-registry`
//! (capability resolution) and `fluidra-schedule` (schedule normalization),
//! and turns them into a steady stream of immutable snapshots:
//!
//! ```text
//! timer / forced trigger
//!        │
//!   PollCoordinator ──> FluidraApi (gateway) ──> cloud
//!        │  device tree + component scans
//!        │  DeviceRegistry::resolve per device
//!        │  fluidra_schedule::decode per schedule component
//!        ▼
//!   Snapshot (Arc, immutable) ──> consumers via snapshot()
//! ```
//!
//! # Guarantees
//!
//! - **Single-flight**: concurrent `refresh` calls share one cycle and all
//!   observe the same result.
//! - **Monotonic publication**: cycles publish in start order; a
//!   superseded cycle's result is discarded, never overwriting newer data.
//! - **Graceful degradation**: one device's failed status fetch marks only
//!   that device unavailable; a device-tree failure keeps the previous
//!   snapshot, marked stale.
//! - **Optimistic commands**: `issue_command` writes through the gateway,
//!   patches the published snapshot wholesale, and holds off scheduled
//!   cycles until reconciled (or the hold expires).
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fluidra_state::{PollCoordinator, PollConfig};
//!
//! let coordinator = Arc::new(PollCoordinator::new(api));
//! let driver = coordinator.start();
//!
//! let snapshot = coordinator.refresh(false).await?;
//! for device in snapshot.devices() {
//!     println!("{}: available={}", device.id, device.available);
//! }
//! ```

mod config;
mod coordinator;
mod error;
mod model;
mod semantics;
mod store;

// Logging infrastructure
pub mod logging;

pub use config::PollConfig;
pub use coordinator::PollCoordinator;
pub use error::{PollError, Result};
pub use model::{DeviceId, DeviceState, Snapshot};
pub use store::SnapshotStore;

pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};

// Re-exported so consumers can build a coordinator without naming every
// workspace crate
pub use fluidra_client::{ApiError, FluidraApi, GatewayConfig, ReqwestTransport};
pub use fluidra_registry::{CapabilityValue, DeviceRegistry, SemanticRole};
pub use fluidra_schedule::{ScheduleEntry, ScheduleFamily};
