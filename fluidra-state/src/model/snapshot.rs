//! Immutable merged snapshot of all monitored devices

use std::collections::BTreeMap;
use std::time::SystemTime;

use serde::Serialize;

use super::{DeviceId, DeviceState};

/// Point-in-time view of every monitored device's semantic state
///
/// Published atomically behind an `Arc` and never edited in place: a failed
/// cycle re-publishes the previous snapshot with only the staleness flag
/// changed, and optimistic command state replaces the snapshot wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Cycle sequence number; publication is monotonic in this
    pub cycle: u64,
    pub taken_at: SystemTime,
    /// Set when the last refresh cycle failed and this data is carried over
    pub stale: bool,
    pub devices: BTreeMap<DeviceId, DeviceState>,
    /// Latest pool water-quality telemetry, when enabled
    pub water_quality: Option<serde_json::Value>,
}

impl Snapshot {
    /// The pre-first-cycle snapshot: no devices, marked stale
    pub fn empty() -> Self {
        Self {
            cycle: 0,
            taken_at: SystemTime::UNIX_EPOCH,
            stale: true,
            devices: BTreeMap::new(),
            water_quality: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cycle == 0 && self.devices.is_empty()
    }

    pub fn get_device(&self, id: &DeviceId) -> Option<&DeviceState> {
        self.devices.get(id)
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceState> {
        self.devices.values()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn available_count(&self) -> usize {
        self.devices.values().filter(|d| d.available).count()
    }
}
