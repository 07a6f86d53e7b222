//! State model: device identity, per-device state, merged snapshots

mod device_id;
mod device_state;
mod snapshot;

pub use device_id::DeviceId;
pub use device_state::DeviceState;
pub use snapshot::Snapshot;
