//! Per-device semantic state within one snapshot

use std::collections::BTreeMap;

use serde::Serialize;

use fluidra_registry::{CapabilityValue, DeviceCategory, SemanticRole};
use fluidra_schedule::{ScheduleEntry, ScheduleFamily};

use super::DeviceId;

/// One device's resolved state, self-consistent within a single cycle
#[derive(Debug, Clone, Serialize)]
pub struct DeviceState {
    pub id: DeviceId,
    pub name: String,
    pub family: String,
    /// Name of the capability profile that resolved this device
    pub profile: String,
    pub category: DeviceCategory,
    /// Connection state as reported by the device tree
    pub online: bool,
    /// False when this device's status fetch failed this cycle; the rest
    /// of the state is then carried over unchanged or empty
    pub available: bool,
    /// Typed readings keyed by semantic role
    pub capabilities: BTreeMap<SemanticRole, CapabilityValue>,
    /// Component id → role, for interpreting command targets
    pub roles: BTreeMap<u32, SemanticRole>,
    /// Raw reported values of every scanned component
    pub components: BTreeMap<u32, serde_json::Value>,
    /// Decoded schedule table, when the profile declares one
    pub schedules: Vec<ScheduleEntry>,
    pub schedule_family: Option<ScheduleFamily>,
    /// Speed level → percent table for variable-speed pumps
    pub speed_levels: Vec<(u8, u8)>,
    /// Non-fatal decode observations from this cycle
    pub diagnostics: Vec<String>,
}

impl DeviceState {
    /// Placeholder state for a device whose status fetch failed
    pub fn unavailable(
        id: DeviceId,
        name: impl Into<String>,
        family: impl Into<String>,
        profile: impl Into<String>,
        category: DeviceCategory,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            family: family.into(),
            profile: profile.into(),
            category,
            online: false,
            available: false,
            capabilities: BTreeMap::new(),
            roles: BTreeMap::new(),
            components: BTreeMap::new(),
            schedules: Vec::new(),
            schedule_family: None,
            speed_levels: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn capability(&self, role: SemanticRole) -> Option<&CapabilityValue> {
        self.capabilities.get(&role)
    }

    pub fn is_running(&self) -> bool {
        self.capability(SemanticRole::Power)
            .and_then(CapabilityValue::as_bool)
            .unwrap_or(false)
    }

    pub fn auto_mode(&self) -> bool {
        self.capability(SemanticRole::AutoMode)
            .and_then(CapabilityValue::as_bool)
            .unwrap_or(false)
    }

    /// Current speed percent at the given local weekday (1–7) and minute
    ///
    /// A stopped pump is always 0%. In auto mode the speed comes from the
    /// schedule entry active right now; in manual mode from the reported
    /// speed level. `None` when the device has no speed table.
    pub fn speed_percent_at(&self, day: u8, minute: u16) -> Option<u8> {
        if self.speed_levels.is_empty() {
            return None;
        }
        if !self.is_running() {
            return Some(0);
        }

        if self.auto_mode() {
            let active = self
                .schedules
                .iter()
                .find(|entry| entry.is_active(day, minute));
            return Some(match active {
                Some(entry) => self.speed_for_level(entry.action).unwrap_or(0),
                None => 0,
            });
        }

        let level = self
            .capability(SemanticRole::SpeedLevel)
            .and_then(CapabilityValue::as_f64)
            .unwrap_or(0.0) as u8;
        Some(self.speed_for_level(level).unwrap_or(0))
    }

    fn speed_for_level(&self, level: u8) -> Option<u8> {
        self.speed_levels
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, percent)| *percent)
    }
}
