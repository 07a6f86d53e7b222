//! Capability profiles
//!
//! A profile is the semantic map for one hardware family: which component
//! carries which role, how to decode it, where commands are written, and
//! whether (and how) the device stores schedules.

use serde::{Deserialize, Serialize};

use fluidra_schedule::ScheduleFamily;

use crate::device::DeviceCategory;
use crate::role::{SemanticRole, ValueCodec};

/// Read binding: component id → role + codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub component: u32,
    pub role: SemanticRole,
    pub codec: ValueCodec,
}

/// Where the device keeps its schedule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBinding {
    pub component: u32,
    pub family: ScheduleFamily,
}

/// Semantic mapping for one hardware family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityProfile {
    pub name: String,
    pub category: DeviceCategory,
    /// Bridges and unknown hardware are observed, never commanded
    pub controllable: bool,
    /// Read-side bindings, ordered by component id
    pub roles: Vec<RoleBinding>,
    /// Write targets for commands, per role (may differ from the read side
    /// on bridged hardware)
    pub writes: Vec<(SemanticRole, u32)>,
    /// Speed level → percent for variable-speed pumps
    pub speed_levels: Vec<(u8, u8)>,
    pub schedule: Option<ScheduleBinding>,
    /// Components fetched for this family each poll cycle
    pub scan_components: Vec<u32>,
}

impl CapabilityProfile {
    /// A profile exposing only raw components, used when nothing matches
    pub fn generic(name: impl Into<String>, category: DeviceCategory) -> Self {
        Self {
            name: name.into(),
            category,
            controllable: false,
            roles: Vec::new(),
            writes: Vec::new(),
            speed_levels: Vec::new(),
            schedule: None,
            // Default exploratory scan range of the vendor protocol
            scan_components: (0..25).collect(),
        }
    }

    pub fn role_of(&self, component: u32) -> Option<SemanticRole> {
        self.roles
            .iter()
            .find(|binding| binding.component == component)
            .map(|binding| binding.role)
    }

    pub fn binding_for(&self, role: SemanticRole) -> Option<&RoleBinding> {
        self.roles.iter().find(|binding| binding.role == role)
    }

    pub fn has_role(&self, role: SemanticRole) -> bool {
        self.binding_for(role).is_some()
    }

    /// Component a command for `role` is written to
    pub fn write_component(&self, role: SemanticRole) -> Option<u32> {
        self.writes
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, component)| *component)
    }

    /// Map a discrete speed level onto the displayed percent
    pub fn speed_percent(&self, level: u8) -> Option<u8> {
        self.speed_levels
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, percent)| *percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_profile_exposes_nothing() {
        let profile = CapabilityProfile::generic("generic", DeviceCategory::Unknown);
        assert!(!profile.controllable);
        assert!(profile.roles.is_empty());
        assert!(profile.schedule.is_none());
        assert_eq!(profile.scan_components.len(), 25);
    }

    #[test]
    fn test_role_lookup() {
        let mut profile = CapabilityProfile::generic("pump", DeviceCategory::Pump);
        profile.roles.push(RoleBinding {
            component: 9,
            role: SemanticRole::Power,
            codec: ValueCodec::Flag,
        });
        profile.writes.push((SemanticRole::Power, 9));

        assert_eq!(profile.role_of(9), Some(SemanticRole::Power));
        assert_eq!(profile.role_of(10), None);
        assert!(profile.has_role(SemanticRole::Power));
        assert_eq!(profile.write_component(SemanticRole::Power), Some(9));
    }

    #[test]
    fn test_speed_percent_mapping() {
        let mut profile = CapabilityProfile::generic("pump", DeviceCategory::Pump);
        profile.speed_levels = vec![(0, 45), (1, 65), (2, 100)];

        assert_eq!(profile.speed_percent(0), Some(45));
        assert_eq!(profile.speed_percent(2), Some(100));
        assert_eq!(profile.speed_percent(9), None);
    }
}
