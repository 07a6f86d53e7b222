//! The ordered device registry
//!
//! Resolution is first-match-wins over one explicit rule list. The built-in
//! table is ordered by identification strength: exact ids, then id/family
//! patterns, then name/model substrings, then component signatures, then
//! category-keyed generics. Appending a rule can therefore never change the
//! outcome for a device an earlier rule already matched.

use fluidra_schedule::ScheduleFamily;

use crate::device::{DeviceCategory, RawDevice};
use crate::profile::{CapabilityProfile, RoleBinding, ScheduleBinding};
use crate::role::{SemanticRole, ValueCodec};
use crate::rules::{MatchRule, Predicate};

/// Resolves raw devices to capability profiles
///
/// Pure and total: every device resolves, falling back to a generic profile
/// that exposes only raw components.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    rules: Vec<MatchRule>,
    fallback: CapabilityProfile,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DeviceRegistry {
    /// Registry with the built-in rule table for known hardware families
    pub fn builtin() -> Self {
        Self::with_rules(builtin_rules())
    }

    /// Registry over a custom ordered rule list
    pub fn with_rules(rules: Vec<MatchRule>) -> Self {
        Self {
            rules,
            fallback: CapabilityProfile::generic("generic", DeviceCategory::Unknown),
        }
    }

    /// Append a rule; existing matches are unaffected (first-match-wins)
    pub fn push_rule(&mut self, rule: MatchRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    /// Resolve a device to its capability profile
    pub fn resolve(&self, device: &RawDevice) -> &CapabilityProfile {
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(device))
            .map(|rule| &rule.profile)
            .unwrap_or(&self.fallback)
    }
}

/// Basic identification components present on every device family
const INFO_COMPONENTS: [u32; 4] = [0, 1, 2, 3];

fn info_roles() -> Vec<RoleBinding> {
    vec![
        RoleBinding {
            component: 2,
            role: SemanticRole::SignalStrength,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 3,
            role: SemanticRole::FirmwareVersion,
            codec: ValueCodec::Identity,
        },
    ]
}

fn scan(extra: &[u32]) -> Vec<u32> {
    let mut components: Vec<u32> = INFO_COMPONENTS.into_iter().chain(extra.iter().copied()).collect();
    components.sort_unstable();
    components.dedup();
    components
}

fn heat_pump_profile(name: &str) -> CapabilityProfile {
    let mut roles = info_roles();
    roles.extend([
        RoleBinding {
            component: 13,
            role: SemanticRole::Power,
            codec: ValueCodec::Flag,
        },
        RoleBinding {
            component: 15,
            role: SemanticRole::TargetTemperature,
            codec: ValueCodec::Tenths { min: 10.0, max: 50.0 },
        },
        RoleBinding {
            component: 19,
            role: SemanticRole::WaterTemperature,
            codec: ValueCodec::Tenths { min: 5.0, max: 35.0 },
        },
    ]);

    CapabilityProfile {
        name: name.to_string(),
        category: DeviceCategory::HeatPump,
        controllable: true,
        roles,
        writes: vec![
            (SemanticRole::Power, 13),
            (SemanticRole::TargetTemperature, 15),
        ],
        speed_levels: Vec::new(),
        schedule: None,
        scan_components: scan(&[13, 14, 15, 19]),
    }
}

fn bridged_chlorinator_profile() -> CapabilityProfile {
    let mut roles = info_roles();
    roles.extend([
        RoleBinding {
            component: 20,
            role: SemanticRole::OperationMode,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 164,
            role: SemanticRole::ChlorinationLevel,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 172,
            role: SemanticRole::Ph,
            codec: ValueCodec::Hundredths { min: 0.0, max: 14.0 },
        },
        RoleBinding {
            component: 177,
            role: SemanticRole::Orp,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 178,
            role: SemanticRole::FreeChlorine,
            codec: ValueCodec::Hundredths { min: 0.0, max: 10.0 },
        },
        RoleBinding {
            component: 183,
            role: SemanticRole::WaterTemperature,
            codec: ValueCodec::Tenths { min: 0.0, max: 50.0 },
        },
        RoleBinding {
            component: 185,
            role: SemanticRole::Salinity,
            codec: ValueCodec::Hundredths { min: 0.0, max: 100.0 },
        },
        RoleBinding {
            component: 245,
            role: SemanticRole::BoostMode,
            codec: ValueCodec::Flag,
        },
    ]);

    CapabilityProfile {
        name: "chlorinator".to_string(),
        category: DeviceCategory::Chlorinator,
        controllable: true,
        // Bridged units split read and write component ids
        writes: vec![
            (SemanticRole::ChlorinationLevel, 4),
            (SemanticRole::PhSetpoint, 8),
            (SemanticRole::OrpSetpoint, 11),
            (SemanticRole::OperationMode, 20),
            (SemanticRole::BoostMode, 245),
        ],
        roles,
        speed_levels: Vec::new(),
        schedule: None,
        scan_components: scan(&[4, 8, 11, 20, 164, 172, 177, 178, 183, 185, 245]),
    }
}

fn cc24033907_chlorinator_profile() -> CapabilityProfile {
    let mut roles = info_roles();
    roles.extend([
        RoleBinding {
            component: 10,
            role: SemanticRole::ChlorinationLevel,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 16,
            role: SemanticRole::PhSetpoint,
            codec: ValueCodec::Hundredths { min: 0.0, max: 14.0 },
        },
        RoleBinding {
            component: 20,
            role: SemanticRole::OrpSetpoint,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 21,
            role: SemanticRole::WaterTemperature,
            codec: ValueCodec::Tenths { min: 0.0, max: 50.0 },
        },
        RoleBinding {
            component: 103,
            role: SemanticRole::BoostMode,
            codec: ValueCodec::Flag,
        },
        RoleBinding {
            component: 172,
            role: SemanticRole::Ph,
            codec: ValueCodec::Hundredths { min: 0.0, max: 14.0 },
        },
        RoleBinding {
            component: 177,
            role: SemanticRole::Orp,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 178,
            role: SemanticRole::FreeChlorine,
            codec: ValueCodec::Hundredths { min: 0.0, max: 10.0 },
        },
        RoleBinding {
            component: 185,
            role: SemanticRole::Salinity,
            codec: ValueCodec::Hundredths { min: 0.0, max: 100.0 },
        },
    ]);

    CapabilityProfile {
        name: "cc24033907_chlorinator".to_string(),
        category: DeviceCategory::Chlorinator,
        controllable: true,
        writes: vec![
            (SemanticRole::ChlorinationLevel, 10),
            (SemanticRole::PhSetpoint, 16),
            (SemanticRole::OrpSetpoint, 20),
            (SemanticRole::BoostMode, 103),
        ],
        roles,
        speed_levels: Vec::new(),
        schedule: None,
        scan_components: scan(&[10, 16, 20, 21, 103, 172, 177, 178, 185]),
    }
}

fn e30iq_pump_profile() -> CapabilityProfile {
    let mut roles = info_roles();
    roles.extend([
        RoleBinding {
            component: 9,
            role: SemanticRole::Power,
            codec: ValueCodec::Flag,
        },
        RoleBinding {
            component: 10,
            role: SemanticRole::AutoMode,
            codec: ValueCodec::Flag,
        },
        RoleBinding {
            component: 11,
            role: SemanticRole::SpeedLevel,
            codec: ValueCodec::Identity,
        },
        RoleBinding {
            component: 21,
            role: SemanticRole::NetworkStatus,
            codec: ValueCodec::Identity,
        },
    ]);

    CapabilityProfile {
        name: "e30iq_pump".to_string(),
        category: DeviceCategory::Pump,
        controllable: true,
        roles,
        writes: vec![
            (SemanticRole::Power, 9),
            (SemanticRole::AutoMode, 10),
            (SemanticRole::SpeedLevel, 11),
        ],
        speed_levels: vec![(0, 45), (1, 65), (2, 100)],
        schedule: Some(ScheduleBinding {
            component: 20,
            family: ScheduleFamily::Slots,
        }),
        scan_components: scan(&[9, 10, 11, 15, 20, 21]),
    }
}

fn generic_pump_profile() -> CapabilityProfile {
    let mut roles = info_roles();
    roles.extend([
        RoleBinding {
            component: 9,
            role: SemanticRole::Power,
            codec: ValueCodec::Flag,
        },
        RoleBinding {
            component: 10,
            role: SemanticRole::AutoMode,
            codec: ValueCodec::Flag,
        },
    ]);

    CapabilityProfile {
        name: "generic_pump".to_string(),
        category: DeviceCategory::Pump,
        controllable: true,
        roles,
        writes: vec![(SemanticRole::Power, 9), (SemanticRole::AutoMode, 10)],
        speed_levels: Vec::new(),
        schedule: None,
        scan_components: scan(&[9, 10]),
    }
}

fn generic_heater_profile() -> CapabilityProfile {
    CapabilityProfile {
        controllable: true,
        ..CapabilityProfile::generic("generic_heater", DeviceCategory::Heater)
    }
}

fn generic_light_profile() -> CapabilityProfile {
    CapabilityProfile {
        controllable: true,
        scan_components: (0..15).collect(),
        ..CapabilityProfile::generic("generic_light", DeviceCategory::Light)
    }
}

fn bridge_profile() -> CapabilityProfile {
    CapabilityProfile {
        scan_components: Vec::new(),
        ..CapabilityProfile::generic("bridge", DeviceCategory::Bridge)
    }
}

/// The built-in rule table, strongest identification first
fn builtin_rules() -> Vec<MatchRule> {
    vec![
        // -- exact device identifiers --
        MatchRule::new(
            Predicate::AnyOf(vec![
                Predicate::IdEquals("CC24033907".to_string()),
                Predicate::IdMatches("CC24033907*".to_string()),
            ]),
            cc24033907_chlorinator_profile(),
        ),
        // -- identifier prefixes and family codes --
        MatchRule::new(
            Predicate::IdMatches("LG*".to_string()),
            heat_pump_profile("lg_heat_pump"),
        ),
        MatchRule::new(
            Predicate::AnyOf(vec![
                Predicate::IdMatches("LF*".to_string()),
                Predicate::NameContains("z250".to_string()),
                Predicate::NameContains("z25".to_string()),
            ]),
            heat_pump_profile("z250iq_heat_pump"),
        ),
        MatchRule::new(
            Predicate::AnyOf(vec![
                Predicate::IdMatches("E30*".to_string()),
                Predicate::IdMatches("PUMP*".to_string()),
            ]),
            e30iq_pump_profile(),
        ),
        MatchRule::new(
            // Bridges are filtered before their bridged children match
            Predicate::CategoryHint(DeviceCategory::Bridge),
            bridge_profile(),
        ),
        MatchRule::new(
            Predicate::AnyOf(vec![
                Predicate::IdMatches("*.nn_*".to_string()),
                Predicate::FamilyContains("chlorinator".to_string()),
            ]),
            bridged_chlorinator_profile(),
        ),
        // -- name/model substrings --
        MatchRule::new(
            Predicate::AnyOf(vec![
                Predicate::NameContains("eco".to_string()),
                Predicate::NameContains("elyo".to_string()),
                Predicate::FamilyContains("eco elyo".to_string()),
                Predicate::ModelContains("astralpool".to_string()),
            ]),
            heat_pump_profile("lg_heat_pump"),
        ),
        // -- component signatures --
        MatchRule::new(
            // LG units report a BXWAA part code on component 7
            Predicate::ComponentSignature {
                component: 7,
                pattern: "BXWAA*".to_string(),
            },
            heat_pump_profile("lg_heat_pump"),
        ),
        // -- category-keyed generics --
        MatchRule::new(
            Predicate::CategoryHint(DeviceCategory::HeatPump),
            heat_pump_profile("generic_heat_pump"),
        ),
        MatchRule::new(
            Predicate::CategoryHint(DeviceCategory::Chlorinator),
            bridged_chlorinator_profile(),
        ),
        MatchRule::new(
            Predicate::CategoryHint(DeviceCategory::Pump),
            generic_pump_profile(),
        ),
        MatchRule::new(
            Predicate::CategoryHint(DeviceCategory::Heater),
            generic_heater_profile(),
        ),
        MatchRule::new(
            Predicate::CategoryHint(DeviceCategory::Light),
            generic_light_profile(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_order_is_strongest_first() {
        let registry = DeviceRegistry::builtin();
        assert_eq!(registry.rules()[0].profile.name, "cc24033907_chlorinator");
        assert!(registry.rules().len() > 10);
    }

    #[test]
    fn test_unknown_device_gets_generic_fallback() {
        let registry = DeviceRegistry::builtin();
        let device = RawDevice::new("MYSTERY01");
        let profile = registry.resolve(&device);
        assert_eq!(profile.name, "generic");
        assert!(profile.roles.is_empty());
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let registry = DeviceRegistry::builtin();
        let device = RawDevice::new("E30XYZ").with_family("Pump");
        let first = registry.resolve(&device).name.clone();
        let second = registry.resolve(&device).name.clone();
        assert_eq!(first, second);
    }
}
