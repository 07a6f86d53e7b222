//! Per-cycle semantic merge
//!
//! Turns one device's scanned components into a [`DeviceState`]: typed
//! capability readings through the profile's codecs, plus the decoded
//! schedule table. Never fails; implausible readings and malformed
//! schedules degrade to absent values with diagnostics attached.

use std::collections::BTreeMap;

use tracing::debug;

use fluidra_client::{ComponentState, DeviceNode};
use fluidra_registry::CapabilityProfile;

use crate::model::{DeviceId, DeviceState};

pub(crate) fn build_device_state(
    node: &DeviceNode,
    profile: &CapabilityProfile,
    components: BTreeMap<u32, ComponentState>,
) -> DeviceState {
    let mut capabilities = BTreeMap::new();
    let mut roles = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for binding in &profile.roles {
        roles.insert(binding.component, binding.role);
        let Some(state) = components.get(&binding.component) else {
            continue;
        };
        match binding.codec.decode(&state.reported_value) {
            Some(value) => {
                capabilities.insert(binding.role, value);
            }
            None if !state.reported_value.is_null() => {
                debug!(
                    device = %node.id,
                    component = binding.component,
                    "implausible reading dropped"
                );
                diagnostics.push(format!(
                    "component {}: implausible value {} for {:?}",
                    binding.component, state.reported_value, binding.role
                ));
            }
            None => {}
        }
    }

    let mut schedules = Vec::new();
    let mut schedule_family = None;
    if let Some(binding) = profile.schedule {
        if let Some(state) = components.get(&binding.component) {
            let decoded = fluidra_schedule::decode(&state.reported_value);
            schedules = decoded.entries;
            schedule_family = decoded.family.or(Some(binding.family));
            diagnostics.extend(decoded.diagnostics.iter().map(|d| d.to_string()));
        }
    }

    let raw_components = components
        .into_iter()
        .map(|(id, state)| (id, state.reported_value))
        .collect();

    DeviceState {
        id: DeviceId::new(&node.id),
        name: node.info.name.clone(),
        family: node.info.family.clone(),
        profile: profile.name.clone(),
        category: profile.category,
        online: node.is_online(),
        available: true,
        capabilities,
        roles,
        components: raw_components,
        schedules,
        schedule_family,
        speed_levels: profile.speed_levels.clone(),
        diagnostics,
    }
}
