//! Raw device description
//!
//! The coordinator assembles one [`RawDevice`] per cycle from the vendor
//! tree plus the scanned component values; the resolver consumes it
//! read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Broad equipment categories declared or inferred from the vendor tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Pump,
    HeatPump,
    Chlorinator,
    Heater,
    Light,
    /// Protocol bridge, not a controllable device
    Bridge,
    #[default]
    Unknown,
}

impl DeviceCategory {
    /// Derive a category hint from free-text family/type fields
    pub fn from_hint(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("bridge") {
            DeviceCategory::Bridge
        } else if text.contains("chlorinator") {
            DeviceCategory::Chlorinator
        } else if text.contains("heat pump") || text.contains("heat_pump") {
            DeviceCategory::HeatPump
        } else if text.contains("heater") {
            DeviceCategory::Heater
        } else if text.contains("pump") {
            DeviceCategory::Pump
        } else if text.contains("light") {
            DeviceCategory::Light
        } else {
            DeviceCategory::Unknown
        }
    }
}

/// One device as seen on the wire: identity strings plus scanned components
///
/// Component ids are unique within a device by construction (`BTreeMap`
/// keyed by id); values are the raw reported JSON.
#[derive(Debug, Clone, Default)]
pub struct RawDevice {
    pub id: String,
    pub name: String,
    pub family: String,
    pub model: String,
    pub category_hint: DeviceCategory,
    pub components: BTreeMap<u32, serde_json::Value>,
}

impl RawDevice {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        let family = family.into();
        self.category_hint = DeviceCategory::from_hint(&family);
        self.family = family;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_category(mut self, category: DeviceCategory) -> Self {
        self.category_hint = category;
        self
    }

    pub fn with_component(mut self, id: u32, value: serde_json::Value) -> Self {
        self.components.insert(id, value);
        self
    }

    pub fn component(&self, id: u32) -> Option<&serde_json::Value> {
        self.components.get(&id)
    }
}
