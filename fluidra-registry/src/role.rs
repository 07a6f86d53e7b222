//! Semantic roles and value codecs
//!
//! A role names what a component means; a codec says how to turn its raw
//! wire value into a typed reading. Scaling rules come from the vendor
//! protocol: temperatures arrive ×10, pH and free chlorine ×100.

use serde::{Deserialize, Serialize};

/// Semantic function of a component within a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRole {
    /// Main on/off state
    Power,
    /// Schedule-driven automatic operation
    AutoMode,
    /// Operating mode selector (off / on / auto)
    OperationMode,
    /// Discrete speed level of a variable-speed pump
    SpeedLevel,
    /// Heat demand currently active
    HeatingActive,
    /// Configured target water temperature, °C
    TargetTemperature,
    /// Measured water temperature, °C
    WaterTemperature,
    /// Measured pH
    Ph,
    /// Configured pH setpoint
    PhSetpoint,
    /// Measured redox potential, mV
    Orp,
    /// Configured redox setpoint, mV
    OrpSetpoint,
    /// Measured free chlorine, mg/l
    FreeChlorine,
    /// Chlorine production level, percent
    ChlorinationLevel,
    /// Measured salinity, g/l
    Salinity,
    /// Temporary boost chlorination
    BoostMode,
    /// Radio signal strength
    SignalStrength,
    /// Device firmware version
    FirmwareVersion,
    /// Network/connectivity status word
    NetworkStatus,
}

/// A decoded, typed capability reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapabilityValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Raw(serde_json::Value),
}

impl CapabilityValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CapabilityValue::Bool(b) => Some(*b),
            CapabilityValue::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CapabilityValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// How a raw component value becomes a typed reading
///
/// Scaled codecs carry a plausibility range; a reading outside it decodes
/// to `None` instead of a wrong number (the hardware reports garbage during
/// startup and comms hiccups).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueCodec {
    /// Pass the raw value through, typed by JSON shape
    Identity,
    /// Boolean from 0/1 or true/false
    Flag,
    /// Raw value ÷ 10, accepted only within `[min, max]`
    Tenths { min: f64, max: f64 },
    /// Raw value ÷ 100, accepted only within `[min, max]`
    Hundredths { min: f64, max: f64 },
}

impl ValueCodec {
    pub fn decode(&self, raw: &serde_json::Value) -> Option<CapabilityValue> {
        match self {
            ValueCodec::Identity => Some(match raw {
                serde_json::Value::Bool(b) => CapabilityValue::Bool(*b),
                serde_json::Value::Number(n) => CapabilityValue::Number(n.as_f64()?),
                serde_json::Value::String(s) => CapabilityValue::Text(s.clone()),
                serde_json::Value::Null => return None,
                other => CapabilityValue::Raw(other.clone()),
            }),
            ValueCodec::Flag => match raw {
                serde_json::Value::Bool(b) => Some(CapabilityValue::Bool(*b)),
                serde_json::Value::Number(n) => {
                    Some(CapabilityValue::Bool(n.as_f64()? != 0.0))
                }
                _ => None,
            },
            ValueCodec::Tenths { min, max } => scale(raw, 10.0, *min, *max),
            ValueCodec::Hundredths { min, max } => scale(raw, 100.0, *min, *max),
        }
    }
}

fn scale(raw: &serde_json::Value, divisor: f64, min: f64, max: f64) -> Option<CapabilityValue> {
    let number = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.parse().ok()?,
        _ => return None,
    };
    let scaled = number / divisor;
    if (min..=max).contains(&scaled) {
        Some(CapabilityValue::Number(scaled))
    } else {
        None
    }
}
