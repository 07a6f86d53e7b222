//! Wire types for the vendor REST payloads
//!
//! The cloud returns loosely-shaped JSON; everything here deserializes with
//! defaults so that a missing field degrades to empty rather than failing
//! the whole payload. Endpoints are known to return either a bare list or a
//! keyed object for collections, so list extraction handles both.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// One pool attached to the account
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Descriptive block nested under a device node
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub model: String,
}

/// One device in the pool's device tree
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceNode {
    pub id: String,
    #[serde(default)]
    pub info: DeviceInfo,
    /// Connection type as reported by the tree, e.g. `connected`
    #[serde(default, rename = "type")]
    pub connection: String,
}

impl DeviceNode {
    pub fn is_online(&self) -> bool {
        self.connection == "connected"
    }
}

/// Reported/desired value pair for one numbered component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentState {
    #[serde(default)]
    pub reported_value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,
}

/// Extract a collection that may arrive bare or wrapped in `{key: [...]}`
pub(crate) fn extract_list<T: serde::de::DeserializeOwned>(
    body: serde_json::Value,
    key: &str,
) -> Result<Vec<T>> {
    let list = match body {
        serde_json::Value::Array(items) => serde_json::Value::Array(items),
        serde_json::Value::Object(mut map) => map
            .remove(key)
            .ok_or_else(|| ApiError::Malformed(format!("missing '{}' collection", key)))?,
        other => {
            return Err(ApiError::Malformed(format!(
                "expected list or object, got {}",
                type_name(&other)
            )))
        }
    };
    serde_json::from_value(list).map_err(|e| ApiError::Malformed(e.to_string()))
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
