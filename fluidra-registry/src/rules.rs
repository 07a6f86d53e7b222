//! Declarative match rules
//!
//! New device families are added as data: a predicate plus a profile,
//! appended to the registry's ordered rule list. Matching is pure string
//! and component inspection; no rule executes device-specific control flow.

use crate::device::{DeviceCategory, RawDevice};
use crate::profile::CapabilityProfile;

/// A declarative condition over a raw device
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Device id equals the value, case-insensitive
    IdEquals(String),
    /// Device id matches a `*` wildcard pattern, case-insensitive
    IdMatches(String),
    /// Device name contains the value, case-insensitive
    NameContains(String),
    /// Family string contains the value, case-insensitive
    FamilyContains(String),
    /// Model string contains the value, case-insensitive
    ModelContains(String),
    /// A component's reported value matches a wildcard pattern
    ComponentSignature { component: u32, pattern: String },
    /// Declared category hint equals the value
    CategoryHint(DeviceCategory),
    AllOf(Vec<Predicate>),
    AnyOf(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, device: &RawDevice) -> bool {
        match self {
            Predicate::IdEquals(id) => device.id.eq_ignore_ascii_case(id),
            Predicate::IdMatches(pattern) => wildcard_match(pattern, &device.id),
            Predicate::NameContains(text) => contains_ignore_case(&device.name, text),
            Predicate::FamilyContains(text) => contains_ignore_case(&device.family, text),
            Predicate::ModelContains(text) => contains_ignore_case(&device.model, text),
            Predicate::ComponentSignature { component, pattern } => device
                .component(*component)
                .map(component_text)
                .is_some_and(|value| wildcard_match(pattern, &value)),
            Predicate::CategoryHint(category) => device.category_hint == *category,
            Predicate::AllOf(predicates) => predicates.iter().all(|p| p.matches(device)),
            Predicate::AnyOf(predicates) => predicates.iter().any(|p| p.matches(device)),
        }
    }
}

/// One ordered registry row
#[derive(Debug, Clone)]
pub struct MatchRule {
    pub predicate: Predicate,
    pub profile: CapabilityProfile,
}

impl MatchRule {
    pub fn new(predicate: Predicate, profile: CapabilityProfile) -> Self {
        Self { predicate, profile }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// String form of a component value for signature matching
fn component_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Case-insensitive match where `*` spans any run of characters
///
/// The full value must match (a bare substring pattern needs explicit
/// leading/trailing stars).
fn wildcard_match(pattern: &str, value: &str) -> bool {
    fn match_parts(pattern: &[char], value: &[char]) -> bool {
        match pattern.split_first() {
            None => value.is_empty(),
            Some(('*', rest)) => (0..=value.len()).any(|skip| match_parts(rest, &value[skip..])),
            Some((ch, rest)) => value
                .split_first()
                .is_some_and(|(v, tail)| v == ch && match_parts(rest, tail)),
        }
    }

    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let value: Vec<char> = value.to_lowercase().chars().collect();
    match_parts(&pattern, &value)
}
