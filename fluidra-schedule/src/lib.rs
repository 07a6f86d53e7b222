//! Schedule wire-format normalization
//!
//! Pool devices encode recurring time schedules in several incompatible
//! wire forms depending on hardware family. This crate reconciles them into
//! one canonical model:
//!
//! ```text
//! raw component value ──detect──> family codec ──decode──> Vec<ScheduleEntry>
//!                                                          + diagnostics
//! Vec<ScheduleEntry> ──encode(family)──> exact wire shape for that family
//! ```
//!
//! Decoding never fails: out-of-range times are clamped into `0..=1439`,
//! and entries with inverted ranges or empty day sets are dropped with a
//! [`ScheduleDiagnostic`] attached. Encoding reproduces the exact wire
//! shape the owning device family expects, so `decode(encode(x))` is
//! semantically equal to `x` for every valid `x` a family can represent.
//!
//! # Example
//!
//! ```rust
//! use fluidra_schedule::{decode, encode, DaySet, ScheduleEntry, ScheduleFamily};
//!
//! let raw = serde_json::json!([
//!     "30 08 * * 1,2,3,4,5,6,7",
//!     "59 09 * * 1,2,3,4,5,6,7",
//! ]);
//!
//! let decoded = decode(&raw);
//! assert_eq!(decoded.family, Some(ScheduleFamily::CronPair));
//! assert_eq!(
//!     decoded.entries,
//!     vec![ScheduleEntry::new(DaySet::ALL, 510, 599, 0)]
//! );
//!
//! let wire = encode(&decoded.entries, ScheduleFamily::CronPair);
//! assert_eq!(wire, raw);
//! ```

mod codec;
mod cron;
mod diagnostics;
mod entry;

pub use diagnostics::ScheduleDiagnostic;
pub use entry::{DaySet, ScheduleEntry, MAX_MINUTE};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The wire families a schedule component can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleFamily {
    /// Flat array of cron strings taken pairwise as start/end
    CronPair,
    /// Array of `{daysMask, startMinute, endMinute, action}` objects
    DayMask,
    /// Array of per-slot objects with cron boundaries and named actions
    Slots,
}

/// Result of decoding one raw schedule component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub entries: Vec<ScheduleEntry>,
    /// Detected family; `None` when the shape was empty or unrecognized
    pub family: Option<ScheduleFamily>,
    pub diagnostics: Vec<ScheduleDiagnostic>,
}

/// Structurally detect which family a raw value belongs to
///
/// Detection looks only at the shape of the first element; families never
/// mix within one component value.
pub fn detect(raw: &Value) -> Option<ScheduleFamily> {
    let first = raw.as_array()?.first()?;

    if first.is_string() {
        return Some(ScheduleFamily::CronPair);
    }
    let object = first.as_object()?;
    if object.contains_key("daysMask") {
        return Some(ScheduleFamily::DayMask);
    }
    if object.contains_key("startTime") || object.contains_key("startActions") {
        return Some(ScheduleFamily::Slots);
    }
    None
}

/// Decode a raw schedule component into canonical entries
pub fn decode(raw: &Value) -> Decoded {
    let Some(items) = raw.as_array() else {
        return Decoded {
            diagnostics: vec![ScheduleDiagnostic::UnrecognizedShape],
            ..Decoded::default()
        };
    };
    if items.is_empty() {
        // An empty table is a valid schedule, not a malformed one
        return Decoded::default();
    }

    let Some(family) = detect(raw) else {
        return Decoded {
            diagnostics: vec![ScheduleDiagnostic::UnrecognizedShape],
            ..Decoded::default()
        };
    };

    let (entries, diagnostics) = match family {
        ScheduleFamily::CronPair => codec::cron_pair::decode(items),
        ScheduleFamily::DayMask => codec::day_mask::decode(items),
        ScheduleFamily::Slots => codec::slots::decode(items),
    };

    Decoded {
        entries,
        family: Some(family),
        diagnostics,
    }
}

/// Encode canonical entries into a family's exact wire shape
pub fn encode(entries: &[ScheduleEntry], family: ScheduleFamily) -> Value {
    match family {
        ScheduleFamily::CronPair => codec::cron_pair::encode(entries),
        ScheduleFamily::DayMask => codec::day_mask::encode(entries),
        ScheduleFamily::Slots => codec::slots::encode(entries),
    }
}
