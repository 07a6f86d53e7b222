//! Day-mask wire family
//!
//! Compact numeric encoding used by timer components: a 7-bit weekday mask
//! (bit 0 = Monday) plus start/end minutes since midnight and a numeric
//! action code.
//!
//! ```json
//! {"daysMask": 127, "startMinute": 510, "endMinute": 599, "action": 1}
//! ```

use serde_json::{json, Value};

use crate::codec::{clamp_minute, validate_entry};
use crate::diagnostics::ScheduleDiagnostic;
use crate::entry::{DaySet, ScheduleEntry};

pub(crate) fn decode(raw: &[Value]) -> (Vec<ScheduleEntry>, Vec<ScheduleDiagnostic>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    for (slot, value) in raw.iter().enumerate() {
        let Some(object) = value.as_object() else {
            diagnostics.push(ScheduleDiagnostic::BadTimeExpression {
                slot,
                text: value.to_string(),
            });
            continue;
        };

        let mask = object
            .get("daysMask")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .min(u8::MAX as u64) as u8;
        let days = DaySet::from_mask(mask);

        let start_raw = object.get("startMinute").and_then(Value::as_i64).unwrap_or(0);
        let end_raw = object.get("endMinute").and_then(Value::as_i64).unwrap_or(0);
        let start = clamp_minute(start_raw, slot, "start", &mut diagnostics);
        let end = clamp_minute(end_raw, slot, "end", &mut diagnostics);

        let action = object
            .get("action")
            .and_then(Value::as_u64)
            .unwrap_or(0)
            .min(u8::MAX as u64) as u8;

        if let Some(entry) = validate_entry(slot, days, start, end, action, &mut diagnostics) {
            entries.push(entry);
        }
    }

    (entries, diagnostics)
}

pub(crate) fn encode(entries: &[ScheduleEntry]) -> Value {
    let objects: Vec<Value> = entries
        .iter()
        .map(|entry| {
            json!({
                "daysMask": entry.days.mask(),
                "startMinute": entry.start_minute,
                "endMinute": entry.end_minute,
                "action": entry.action,
            })
        })
        .collect();
    Value::Array(objects)
}
