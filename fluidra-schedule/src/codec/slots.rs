//! Slot-object wire family
//!
//! The schedule table of schedule-capable pumps: a JSON array of per-slot
//! objects with cron-string boundaries and a named start action. The device
//! always stores eight slots; unused ones are disabled placeholders.
//!
//! ```json
//! {
//!   "id": 1, "groupId": 1, "enabled": true,
//!   "startTime": "30 08 * * 1,2,3,4,5,6,7",
//!   "endTime": "59 09 * * 1,2,3,4,5,6,7",
//!   "startActions": {"operationName": "1"}
//! }
//! ```

use serde_json::{json, Value};

use crate::codec::{clamp_minute, validate_entry};
use crate::cron::{format_cron, parse_cron};
use crate::diagnostics::ScheduleDiagnostic;
use crate::entry::{DaySet, ScheduleEntry};

/// Slot count the device expects in every write
const SLOT_COUNT: usize = 8;

const PLACEHOLDER_START: &str = "00 00 * * 1,2,3,4,5,6,7";
const PLACEHOLDER_END: &str = "00 01 * * 1,2,3,4,5,6,7";

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

        // Disabled slots are placeholders, not data
        if !object.get("enabled").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }

        let start_text = object.get("startTime").and_then(Value::as_str).unwrap_or("");
        let Some(start) = parse_cron(start_text) else {
            diagnostics.push(ScheduleDiagnostic::BadTimeExpression {
                slot,
                text: start_text.to_string(),
            });
            continue;
        };

        let end_text = object.get("endTime").and_then(Value::as_str).unwrap_or("");
        let Some(end) = parse_cron(end_text) else {
            diagnostics.push(ScheduleDiagnostic::BadTimeExpression {
                slot,
                text: end_text.to_string(),
            });
            continue;
        };

        // The day set rides on the start expression; a short expression
        // without a day field means every day
        let days = start.days.unwrap_or(DaySet::ALL);
        let start_minute = clamp_minute(start.total_minutes, slot, "start", &mut diagnostics);
        let end_minute = clamp_minute(end.total_minutes, slot, "end", &mut diagnostics);
        let action = decode_action(object.get("startActions"));

        if let Some(entry) =
            validate_entry(slot, days, start_minute, end_minute, action, &mut diagnostics)
        {
            entries.push(entry);
        }
    }

    (entries, diagnostics)
}

/// `operationName` arrives as a string digit from the mobile app, but some
/// firmware revisions report it as a bare number
fn decode_action(actions: Option<&Value>) -> u8 {
    let Some(name) = actions.and_then(|a| a.get("operationName")) else {
        return 0;
    };
    match name {
        Value::Number(n) => n.as_u64().unwrap_or(0).min(u8::MAX as u64) as u8,
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn encode(entries: &[ScheduleEntry]) -> Value {
    let mut slots: Vec<Value> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let id = index + 1;
            json!({
                "id": id,
                "groupId": id,
                "enabled": true,
                "startTime": format_cron(entry.start_minute, entry.days),
                "endTime": format_cron(entry.end_minute, entry.days),
                "startActions": {"operationName": entry.action.to_string()},
            })
        })
        .collect();

    while slots.len() < SLOT_COUNT {
        let id = slots.len() + 1;
        slots.push(json!({
            "id": id,
            "groupId": id,
            "enabled": false,
            "startTime": PLACEHOLDER_START,
            "endTime": PLACEHOLDER_END,
            "startActions": {"operationName": "0"},
        }));
    }

    Value::Array(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(enabled: bool, start: &str, end: &str, operation: &str) -> Value {
        json!({
            "id": 1, "groupId": 1, "enabled": enabled,
            "startTime": start, "endTime": end,
            "startActions": {"operationName": operation},
        })
    }

    #[test]
    fn test_decode_enabled_slot() {
        let raw = vec![slot(true, "30 08 * * 1,2,3,4,5", "00 10 * * 1,2,3,4,5", "2")];
        let (entries, diagnostics) = decode(&raw);

        assert!(diagnostics.is_empty());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].start_minute, 510);
        assert_eq!(entries[0].end_minute, 600);
        assert_eq!(entries[0].action, 2);
        assert_eq!(entries[0].days, DaySet::from_days([1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_disabled_slots_skipped_silently() {
        let raw = vec![slot(false, "00 00 * * 1,2,3,4,5,6,7", "00 01 * * 1,2,3,4,5,6,7", "0")];
        let (entries, diagnostics) = decode(&raw);
        assert!(entries.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_inverted_range_dropped_with_diagnostic() {
        let raw = vec![slot(true, "00 10 * * 1", "00 08 * * 1", "1")];
        let (entries, diagnostics) = decode(&raw);
        assert!(entries.is_empty());
        assert_eq!(
            diagnostics,
            vec![ScheduleDiagnostic::InvertedRange {
                slot: 0,
                start: 600,
                end: 480
            }]
        );
    }

    #[test]
    fn test_out_of_range_time_clamped() {
        let raw = vec![slot(true, "00 08 * * 1", "30 25 * * 1", "1")];
        let (entries, diagnostics) = decode(&raw);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].end_minute, 1439);
        assert_eq!(
            diagnostics,
            vec![ScheduleDiagnostic::ClampedTime {
                slot: 0,
                field: "end",
                value: 1530
            }]
        );
    }

    #[test]
    fn test_unparseable_time_dropped() {
        let raw = vec![slot(true, "junk", "00 10 * * 1", "1")];
        let (entries, diagnostics) = decode(&raw);
        assert!(entries.is_empty());
        assert!(matches!(
            diagnostics[0],
            ScheduleDiagnostic::BadTimeExpression { slot: 0, .. }
        ));
    }

    #[test]
    fn test_numeric_operation_name_accepted() {
        let raw = vec![json!({
            "id": 1, "groupId": 1, "enabled": true,
            "startTime": "00 08 * * 1", "endTime": "00 10 * * 1",
            "startActions": {"operationName": 2},
        })];
        let (entries, _) = decode(&raw);
        assert_eq!(entries[0].action, 2);
    }

    #[test]
    fn test_encode_pads_to_eight_slots() {
        let entries = vec![ScheduleEntry::new(DaySet::ALL, 510, 599, 1)];
        let encoded = encode(&entries);
        let slots = encoded.as_array().unwrap();

        assert_eq!(slots.len(), 8);
        assert_eq!(slots[0]["enabled"], json!(true));
        assert_eq!(slots[0]["startTime"], json!("30 08 * * 1,2,3,4,5,6,7"));
        assert_eq!(slots[0]["startActions"]["operationName"], json!("1"));
        for placeholder in &slots[1..] {
            assert_eq!(placeholder["enabled"], json!(false));
            assert_eq!(placeholder["startTime"], json!(PLACEHOLDER_START));
        }
    }
}
