//! Cron-pair wire family
//!
//! The plainest encoding: a flat array of five-field cron strings taken
//! pairwise as start/end boundaries. Carries no action code; the device
//! fires its default operation, so decoded entries have action 0 and only
//! action-0 entries are representable.
//!
//! ```json
//! ["30 08 * * 1,2,3,4,5,6,7", "59 09 * * 1,2,3,4,5,6,7"]
//! ```

use serde_json::Value;

use crate::codec::{clamp_minute, validate_entry};
use crate::cron::{format_cron, parse_cron};
use crate::diagnostics::ScheduleDiagnostic;
use crate::entry::{DaySet, ScheduleEntry};

pub(crate) fn decode(raw: &[Value]) -> (Vec<ScheduleEntry>, Vec<ScheduleDiagnostic>) {
    let mut entries = Vec::new();
    let mut diagnostics = Vec::new();

    let texts: Vec<&str> = raw.iter().map(|v| v.as_str().unwrap_or("")).collect();

    for (slot, pair) in texts.chunks(2).enumerate() {
        let start_text = pair[0];
        let Some(end_text) = pair.get(1) else {
            // Dangling start with no matching end
            diagnostics.push(ScheduleDiagnostic::BadTimeExpression {
                slot,
                text: start_text.to_string(),
            });
            continue;
        };

        let (Some(start), Some(end)) = (parse_cron(start_text), parse_cron(end_text)) else {
            diagnostics.push(ScheduleDiagnostic::BadTimeExpression {
                slot,
                text: format!("{} / {}", start_text, end_text),
            });
            continue;
        };

        let days = start.days.unwrap_or(DaySet::ALL);
        let start_minute = clamp_minute(start.total_minutes, slot, "start", &mut diagnostics);
        let end_minute = clamp_minute(end.total_minutes, slot, "end", &mut diagnostics);

        if let Some(entry) =
            validate_entry(slot, days, start_minute, end_minute, 0, &mut diagnostics)
        {
            entries.push(entry);
        }
    }

    (entries, diagnostics)
}

pub(crate) fn encode(entries: &[ScheduleEntry]) -> Value {
    let strings: Vec<Value> = entries
        .iter()
        .flat_map(|entry| {
            [
                Value::String(format_cron(entry.start_minute, entry.days)),
                Value::String(format_cron(entry.end_minute, entry.days)),
            ]
        })
        .collect();
    Value::Array(strings)
}
