//! Per-family wire codecs
//!
//! One module per wire family. Each decoder accepts untrusted JSON and
//! reports problems as diagnostics; each encoder is the single source of
//! truth for its family's exact wire shape.

pub(crate) mod cron_pair;
pub(crate) mod day_mask;
pub(crate) mod slots;

use crate::diagnostics::ScheduleDiagnostic;
use crate::entry::{DaySet, ScheduleEntry, MAX_MINUTE};

/// Clamp a raw minute count into 0..=1439, recording a diagnostic if it
/// was out of range
pub(crate) fn clamp_minute(
    raw: i64,
    slot: usize,
    field: &'static str,
    diagnostics: &mut Vec<ScheduleDiagnostic>,
) -> u16 {
    if (0..=MAX_MINUTE as i64).contains(&raw) {
        raw as u16
    } else {
        diagnostics.push(ScheduleDiagnostic::ClampedTime {
            slot,
            field,
            value: raw,
        });
        raw.clamp(0, MAX_MINUTE as i64) as u16
    }
}

/// Uphold the entry invariants, dropping violations with a diagnostic
pub(crate) fn validate_entry(
    slot: usize,
    days: DaySet,
    start: u16,
    end: u16,
    action: u8,
    diagnostics: &mut Vec<ScheduleDiagnostic>,
) -> Option<ScheduleEntry> {
    if days.is_empty() {
        diagnostics.push(ScheduleDiagnostic::EmptyDays { slot });
        return None;
    }
    if start >= end {
        diagnostics.push(ScheduleDiagnostic::InvertedRange { slot, start, end });
        return None;
    }
    Some(ScheduleEntry::new(days, start, end, action))
}
