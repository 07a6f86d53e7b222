//! Five-field cron-like time expressions
//!
//! The vendor encodes schedule boundaries as `"minute hour * * days"`, with
//! days comma-separated in mobile-app numbering (Monday = 1 .. Sunday = 7).
//! Standard-cron Sunday (`0`) is normalized to `7` on parse.

use crate::entry::DaySet;

/// Parsed boundary: minutes since midnight before clamping, plus the day
/// field when present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CronTime {
    /// `hour * 60 + minute`, unclamped; callers clamp into 0..=1439
    pub total_minutes: i64,
    /// None when the expression had fewer than five fields
    pub days: Option<DaySet>,
}

/// Parse a `"minute hour * * days"` expression
///
/// Returns `None` when the minute/hour fields are missing or non-numeric.
/// The day field tolerates junk elements (skipped individually).
pub(crate) fn parse_cron(text: &str) -> Option<CronTime> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }

    let minute: i64 = parts[0].parse().ok()?;
    let hour: i64 = parts[1].parse().ok()?;

    let days = parts.get(4).map(|field| parse_days(field));

    Some(CronTime {
        total_minutes: hour * 60 + minute,
        days,
    })
}

fn parse_days(field: &str) -> DaySet {
    if field == "*" {
        return DaySet::ALL;
    }
    let mut days = DaySet::empty();
    for part in field.split(',') {
        if let Ok(day) = part.trim().parse::<u8>() {
            // Standard cron uses 0 for Sunday; the mobile format uses 7
            days.insert(if day == 0 { 7 } else { day });
        }
    }
    days
}

/// Format a boundary back into the mobile-app wire form
///
/// Days are always listed explicitly in ascending order, never as `*`.
pub(crate) fn format_cron(minute_of_day: u16, days: DaySet) -> String {
    let days_field = days
        .days()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{:02} {:02} * * {}",
        minute_of_day % 60,
        minute_of_day / 60,
        days_field
    )
}
