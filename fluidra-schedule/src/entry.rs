//! Canonical schedule representation
//!
//! Every wire family decodes into [`ScheduleEntry`] values: a weekday set
//! (Monday = 1 through Sunday = 7), start and end minutes since midnight,
//! and a device action code.

use serde::{Deserialize, Serialize};

/// Minutes in a day; valid minute values are `0..=1439`
pub const MAX_MINUTE: u16 = 1439;

/// Set of weekdays, Monday = 1 .. Sunday = 7
///
/// Stored as a 7-bit mask, bit 0 = Monday. Out-of-range day numbers are
/// ignored on insert rather than panicking; wire data is untrusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaySet(u8);

impl DaySet {
    pub const ALL: DaySet = DaySet(0b0111_1111);

    pub fn empty() -> Self {
        DaySet(0)
    }

    /// Build from a 7-bit mask, bit 0 = Monday
    pub fn from_mask(mask: u8) -> Self {
        DaySet(mask & 0b0111_1111)
    }

    pub fn from_days(days: impl IntoIterator<Item = u8>) -> Self {
        let mut set = DaySet::empty();
        for day in days {
            set.insert(day);
        }
        set
    }

    /// Insert a weekday (1–7); invalid values are ignored
    pub fn insert(&mut self, day: u8) {
        if (1..=7).contains(&day) {
            self.0 |= 1 << (day - 1);
        }
    }

    pub fn contains(&self, day: u8) -> bool {
        (1..=7).contains(&day) && self.0 & (1 << (day - 1)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn mask(&self) -> u8 {
        self.0
    }

    /// Weekday numbers in ascending order
    pub fn days(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=7).filter(move |day| self.contains(*day))
    }
}

/// One canonical recurring schedule window
///
/// Invariant: `start_minute < end_minute`, both within `0..=1439`, and
/// `days` non-empty. The decoders uphold this; entries violating it are
/// dropped with a diagnostic rather than constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub days: DaySet,
    pub start_minute: u16,
    pub end_minute: u16,
    /// Device action fired at the window start, e.g. a pump speed level
    pub action: u8,
}

impl ScheduleEntry {
    pub fn new(days: DaySet, start_minute: u16, end_minute: u16, action: u8) -> Self {
        Self {
            days,
            start_minute,
            end_minute,
            action,
        }
    }

    /// Whether this entry covers the given weekday (1–7) and minute
    ///
    /// The window is inclusive at both ends, matching how the vendor app
    /// treats a schedule running until its end time.
    pub fn is_active(&self, day: u8, minute: u16) -> bool {
        self.days.contains(day)
            && minute >= self.start_minute
            && minute <= self.end_minute
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dayset_insert_and_contains() {
        let mut days = DaySet::empty();
        days.insert(1);
        days.insert(7);
        assert!(days.contains(1));
        assert!(days.contains(7));
        assert!(!days.contains(3));
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn test_dayset_ignores_out_of_range() {
        let mut days = DaySet::empty();
        days.insert(0);
        days.insert(8);
        assert!(days.is_empty());
    }

    #[test]
    fn test_dayset_all() {
        assert_eq!(DaySet::ALL.len(), 7);
        assert_eq!(DaySet::ALL.days().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_dayset_mask_round_trip() {
        let days = DaySet::from_days([2, 4, 6]);
        assert_eq!(DaySet::from_mask(days.mask()), days);
    }

    #[test]
    fn test_is_active_respects_day_and_window() {
        let entry = ScheduleEntry::new(DaySet::from_days([1, 2]), 510, 599, 1);

        assert!(entry.is_active(1, 510));
        assert!(entry.is_active(2, 599));
        assert!(entry.is_active(1, 555));
        assert!(!entry.is_active(3, 555));
        assert!(!entry.is_active(1, 509));
        assert!(!entry.is_active(1, 600));
    }
}
