//! Decode diagnostics
//!
//! Malformed schedule data never fails a decode; dropped or adjusted
//! entries are reported through these values so the caller can attach them
//! to the owning device.

use thiserror::Error;

/// One non-fatal observation made while decoding a raw schedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleDiagnostic {
    /// Start at or after end; the entry was dropped
    #[error("slot {slot}: start {start} is not before end {end}, entry dropped")]
    InvertedRange { slot: usize, start: u16, end: u16 },

    /// No weekday in the day set; the entry was dropped
    #[error("slot {slot}: empty day set, entry dropped")]
    EmptyDays { slot: usize },

    /// A time fell outside 0..=1439 and was clamped into range
    #[error("slot {slot}: {field} {value} clamped into 0..=1439")]
    ClampedTime {
        slot: usize,
        field: &'static str,
        value: i64,
    },

    /// A time expression could not be parsed; the entry was dropped
    #[error("slot {slot}: unparseable time expression {text:?}, entry dropped")]
    BadTimeExpression { slot: usize, text: String },

    /// The raw value matched no known wire family
    #[error("unrecognized schedule shape, nothing decoded")]
    UnrecognizedShape,
}
