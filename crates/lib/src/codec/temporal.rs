//! Fixed-pattern text form of temporal values.
//!
//! Stored as `yyyy-MMM-dd-HH-mm-ss` with English month abbreviations, for
//! example `2024-Jan-05-13-07-00`. The form is locale independent and reads
//! well in a hand-edited file.

use chrono::NaiveDateTime;

pub const TEMPORAL_FORMAT: &str = "%Y-%b-%d-%H-%M-%S";

pub fn format(value: &NaiveDateTime) -> String {
    value.format(TEMPORAL_FORMAT).to_string()
}

/// Parse the stored form. Month names match case-insensitively.
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TEMPORAL_FORMAT).ok()
}
