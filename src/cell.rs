//! Cell normalization.
//!
//! Every value that enters a [`Dataset`](crate::dataset::Dataset) passes
//! through [`normalize`] first. Source cells arrive as a [`RawCell`] (whatever
//! the workbook or text reader produced); they leave as canonical strings, with
//! [`SENTINEL`] standing in for anything missing or empty.

use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};

/// Marker stored for originally absent or empty cells.
pub const SENTINEL: &str = "NA";

const INTEGER_DISPLAY_LIMIT: f64 = 1e15;

// `%.f` prints nothing for whole seconds and 3, 6 or 9 digits otherwise.
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const MS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Time of day with no date part.
    Time(NaiveTime),
    /// Elapsed time, already rendered as `[h]:mm:ss` or ISO-8601 text.
    Duration(String),
    /// Spreadsheet error literal such as `#DIV/0!`.
    Error(String),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) | RawCell::Duration(s) | RawCell::Error(s) => s.clone(),
            RawCell::Int(i) => i.to_string(),
            RawCell::Float(f) => format_float(*f),
            RawCell::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            RawCell::DateTime(dt) => format_datetime(dt),
            RawCell::Time(time) => time.format(TIME_FORMAT).to_string(),
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        RawCell::Text(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        RawCell::Int(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Float(value)
    }
}

impl From<bool> for RawCell {
    fn from(value: bool) -> Self {
        RawCell::Bool(value)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(value: Option<T>) -> Self {
        value.map_or(RawCell::Empty, Into::into)
    }
}

/// Canonical string for a source cell.
pub fn normalize(cell: &RawCell) -> String {
    if cell.is_empty() {
        SENTINEL.to_string()
    } else {
        cell.as_display()
    }
}

/// Canonical string for user-entered text. Idempotent over canonical values.
pub fn normalize_str(value: &str) -> String {
    if value.is_empty() {
        SENTINEL.to_string()
    } else {
        value.to_string()
    }
}

pub fn is_sentinel(value: &str) -> bool {
    value == SENTINEL
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < INTEGER_DISPLAY_LIMIT {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

fn format_datetime(value: &NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format(DATETIME_FORMAT).to_string()
    }
}

/// Renders a spreadsheet duration (a count of days) as `[h]:mm:ss`, with
/// milliseconds appended when present.
pub fn duration_from_days(days: f64) -> RawCell {
    let total_ms = (days * MS_PER_DAY).round() as i64;
    let sign = if total_ms < 0 { "-" } else { "" };
    let total_ms = total_ms.unsigned_abs();
    let hours = total_ms / 3_600_000;
    let minutes = total_ms / 60_000 % 60;
    let seconds = total_ms / 1_000 % 60;
    let millis = total_ms % 1_000;
    let mut text = format!("{sign}{hours}:{minutes:02}:{seconds:02}");
    if millis != 0 {
        text.push_str(&format!(".{millis:03}"));
    }
    RawCell::Duration(text)
}
