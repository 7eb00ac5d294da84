// src/domain/timestamp.rs
//
// Wire codec for note timestamps: microsecond precision with a numeric UTC
// offset, e.g. `2025-06-30T14:05:09.123456+0000`.
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serializer};
use thiserror::Error;

use crate::constants::TIMESTAMP_FORMAT;

pub type Timestamp = DateTime<FixedOffset>;

/// Format a timestamp exactly as the backend expects it.
///
/// # Examples
///
/// ```
/// use notedesk::domain::timestamp::{format, parse};
///
/// let ts = parse("2025-06-30T14:05:09.123456+0530").unwrap();
/// assert_eq!(format(&ts), "2025-06-30T14:05:09.123456+0530");
/// ```
pub fn format(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("expected yyyy-MM-ddTHH:mm:ss.SSSSSS+HHMM")]
    Shape,
    #[error(transparent)]
    Chrono(#[from] chrono::ParseError),
}

/// Parse a wire timestamp.
///
/// Exactly six fractional digits and a colon-free `+HHMM`/`-HHMM` offset are
/// required; chrono alone would also take a missing fraction or `+00:00`.
pub fn parse(s: &str) -> Result<Timestamp, TimestampError> {
    if !has_wire_shape(s) {
        return Err(TimestampError::Shape);
    }
    Ok(DateTime::parse_from_str(s, TIMESTAMP_FORMAT)?)
}

fn has_wire_shape(s: &str) -> bool {
    let b = s.as_bytes();
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);

    b.len() == 31
        && digits(0..4)
        && b[4] == b'-'
        && digits(5..7)
        && b[7] == b'-'
        && digits(8..10)
        && b[10] == b'T'
        && digits(11..13)
        && b[13] == b':'
        && digits(14..16)
        && b[16] == b':'
        && digits(17..19)
        && b[19] == b'.'
        && digits(20..26)
        && matches!(b[26], b'+' | b'-')
        && digits(27..31)
}

pub fn serialize<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| {
        serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e))
    })
}
