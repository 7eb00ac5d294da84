// src/util/text.rs
use chrono::{DateTime, Utc};

use crate::domain::timestamp::Timestamp;

/// First line of `text`, trimmed.
///
/// # Examples
///
/// ```
/// use notedesk::util::text::first_line;
///
/// assert_eq!(first_line("  Groceries \nmilk"), "Groceries");
/// ```
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

/// At most `max_lines` lines of `text`, with an ellipsis line when cut.
pub fn preview_lines(text: &str, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = text
        .lines()
        .take(max_lines)
        .map(|line| line.trim_end().to_string())
        .collect();
    if text.lines().count() > max_lines {
        lines.push("...".to_string());
    }
    lines
}

/// Human phrase for how long ago `ts` was, relative to `now`.
pub fn relative_time(ts: &Timestamp, now: DateTime<Utc>) -> String {
    let seconds = now.signed_duration_since(ts.with_timezone(&Utc)).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    let (value, unit) = match seconds {
        0..=59 => return "just now".to_string(),
        60..=3599 => (seconds / 60, "minute"),
        3600..=86_399 => (seconds / 3600, "hour"),
        _ => (seconds / 86_400, "day"),
    };
    let plural = if value == 1 { "" } else { "s" };
    format!("{value} {unit}{plural} ago")
}
