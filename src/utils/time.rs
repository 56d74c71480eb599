use std::time::{Duration, SystemTime};
use chrono::{DateTime, Local};

pub fn format_datetime(time: SystemTime) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `"<start> -> <end>"`, the form used in per-request meta.
pub fn format_span(start: SystemTime, elapsed: Duration) -> String {
    let end = start.checked_add(elapsed).unwrap_or(start);
    format!("{} -> {}", format_datetime(start), format_datetime(end))
}
