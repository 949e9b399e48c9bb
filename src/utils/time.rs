//! Timestamp helpers.

use chrono::{DateTime, Local, SecondsFormat, TimeZone};

/// Current local time with its fixed UTC offset, e.g. `2025-08-30T19:12:03+03:00`.
pub fn time_stamp() -> String {
    format_stamp(&Local::now())
}

/// Format any zoned time the way [`time_stamp`] does.
pub fn format_stamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Format a polling interval for display (`1s`, `2.5s`)
pub fn format_interval(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}s", secs as u64)
    } else {
        format!("{:.1}s", secs)
    }
}
