//! Localized 12-hour display formatting for wall-clock times.

use super::error::ScheduleTimeError;
use super::validate::parse_time;
use chrono::Timelike;

/// Formats a 24-hour `HH:MM` time as `"h:mm a.m."` / `"h:mm p.m."`.
///
/// Midnight renders as `"12:00 a.m."` and noon as `"12:00 p.m."`. The hour is
/// unpadded; the minute keeps its two digits.
pub fn format_time_12h(value: &str) -> Result<String, ScheduleTimeError> {
    let time = parse_time(value)?;
    let hour = time.hour();
    let suffix = if hour < 12 { "a.m." } else { "p.m." };
    let hour_12 = match hour % 12 {
        0 => 12,
        h => h,
    };

    Ok(format!("{}:{:02} {}", hour_12, time.minute(), suffix))
}

/// Builds the display string for a schedule-time range.
///
/// The primary range renders as `"{start} a {end}"`; when both extended times
/// are present the second range is appended as `" y {start} a {end}"`.
pub fn format_range(
    start: &str,
    end: &str,
    start_ext: Option<&str>,
    end_ext: Option<&str>,
) -> Result<String, ScheduleTimeError> {
    let mut text = format!("{} a {}", format_time_12h(start)?, format_time_12h(end)?);

    if let (Some(s), Some(e)) = (start_ext, end_ext) {
        text.push_str(&format!(" y {} a {}", format_time_12h(s)?, format_time_12h(e)?));
    }

    Ok(text)
}
