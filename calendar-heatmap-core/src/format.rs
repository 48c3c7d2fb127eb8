//! Formatting helpers for tooltips and labels.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3_600;
const SECONDS_PER_DAY: u64 = 86_400;

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Format a duration as hours and minutes (e.g., "1 hour 1 minute").
///
/// Zero units are left out; durations under a minute are shown in seconds.
pub fn format_time(seconds: u64) -> String {
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;

    let mut parts = Vec::with_capacity(2);
    if hours > 0 {
        parts.push(plural(hours, "hour"));
    }
    if minutes > 0 {
        parts.push(plural(minutes, "minute"));
    }
    if parts.is_empty() {
        return plural(seconds, "second");
    }
    parts.join(" ")
}

/// Break a duration into day/hour/minute parts, skipping zero units.
///
/// Used for the "Total time tracked" block of the global tooltip, where each
/// part gets its own line.
pub fn format_time_breakdown(seconds: u64) -> Vec<String> {
    let days = seconds / SECONDS_PER_DAY;
    let hours = (seconds % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;

    [(days, "day"), (hours, "hour"), (minutes, "minute")]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, unit)| plural(count, unit))
        .collect()
}

/// "No time" for zero, otherwise [`format_time`].
pub fn format_tracked(seconds: u64) -> String {
    if seconds == 0 {
        "No time".to_string()
    } else {
        format_time(seconds)
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Format a date for tooltips (e.g., "Monday, Jan 1st 2024").
pub fn format_long_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {}{} {}",
        date.format("%A"),
        date.format("%b"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

/// Format a timestamp for tooltips (e.g., "Monday, Jan 1st 2024 09:30").
pub fn format_long_datetime(ts: NaiveDateTime) -> String {
    format!("{} {}", format_long_date(ts.date()), ts.format("%H:%M"))
}

/// Short month label (e.g., "Jan").
pub fn month_label(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}

/// Single-letter weekday label, 0 = Sunday.
pub fn weekday_initial(weekday: u32) -> &'static str {
    match weekday {
        0 | 6 => "S",
        1 => "M",
        2 | 4 => "T",
        3 => "W",
        5 => "F",
        _ => "",
    }
}

/// Hour-of-day label (e.g., "09:00").
pub fn hour_label(hour: u32) -> String {
    format!("{:02}:00", hour)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(3661), "1 hour 1 minute");
        assert_eq!(format_time(30), "30 seconds");
        assert_eq!(format_time(7200), "2 hours");
        assert_eq!(format_time(60), "1 minute");
        assert_eq!(format_time(1), "1 second");
        assert_eq!(format_time(0), "0 seconds");
        assert_eq!(format_time(2 * 3600 + 5 * 60 + 9), "2 hours 5 minutes");
    }

    #[test]
    fn test_format_time_breakdown_suppresses_zero_units() {
        assert_eq!(
            format_time_breakdown(86_400 + 2 * 3600 + 60),
            vec!["1 day", "2 hours", "1 minute"]
        );
        assert_eq!(format_time_breakdown(2 * 86_400 + 120), vec!["2 days", "2 minutes"]);
        assert!(format_time_breakdown(59).is_empty());
    }

    #[test]
    fn test_format_tracked() {
        assert_eq!(format_tracked(0), "No time");
        assert_eq!(format_tracked(120), "2 minutes");
    }

    #[test]
    fn test_format_long_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_long_date(date), "Monday, Jan 1st 2024");
        let date = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        assert_eq!(format_long_date(date), "Tuesday, Mar 12th 2024");
        let date = NaiveDate::from_ymd_opt(2024, 3, 23).unwrap();
        assert_eq!(format_long_date(date), "Saturday, Mar 23rd 2024");

        let ts = date.and_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_long_datetime(ts), "Saturday, Mar 23rd 2024 09:05");
    }

    #[test]
    fn test_labels() {
        assert_eq!(month_label(1), "Jan");
        assert_eq!(month_label(12), "Dec");
        let week: String = (0..7).map(weekday_initial).collect();
        assert_eq!(week, "SMTWTFS");
        assert_eq!(hour_label(7), "07:00");
    }
}
