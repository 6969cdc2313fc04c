//! Human readable time spans for history rows.

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const MONTH: f64 = 30.436_875 * DAY;
const YEAR: f64 = 365.242_5 * DAY;

/// Describes `timestamp_ms` relative to `now_ms`, e.g. "a few seconds ago",
/// "5 minutes ago" or "in 2 hours".
///
/// Each unit is rounded to the nearest whole number and the coarser unit
/// takes over before the finer one gets large: under 45 seconds is "a few
/// seconds", under 45 minutes counts minutes, under 22 hours counts hours,
/// under 26 days counts days.
pub fn relative_time(timestamp_ms: u64, now_ms: u64) -> String {
    let span = describe(timestamp_ms.abs_diff(now_ms) as f64);
    if timestamp_ms > now_ms {
        format!("in {span}")
    } else {
        format!("{span} ago")
    }
}

fn describe(ms: f64) -> String {
    let s = (ms / SECOND).round();
    let m = (ms / MINUTE).round();
    let h = (ms / HOUR).round();
    let d = (ms / DAY).round();
    let mo = (ms / MONTH).round();
    let y = (ms / YEAR).round();

    if s < 45.0 {
        "a few seconds".into()
    } else if m <= 1.0 {
        "a minute".into()
    } else if m < 45.0 {
        format!("{m} minutes")
    } else if h <= 1.0 {
        "an hour".into()
    } else if h < 22.0 {
        format!("{h} hours")
    } else if d <= 1.0 {
        "a day".into()
    } else if d < 26.0 {
        format!("{d} days")
    } else if mo <= 1.0 {
        "a month".into()
    } else if mo < 11.0 {
        format!("{mo} months")
    } else if y <= 1.0 {
        "a year".into()
    } else {
        format!("{y} years")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000_000;

    fn ago(ms: u64) -> String {
        relative_time(NOW - ms, NOW)
    }

    #[test]
    fn test_seconds_and_minutes() {
        assert_eq!(ago(0), "a few seconds ago");
        assert_eq!(ago(44_000), "a few seconds ago");
        assert_eq!(ago(45_000), "a minute ago");
        assert_eq!(ago(89_000), "a minute ago");
        assert_eq!(ago(90_000), "2 minutes ago");
        assert_eq!(ago(5 * 60_000), "5 minutes ago");
        assert_eq!(ago(44 * 60_000), "44 minutes ago");
    }

    #[test]
    fn test_hours_and_days() {
        assert_eq!(ago(45 * 60_000), "an hour ago");
        assert_eq!(ago(3 * 3_600_000), "3 hours ago");
        assert_eq!(ago(21 * 3_600_000), "21 hours ago");
        assert_eq!(ago(22 * 3_600_000), "a day ago");
        assert_eq!(ago(4 * 86_400_000), "4 days ago");
        assert_eq!(ago(25 * 86_400_000), "25 days ago");
    }

    #[test]
    fn test_months_and_years() {
        assert_eq!(ago(26 * 86_400_000), "a month ago");
        assert_eq!(ago(60 * 86_400_000), "2 months ago");
        assert_eq!(ago(400 * 86_400_000), "a year ago");
        assert_eq!(ago(800 * 86_400_000), "2 years ago");
    }

    #[test]
    fn test_future_timestamps() {
        assert_eq!(relative_time(NOW + 10_000, NOW), "in a few seconds");
        assert_eq!(relative_time(NOW + 2 * 3_600_000, NOW), "in 2 hours");
    }
}
