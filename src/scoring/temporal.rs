//! Event date → signed day offset from a reference "today"

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

const SECS_PER_DAY: i64 = 86_400;

/// Datetime layouts without an offset; read as UTC
const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Datetime layouts carrying a numeric offset
const OFFSET_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
];

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%a, %b %d, %Y",
];

/// Leniently parse an event date into a UTC instant
pub fn parse_event_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    // Trailing Z on an otherwise naive layout
    let naive_part = s.strip_suffix('Z').unwrap_or(s);
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive_part, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }

    None
}

/// Whole days from the start of `today` (UTC) to the event, floored.
///
/// Negative for past events; `None` when the date cannot be parsed.
pub fn days_until(raw: &str, today: NaiveDate) -> Option<i64> {
    let event = parse_event_datetime(raw)?;
    let reference = today.and_time(NaiveTime::MIN).and_utc();
    let secs = (event - reference).num_seconds();
    Some(secs.div_euclid(SECS_PER_DAY))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_plain_dates() {
        assert_eq!(days_until("2026-10-26", today()), Some(10));
        assert_eq!(days_until("2026-10-16", today()), Some(0));
        assert_eq!(days_until("10/01/2026", today()), Some(-15));
        assert_eq!(days_until("March 3, 2027", today()), Some(138));
        assert_eq!(days_until("3 Mar 2027", today()), Some(138));
    }

    #[test]
    fn test_datetimes_floor_partial_days() {
        assert_eq!(days_until("2026-10-20T19:30:00", today()), Some(4));
        assert_eq!(days_until("2026-10-20T19:30:00Z", today()), Some(4));
        assert_eq!(days_until("2026-10-20 19:30", today()), Some(4));
        // Evening before today is still one day back
        assert_eq!(days_until("2026-10-15T19:00:00Z", today()), Some(-1));
    }

    #[test]
    fn test_offsets_normalized_to_utc() {
        // 23:00 at -05:00 is 04:00 UTC the next day
        assert_eq!(days_until("2026-10-20T23:00:00-05:00", today()), Some(5));
        assert_eq!(days_until("2026-10-20T23:00:00-0500", today()), Some(5));
    }

    #[test]
    fn test_unparsable_is_none() {
        assert_eq!(days_until("", today()), None);
        assert_eq!(days_until("TBA", today()), None);
        assert_eq!(days_until("2026-13-45", today()), None);
    }
}
