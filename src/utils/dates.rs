//! Timestamp helpers for loan periods and overdue arithmetic.
//!
//! Timestamps travel as RFC 3339 strings with millisecond precision and a `Z`
//! suffix. Older records sometimes hold a bare `YYYY-MM-DD`, read as midnight UTC.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

/// Fixed lending period.
pub const LOAN_PERIOD_DAYS: i64 = 14;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub fn due_date(borrowed_at: DateTime<Utc>) -> DateTime<Utc> {
    borrowed_at + Duration::days(LOAN_PERIOD_DAYS)
}

/// `max(0, ceil((now - due) / 1 day))`
pub fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let late_ms = (now - due).num_milliseconds();
    if late_ms <= 0 {
        0
    } else {
        (late_ms + DAY_MS - 1) / DAY_MS
    }
}

/// `ceil((due - now) / 1 day)`, negative when the due date has passed.
pub fn remaining_days(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let left_ms = (due - now).num_milliseconds();
    -((-left_ms).div_euclid(DAY_MS))
}

/// How close a loan is to its due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Soon,
    Critical,
}

impl Urgency {
    pub fn from_remaining_days(days: i64) -> Self {
        if days < 3 {
            Urgency::Critical
        } else if days < 7 {
            Urgency::Soon
        } else {
            Urgency::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn overdue_is_zero_until_due_date_passes() {
        let due = at(15, 12);

        assert_eq!(days_overdue(due, at(10, 0)), 0);
        assert_eq!(days_overdue(due, due), 0);
        assert_eq!(days_overdue(due, at(15, 13)), 1);
        assert_eq!(days_overdue(due, at(16, 12)), 1);
        assert_eq!(days_overdue(due, at(16, 13)), 2);
    }

    #[test]
    fn overdue_grows_monotonically() {
        let due = at(1, 8);
        let mut previous = 0;
        for day in 1..=28 {
            let current = days_overdue(due, at(day, 20));
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 28);
    }

    #[test]
    fn remaining_days_rounds_up_both_ways() {
        let due = at(15, 12);

        assert_eq!(remaining_days(due, at(15, 0)), 1);
        assert_eq!(remaining_days(due, at(1, 12)), 14);
        assert_eq!(remaining_days(due, due), 0);
        assert_eq!(remaining_days(due, at(16, 0)), 0);
        assert_eq!(remaining_days(due, at(17, 0)), -1);
    }

    #[test]
    fn parses_iso_and_plain_dates() {
        let iso = parse_timestamp("2025-05-15T12:00:00.000Z").unwrap();
        assert_eq!(iso, at(15, 12));

        let plain = parse_timestamp("2025-05-15").unwrap();
        assert_eq!(plain, at(15, 0));

        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("soon").is_none());
        assert_eq!(format_timestamp(at(15, 12)), "2025-05-15T12:00:00.000Z");
    }

    #[test]
    fn urgency_buckets() {
        assert_eq!(Urgency::from_remaining_days(-2), Urgency::Critical);
        assert_eq!(Urgency::from_remaining_days(2), Urgency::Critical);
        assert_eq!(Urgency::from_remaining_days(3), Urgency::Soon);
        assert_eq!(Urgency::from_remaining_days(7), Urgency::Normal);
    }
}
