//! Business time zone helpers
//!
//! Everything past this module works in `i64` Unix millis.

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;

/// Local midnight → Unix millis (business time zone)
///
/// DST gap fallback: if local midnight does not exist, fall back to UTC.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Next local midnight → Unix millis, used as an exclusive `< end` bound
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// Calendar date of `millis` in the business time zone
pub fn local_date(millis: i64, tz: Tz) -> NaiveDate {
    DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .with_timezone(&tz)
        .date_naive()
}

/// The full local day before the one containing `now`: `(date, start, end)`
pub fn previous_day(now: i64, tz: Tz) -> (NaiveDate, i64, i64) {
    let today = local_date(now, tz);
    let yesterday = today.pred_opt().unwrap_or(today);
    (
        yesterday,
        day_start_millis(yesterday, tz),
        day_start_millis(today, tz),
    )
}

/// Parse an IANA zone name, falling back to UTC
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|e| {
        tracing::warn!("Invalid TIMEZONE '{}': {}, falling back to UTC", name, e);
        Tz::UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::util::{DAY_MS, HOUR_MS};

    #[test]
    fn test_previous_day_utc() {
        // 2024-03-10 15:00:00 UTC
        let now = 1_710_082_800_000;
        let (date, start, end) = previous_day(now, Tz::UTC);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(end - start, DAY_MS);
        assert_eq!(start, 1_709_942_400_000);
    }

    #[test]
    fn test_previous_day_respects_zone() {
        // 2024-06-02 02:00 UTC is still 2024-06-01 evening in New York
        let now = 1_717_293_600_000;
        let (date, start, _) = previous_day(now, chrono_tz::America::New_York);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        // EDT midnight is 04:00 UTC
        assert_eq!(start.rem_euclid(DAY_MS), 4 * HOUR_MS);
    }

    #[test]
    fn test_dst_day_is_23_hours() {
        let tz = chrono_tz::Europe::Madrid;
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(day_end_millis(date, tz) - day_start_millis(date, tz), 23 * HOUR_MS);
    }

    #[test]
    fn test_parse_timezone_fallback() {
        assert_eq!(parse_timezone("Europe/Madrid"), chrono_tz::Europe::Madrid);
        assert_eq!(parse_timezone("Mars/Base"), Tz::UTC);
    }
}
