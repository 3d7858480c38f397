use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{Result, ValidationError};

/// Time zone used when the user has not picked one.
pub const DEFAULT_TZ: Tz = chrono_tz::UTC;

/// Converts a UTC instant to the user's local calendar day.
///
/// This is the single source of truth for turning "now" into the reference
/// day used by all recurrence comparisons.
pub fn local_date_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Resolves a local wall-clock time in `tz` to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earliest instant. Times that
/// do not exist (DST spring-forward gap) are shifted forward by one hour,
/// which lands on the first valid instant after the gap for every real zone.
pub fn local_instant_to_utc(local: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

/// Formats a local calendar day as a `YYYY-MM-DD` key.
pub fn to_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a `YYYY-MM-DD` key back into a calendar day.
pub fn from_date_key(key: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDateKey(key.to_string()).into())
}

/// Whole calendar days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}
