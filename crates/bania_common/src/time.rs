//! Display timezone helpers.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Parses an IANA timezone name, falling back to UTC.
pub fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("Unknown display timezone '{}', using UTC", name);
        Tz::UTC
    })
}

fn local_midnight(timezone: Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match timezone.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // Midnight skipped by a DST jump; take the instant the wall clock would show it.
        None => {
            let offset = timezone.offset_from_utc_datetime(&naive).fix();
            Utc.from_utc_datetime(&naive) - Duration::seconds(i64::from(offset.local_minus_utc()))
        }
    }
}

/// `[start, end)` of the calendar day containing `now` in `timezone`.
pub fn local_day_bounds(now: DateTime<Utc>, timezone: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.with_timezone(&timezone).date_naive();
    let tomorrow = today.succ_opt().unwrap_or(today + Duration::days(1));
    (local_midnight(timezone, today), local_midnight(timezone, tomorrow))
}
