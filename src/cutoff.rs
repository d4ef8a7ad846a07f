use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::constants::CUTOFF_HOUR;

fn cutoff_time() -> NaiveTime {
    NaiveTime::from_hms_opt(CUTOFF_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Strictly later than 21:00:00 local on the same day
pub fn is_after_cutoff(now: NaiveDateTime) -> bool {
    now.time() > cutoff_time()
}

/// Selections are always placed for the following day
pub fn order_date(now: NaiveDateTime) -> NaiveDate {
    now.date() + Duration::days(1)
}
