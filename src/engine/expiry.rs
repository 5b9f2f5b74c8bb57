use chrono::{DateTime, TimeDelta, Utc};

/// Whole days from `now` until `expiry`, truncated toward zero.
///
/// Already-expired reservations yield a negative count.
pub(crate) fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_days()
}

/// Expiry instant for services that report a start time and a term length in seconds.
///
/// `None` when the term does not fit in the representable date range.
pub(crate) fn expiry_from_term(start: DateTime<Utc>, duration_secs: i64) -> Option<DateTime<Utc>> {
    start.checked_add_signed(TimeDelta::try_seconds(duration_secs)?)
}
