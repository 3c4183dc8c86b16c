//! Millisecond clock helpers.
//!
//! Token expiry math is done in unix milliseconds because the identity
//! provider's `exp` claim is unix seconds and the refresh threshold is
//! expressed in milliseconds.

use time::OffsetDateTime;

/// Converts a datetime to unix milliseconds.
#[must_use]
pub fn unix_millis(datetime: OffsetDateTime) -> i64 {
    (datetime.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Current wall-clock time in unix milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    unix_millis(OffsetDateTime::now_utc())
}
