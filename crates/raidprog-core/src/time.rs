//! Millisecond offsets and wall-clock conversion.

use chrono::{DateTime, TimeDelta, Utc};

/// Converts a millisecond count to fractional seconds.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn ms_to_secs(ms: i64) -> f64 {
    ms as f64 / 1000.0
}

/// Session start timestamp from milliseconds since the Unix epoch.
#[must_use]
pub fn timestamp_from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

/// Wall-clock time `offset_ms` after `base`, saturating at `base` on overflow.
#[must_use]
pub fn at_offset(base: DateTime<Utc>, offset_ms: i64) -> DateTime<Utc> {
    TimeDelta::try_milliseconds(offset_ms)
        .and_then(|delta| base.checked_add_signed(delta))
        .unwrap_or(base)
}
