//! Date conversions
//!
//! Two numeric encodings of a point in time are used by the codec:
//! - OLE automation serials: fractional days since 1899-12-30, the form
//!   worksheet cells store dates in (1900 date system only)
//! - ticks: 100-nanosecond intervals since 0001-01-01T00:00:00, the form
//!   numeric coercions of date values produce

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const TICKS_PER_SECOND: i64 = 10_000_000;

fn ole_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Midnight of 0001-01-01, the zero point of tick counts
pub fn tick_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Convert a date-time to an OLE automation serial
pub fn to_ole_serial(dt: NaiveDateTime) -> f64 {
    let millis = dt.signed_duration_since(ole_epoch()).num_milliseconds();
    millis as f64 / MILLIS_PER_DAY
}

/// Convert an OLE automation serial back to a date-time
///
/// The result is rounded to the nearest millisecond. Returns `None` for
/// non-finite serials or ones outside the representable range.
pub fn from_ole_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * MILLIS_PER_DAY).round();
    if millis.abs() > i64::MAX as f64 / 2.0 {
        return None;
    }
    ole_epoch().checked_add_signed(Duration::milliseconds(millis as i64))
}

/// Convert a date-time to ticks
pub fn to_ticks(dt: NaiveDateTime) -> i64 {
    let elapsed = dt.signed_duration_since(tick_epoch());
    let seconds = elapsed.num_seconds();
    let nanos = (elapsed - Duration::seconds(seconds)).num_nanoseconds().unwrap_or(0);
    seconds * TICKS_PER_SECOND + nanos / 100
}

/// Convert ticks back to a date-time
pub fn from_ticks(ticks: i64) -> Option<NaiveDateTime> {
    let seconds = ticks.div_euclid(TICKS_PER_SECOND);
    let rest = ticks.rem_euclid(TICKS_PER_SECOND);
    tick_epoch()
        .checked_add_signed(Duration::seconds(seconds))?
        .checked_add_signed(Duration::nanoseconds(rest * 100))
}
