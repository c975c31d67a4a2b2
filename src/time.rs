//! Time and astronomical calculations.
//!
//! Provides the Greenwich Mean Sidereal Time (GMST) angle used to rotate
//! inertial-frame satellite positions into Earth-fixed coordinates.

use chrono::{DateTime, TimeZone, Utc};

pub const SECONDS_PER_DAY: f64 = 86400.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
pub const GMST_BASE_DEG: f64 = 280.46061837;
pub const GMST_ROTATION_PER_DAY: f64 = 360.98564736629;
pub const GMST_CORRECTION: f64 = 0.000387933;

/// J2000.0 reference epoch: 2000-01-01 12:00:00 UTC.
fn j2000() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap()
}

/// Greenwich Mean Sidereal Time in radians, normalized to [0, 2π).
pub fn greenwich_mean_sidereal_time(timestamp: DateTime<Utc>) -> f64 {
    let days_since_j2000 =
        (timestamp - j2000()).num_milliseconds() as f64 / (1000.0 * SECONDS_PER_DAY);
    let centuries = days_since_j2000 / DAYS_PER_JULIAN_CENTURY;
    let gmst_degrees = GMST_BASE_DEG
        + GMST_ROTATION_PER_DAY * days_since_j2000
        + GMST_CORRECTION * centuries * centuries
        - centuries * centuries * centuries / 38710000.0;
    gmst_degrees.rem_euclid(360.0).to_radians()
}

/// Minutes since the Unix epoch, the propagation clock used throughout.
pub fn datetime_to_minutes(dt: DateTime<Utc>) -> f64 {
    dt.timestamp_millis() as f64 / 60_000.0
}
