//! SGP4 propagation and inertial-to-geodetic conversion.

use chrono::{DateTime, Utc};

use crate::error::PropagationError;
use crate::geo::normalize_lon;
use crate::time::{datetime_to_minutes, greenwich_mean_sidereal_time};
use crate::tle::{ElementRecord, EARTH_EQUATORIAL_RADIUS_KM, EARTH_FLATTENING};

const GEODETIC_ITERATIONS: usize = 20;

/// A propagated geodetic position, degrees / km / km-per-second.
#[derive(Clone, Copy, Debug)]
pub struct GeoFix {
    pub lon: f64,
    pub lat: f64,
    pub altitude_km: f64,
    pub velocity_km_s: f64,
}

/// Propagates one record to `at` and converts to geodetic coordinates.
///
/// Any numerically suspect output (model error, NaN, out-of-range angle) is
/// returned as a [`PropagationError`] value so a failing satellite never
/// aborts the rest of a batch sweep.
pub fn propagate_geodetic(
    record: &ElementRecord,
    at: DateTime<Utc>,
) -> Result<GeoFix, PropagationError> {
    let minutes_since_epoch = datetime_to_minutes(at) - record.epoch_minutes;
    let prediction = record
        .constants
        .propagate(sgp4::MinutesSinceEpoch(minutes_since_epoch))
        .map_err(|e| PropagationError::Model(e.to_string()))?;

    let [x, y, z] = prediction.position;
    let [vx, vy, vz] = prediction.velocity;
    let velocity_km_s = (vx * vx + vy * vy + vz * vz).sqrt();

    let gmst = greenwich_mean_sidereal_time(at);
    let (lon, lat, altitude_km) = teme_to_geodetic(x, y, z, gmst);

    if !lon.is_finite() || !lat.is_finite() || !altitude_km.is_finite() || !velocity_km_s.is_finite()
    {
        return Err(PropagationError::NonFinite);
    }
    // Rejected, not clamped: an angle outside its domain means the math went
    // wrong upstream.
    if lat.abs() > 90.0 || lon.abs() > 180.0 {
        return Err(PropagationError::OutOfRange { lon, lat });
    }

    Ok(GeoFix {
        lon,
        lat,
        altitude_km,
        velocity_km_s,
    })
}

/// TEME position (km) to geodetic longitude/latitude (degrees) and altitude
/// (km), rotating by GMST and iterating the standard flattening correction.
fn teme_to_geodetic(x: f64, y: f64, z: f64, gmst: f64) -> (f64, f64, f64) {
    let lon = normalize_lon((y.atan2(x) - gmst).to_degrees());

    let r = (x * x + y * y).sqrt();
    let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);
    let mut lat = z.atan2(r);
    let mut c = 1.0;
    for _ in 0..GEODETIC_ITERATIONS {
        let sin_lat = lat.sin();
        c = 1.0 / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let next = (z + EARTH_EQUATORIAL_RADIUS_KM * c * e2 * sin_lat).atan2(r);
        if (next - lat).abs() < 1e-12 {
            lat = next;
            break;
        }
        lat = next;
    }
    let altitude_km = r / lat.cos() - EARTH_EQUATORIAL_RADIUS_KM * c;

    (lon, lat.to_degrees(), altitude_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::{parse_element_sets, test_data::ISS_TLE};
    use chrono::TimeZone;

    fn iss() -> ElementRecord {
        parse_element_sets(ISS_TLE).unwrap().remove(0)
    }

    fn epoch() -> DateTime<Utc> {
        // 2008 day-of-year 264.51782528
        Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap()
    }

    #[test]
    fn fix_at_epoch_is_finite_and_in_range() {
        let fix = propagate_geodetic(&iss(), epoch()).unwrap();
        assert!(fix.lon.is_finite() && fix.lat.is_finite());
        assert!(fix.lon.abs() <= 180.0);
        assert!(fix.lat.abs() <= 90.0);
        // LEO altitude band and orbital speed
        assert!(fix.altitude_km > 250.0 && fix.altitude_km < 500.0, "{}", fix.altitude_km);
        assert!(fix.velocity_km_s > 7.0 && fix.velocity_km_s < 8.5);
    }

    #[test]
    fn latitude_stays_below_the_inclination() {
        let record = iss();
        let inc = record.stats.inclination_deg;
        for minutes in (0..120).step_by(7) {
            let at = epoch() + chrono::Duration::minutes(minutes);
            let fix = propagate_geodetic(&record, at).unwrap();
            assert!(fix.lat.abs() <= inc + 0.5, "lat {} at {minutes} min", fix.lat);
        }
    }

    #[test]
    fn propagation_is_deterministic() {
        let record = iss();
        let at = epoch() + chrono::Duration::minutes(42);
        let a = propagate_geodetic(&record, at).unwrap();
        let b = propagate_geodetic(&record, at).unwrap();
        assert_eq!(a.lon, b.lon);
        assert_eq!(a.lat, b.lat);
        assert_eq!(a.altitude_km, b.altitude_km);
    }

    #[test]
    fn ground_track_drifts_westward_over_one_period() {
        // Earth rotates under the orbit: after one full revolution the
        // longitude must have shifted west by roughly period * 0.25°/min.
        let record = iss();
        let period = record.stats.period_minutes;
        let start = propagate_geodetic(&record, epoch()).unwrap();
        let later = propagate_geodetic(
            &record,
            epoch() + chrono::Duration::milliseconds((period * 60_000.0) as i64),
        )
        .unwrap();
        let mut drift = later.lon - start.lon;
        if drift > 180.0 {
            drift -= 360.0;
        }
        if drift < -180.0 {
            drift += 360.0;
        }
        let expected = -period * 360.0 / (24.0 * 60.0);
        assert!((drift - expected).abs() < 3.0, "drift {drift}, expected {expected}");
    }

    #[test]
    fn geodetic_conversion_handles_the_equatorial_plane() {
        let gmst = 0.0;
        let (lon, lat, alt) = teme_to_geodetic(EARTH_EQUATORIAL_RADIUS_KM + 400.0, 0.0, 0.0, gmst);
        assert!((lon - 0.0).abs() < 1e-9);
        assert!(lat.abs() < 1e-9);
        assert!((alt - 400.0).abs() < 1e-6);
    }
}
