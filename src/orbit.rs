//! Orbit path sampling for the selected satellite.

use chrono::{DateTime, Duration, Utc};

use crate::geo::project;
use crate::propagator::propagate_geodetic;
use crate::tle::ElementRecord;

/// Default number of segments sampled across one orbital period.
pub const DEFAULT_PATH_RESOLUTION: usize = 100;

/// A partial orbit is worse than none: below this many surviving samples the
/// path is dropped entirely.
pub const MIN_PATH_POINTS: usize = 10;

/// Samples one full orbital period starting at `base_time`, returning points
/// on a sphere of `radius` ready for line-strip rendering.
///
/// Samples whose propagation fails are skipped individually; if fewer than
/// [`MIN_PATH_POINTS`] survive, the whole path is empty.
pub fn sample_path(
    record: &ElementRecord,
    base_time: DateTime<Utc>,
    radius: f64,
    resolution: usize,
) -> Vec<[f64; 3]> {
    let period_ms = record.stats.period_minutes * 60_000.0;
    let mut points = Vec::with_capacity(resolution + 1);

    for i in 0..=resolution {
        let offset_ms = period_ms * i as f64 / resolution as f64;
        let at = base_time + Duration::milliseconds(offset_ms as i64);
        let fix = match propagate_geodetic(record, at) {
            Ok(fix) => fix,
            Err(e) => {
                log::debug!("orbit sample {i} for {} skipped: {e}", record.id);
                continue;
            }
        };
        let p = project(fix.lon, fix.lat, radius);
        if p.iter().all(|v| v.is_finite()) {
            points.push(p);
        }
    }

    if points.len() < MIN_PATH_POINTS {
        log::warn!(
            "orbit path for {} has only {} valid points, dropping it",
            record.id,
            points.len()
        );
        return Vec::new();
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::sphere_to_lon_lat;
    use crate::tle::{parse_element_sets, test_data::ISS_TLE};
    use chrono::TimeZone;

    fn iss() -> ElementRecord {
        parse_element_sets(ISS_TLE).unwrap().remove(0)
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2008, 9, 20, 12, 25, 40).unwrap()
    }

    #[test]
    fn full_resolution_path_covers_the_orbit() {
        let record = iss();
        let path = sample_path(&record, base(), 2.0, DEFAULT_PATH_RESOLUTION);
        assert_eq!(path.len(), DEFAULT_PATH_RESOLUTION + 1);
        for p in &path {
            let r = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((r - 2.0).abs() < 1e-9);
            let (lon, lat) = sphere_to_lon_lat(*p);
            assert!(lon.abs() <= 180.0 && lat.abs() <= 90.0);
            assert!(lat.abs() <= record.stats.inclination_deg + 0.5);
        }
    }

    #[test]
    fn sparse_sampling_falls_below_the_minimum_and_is_dropped() {
        let record = iss();
        let path = sample_path(&record, base(), 2.0, 5);
        assert!(path.is_empty());
    }
}
