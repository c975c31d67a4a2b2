//! Two-Line Element (TLE) parsing.
//!
//! Scans element-set text in repeating 3-line groups (name, line 1, line 2),
//! builds SGP4 propagation constants for each entry, and derives the orbit
//! descriptors shown alongside a tracked satellite.

use std::collections::HashSet;

use sgp4::Constants;

use crate::error::ParseError;
use crate::time::{datetime_to_minutes, SECONDS_PER_DAY};

pub const MINUTES_PER_DAY: f64 = 1440.0;

/// WGS-72 values, matching the geopotential model behind SGP4.
pub const EARTH_MU_KM3_S2: f64 = 398600.8;
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.135;
pub const EARTH_FLATTENING: f64 = 1.0 / 298.26;

/// Orbit descriptors derived once from an element set.
#[derive(Clone, Copy, Debug)]
pub struct OrbitStats {
    pub period_minutes: f64,
    pub semi_major_axis_km: f64,
    pub apogee_km: f64,
    pub perigee_km: f64,
    pub mean_altitude_km: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub raan_deg: f64,
    pub arg_perigee_deg: f64,
    pub mean_anomaly_deg: f64,
    pub mean_motion_rev_per_day: f64,
}

impl OrbitStats {
    fn from_elements(elements: &sgp4::Elements) -> Self {
        let mean_motion = elements.mean_motion;
        let n_rad_s = mean_motion * 2.0 * std::f64::consts::PI / SECONDS_PER_DAY;
        let semi_major = (EARTH_MU_KM3_S2 / (n_rad_s * n_rad_s)).powf(1.0 / 3.0);
        let ecc = elements.eccentricity;
        Self {
            period_minutes: MINUTES_PER_DAY / mean_motion,
            semi_major_axis_km: semi_major,
            apogee_km: semi_major * (1.0 + ecc),
            perigee_km: semi_major * (1.0 - ecc),
            mean_altitude_km: semi_major - EARTH_EQUATORIAL_RADIUS_KM,
            eccentricity: ecc,
            inclination_deg: elements.inclination,
            raan_deg: elements.right_ascension,
            arg_perigee_deg: elements.argument_of_perigee,
            mean_anomaly_deg: elements.mean_anomaly,
            mean_motion_rev_per_day: mean_motion,
        }
    }
}

/// One parsed element set, immutable for the lifetime of a load.
#[derive(Clone)]
pub struct ElementRecord {
    /// Catalog number, unique within a batch.
    pub id: String,
    pub name: String,
    pub constants: Constants,
    pub epoch_minutes: f64,
    pub stats: OrbitStats,
}

/// Parses element-set text into records.
///
/// Malformed groups are logged and skipped; a trailing partial group ends the
/// scan cleanly. Duplicate catalog numbers keep the first occurrence. Only a
/// batch with zero usable entries is an error.
pub fn parse_element_sets(text: &str) -> Result<Vec<ElementRecord>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    let mut i = 0;
    while i + 2 < lines.len() {
        let name_line = lines[i].trim();
        let line1 = lines[i + 1].trim();
        let line2 = lines[i + 2].trim();

        if !line1.starts_with('1') || !line2.starts_with('2') {
            i += 1;
            continue;
        }

        let group = format!("{}\n{}\n{}", name_line, line1, line2);
        match sgp4::parse_3les(&group) {
            Ok(elements_vec) => {
                for elements in elements_vec {
                    let id = elements.norad_id.to_string();
                    if !seen_ids.insert(id.clone()) {
                        log::warn!("duplicate catalog id {id}, keeping first entry");
                        continue;
                    }
                    match Constants::from_elements(&elements) {
                        Ok(constants) => {
                            let epoch_minutes =
                                datetime_to_minutes(elements.datetime.and_utc());
                            records.push(ElementRecord {
                                id,
                                name: elements
                                    .object_name
                                    .clone()
                                    .unwrap_or_else(|| name_line.to_string()),
                                constants,
                                epoch_minutes,
                                stats: OrbitStats::from_elements(&elements),
                            });
                        }
                        Err(e) => {
                            log::warn!("unusable element set {id}: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                log::warn!("skipping malformed element group at line {}: {e}", i + 1);
            }
        }

        i += 3;
    }

    if records.is_empty() {
        Err(ParseError::NoValidEntries)
    } else {
        Ok(records)
    }
}
