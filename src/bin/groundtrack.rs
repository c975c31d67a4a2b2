//! Prints current positions and orbit descriptors for a TLE file.
//!
//! Usage: groundtrack <tle-file> [satellite-id]
//!
//! With an id, also prints that satellite's descriptors and sampled orbit.

use chrono::Utc;

use globetrack::geo::sphere_to_lon_lat;
use globetrack::{LoadOutcome, TrackingSession, DEFAULT_PATH_RESOLUTION};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: groundtrack <tle-file> [satellite-id]")?;
    let show_orbit = args.next();

    let text = std::fs::read_to_string(&path)?;
    let now = Utc::now();

    let mut session = TrackingSession::new();
    match session.load(&text, now) {
        LoadOutcome::Loaded(count) => println!("Tracking {count} objects at {now}\n"),
        LoadOutcome::Failed(e) => return Err(e.into()),
        LoadOutcome::Stale => unreachable!("synchronous load"),
    }

    println!(
        "{:<8} {:<24} {:>9} {:>9} {:>9} {:>8} {:>9}",
        "ID", "NAME", "LAT", "LON", "ALT KM", "KM/S", "PERIOD"
    );
    for obj in session.objects() {
        let fix = &obj.true_position;
        println!(
            "{:<8} {:<24} {:>9.4} {:>9.4} {:>9.1} {:>8.3} {:>8.1}m",
            obj.id,
            obj.name,
            fix.lat,
            fix.lon,
            fix.altitude_km,
            fix.velocity_km_s,
            obj.stats().period_minutes,
        );
    }

    if let Some(id) = show_orbit {
        let obj = session
            .object(&id)
            .ok_or_else(|| format!("no tracked object with id {id}"))?;
        let stats = obj.stats();
        println!("\n{} ({})", obj.name, obj.id);
        println!("  semi-major axis {:.1} km", stats.semi_major_axis_km);
        println!("  apogee          {:.1} km", stats.apogee_km);
        println!("  perigee         {:.1} km", stats.perigee_km);
        println!("  eccentricity    {:.6}", stats.eccentricity);
        println!("  inclination     {:.3}°", stats.inclination_deg);
        println!("  RAAN            {:.3}°", stats.raan_deg);
        println!("  arg of perigee  {:.3}°", stats.arg_perigee_deg);
        println!("  mean anomaly    {:.3}°", stats.mean_anomaly_deg);
        println!("  mean motion     {:.4} rev/day", stats.mean_motion_rev_per_day);

        let orbit = session
            .orbit_path(&id, now, 1.0, DEFAULT_PATH_RESOLUTION)
            .unwrap_or_default();
        println!("  orbit path: {} sampled points", orbit.len());
        if let Some(p) = orbit.first() {
            let (lon, lat) = sphere_to_lon_lat(*p);
            println!("  first sample at lon {lon:.3}°, lat {lat:.3}°");
        }
    }

    Ok(())
}
