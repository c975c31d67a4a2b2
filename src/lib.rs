//! Satellite tracking core for an interactive 3D globe.
//!
//! Turns two-line element sets into time-evolving geodetic positions,
//! projects geography and satellites onto a sphere, densifies boundary
//! polygons for on-sphere line rendering, and runs the slow-propagation /
//! fast-interpolation loop that keeps hundreds of markers moving smoothly.
//! Rendering, UI, and asset fetching are left to the host.

pub mod error;
pub mod geo;
pub mod orbit;
pub mod pick;
pub mod propagator;
pub mod session;
pub mod time;
pub mod tle;

pub use error::{BoundaryError, ParseError, PropagationError};
pub use geo::{boundary_lines, densify, parse_boundaries, project, GeoPoint, DENSIFY_MAX_DELTA_DEG};
pub use orbit::{sample_path, DEFAULT_PATH_RESOLUTION, MIN_PATH_POINTS};
pub use pick::{pick, PickCamera, SelectionState, DEFAULT_PICK_TOLERANCE};
pub use propagator::{propagate_geodetic, GeoFix};
pub use session::{
    DisplayedPosition, LoadOutcome, LoadToken, RenderPoint, SessionConfig, SessionState,
    TrackedObject, TrackingSession,
};
pub use time::greenwich_mean_sidereal_time;
pub use tle::{parse_element_sets, ElementRecord, OrbitStats};
