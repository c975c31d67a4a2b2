//! Tracking session: the authoritative satellite set and its two-rate loop.
//!
//! A session owns every tracked object and runs two independently clocked
//! updates from the host's per-frame callback: a low-cadence propagation
//! sweep that recomputes true positions, and a per-frame interpolation step
//! that eases displayed positions toward them. Propagation always runs before
//! interpolation within a tick, so the renderer never sees a frame where the
//! displayed set chases stale targets.

use chrono::{DateTime, Utc};

use crate::error::ParseError;
use crate::geo::{normalize_lon, project};
use crate::orbit::sample_path;
use crate::pick::SelectionState;
use crate::propagator::{propagate_geodetic, GeoFix};
use crate::tle::{parse_element_sets, ElementRecord, OrbitStats};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    Empty,
    Loading,
    Ready,
    Disposed,
}

/// The smoothed position the renderer actually draws.
#[derive(Clone, Copy, Debug)]
pub struct DisplayedPosition {
    pub lon: f64,
    pub lat: f64,
    pub altitude_km: f64,
}

/// One satellite under tracking.
///
/// `true_position` is written only by the propagation sweep; `displayed` only
/// by the interpolation step. External callers read both, never write.
pub struct TrackedObject {
    pub id: String,
    pub name: String,
    record: ElementRecord,
    pub true_position: GeoFix,
    pub displayed: DisplayedPosition,
}

impl TrackedObject {
    pub fn stats(&self) -> &OrbitStats {
        &self.record.stats
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Wall-clock gate between authoritative propagation sweeps.
    pub propagation_interval_ms: i64,
    /// Fraction of the remaining gap closed per interpolation step.
    pub ease_factor: f64,
    /// Angular distance below which a displayed position snaps onto the true
    /// one, so the exponential ease actually terminates.
    pub snap_epsilon_deg: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            propagation_interval_ms: 500,
            ease_factor: 1.0 / 60.0,
            snap_epsilon_deg: 1e-7,
        }
    }
}

/// Per-frame render description of one tracked point.
#[derive(Clone, Debug)]
pub struct RenderPoint {
    pub id: String,
    pub position: [f64; 3],
    pub hovered: bool,
    pub selected: bool,
}

/// Liveness token for an asynchronous load; results carrying a stale token
/// are dropped.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LoadToken(u64);

#[derive(Debug)]
pub enum LoadOutcome {
    /// Batch installed, with the number of objects now tracked.
    Loaded(usize),
    /// Nothing usable in the batch; the session stays in `Loading`.
    Failed(ParseError),
    /// Token was superseded or the session was disposed; nothing was touched.
    Stale,
}

pub struct TrackingSession {
    config: SessionConfig,
    state: SessionState,
    objects: Vec<TrackedObject>,
    load_generation: u64,
    last_propagation: Option<DateTime<Utc>>,
    render_scratch: Vec<RenderPoint>,
}

impl Default for TrackingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingSession {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Empty,
            objects: Vec::new(),
            load_generation: 0,
            last_propagation: None,
            render_scratch: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn objects(&self) -> &[TrackedObject] {
        &self.objects
    }

    pub fn object(&self, id: &str) -> Option<&TrackedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Starts a load and returns the token the eventual result must present.
    ///
    /// Calling this again before the previous load finishes supersedes it.
    pub fn begin_load(&mut self) -> LoadToken {
        if self.state != SessionState::Disposed {
            self.state = SessionState::Loading;
        }
        self.load_generation += 1;
        LoadToken(self.load_generation)
    }

    /// Applies a finished parse, running the initial propagation sweep
    /// synchronously so the first rendered frame has real positions.
    ///
    /// Objects that cannot be propagated at `now` are dropped (logged), so
    /// every tracked object always carries a valid fix.
    pub fn finish_load(
        &mut self,
        token: LoadToken,
        parsed: Result<Vec<ElementRecord>, ParseError>,
        now: DateTime<Utc>,
    ) -> LoadOutcome {
        if self.state == SessionState::Disposed || token.0 != self.load_generation {
            return LoadOutcome::Stale;
        }
        let records = match parsed {
            Ok(records) => records,
            Err(e) => return LoadOutcome::Failed(e),
        };

        self.objects.clear();
        for record in records {
            match propagate_geodetic(&record, now) {
                Ok(fix) => self.objects.push(TrackedObject {
                    id: record.id.clone(),
                    name: record.name.clone(),
                    record,
                    true_position: fix,
                    displayed: DisplayedPosition {
                        lon: fix.lon,
                        lat: fix.lat,
                        altitude_km: fix.altitude_km,
                    },
                }),
                Err(e) => {
                    log::warn!("dropping {} ({}): no valid initial fix: {e}", record.id, record.name);
                }
            }
        }

        self.last_propagation = Some(now);
        self.state = SessionState::Ready;
        LoadOutcome::Loaded(self.objects.len())
    }

    /// Synchronous convenience for hosts that parse on the calling thread.
    pub fn load(&mut self, text: &str, now: DateTime<Utc>) -> LoadOutcome {
        let token = self.begin_load();
        self.finish_load(token, parse_element_sets(text), now)
    }

    /// One animation-frame step: the gated propagation sweep (at most once per
    /// `propagation_interval_ms` of wall-clock time), then the interpolation
    /// step. No-op unless the session is `Ready`.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.state != SessionState::Ready {
            return;
        }
        let due = self
            .last_propagation
            .is_none_or(|t| (now - t).num_milliseconds() >= self.config.propagation_interval_ms);
        if due {
            self.propagation_sweep(now);
            self.last_propagation = Some(now);
        }
        self.interpolation_step();
    }

    /// Recomputes every object's true position at `now`. A per-object failure
    /// keeps its previous fix: a frozen satellite beats a vanishing one.
    fn propagation_sweep(&mut self, now: DateTime<Utc>) {
        for obj in &mut self.objects {
            match propagate_geodetic(&obj.record, now) {
                Ok(fix) => obj.true_position = fix,
                Err(e) => log::debug!("{} holding stale fix: {e}", obj.id),
            }
        }
    }

    /// Eases each displayed position toward its true position along the
    /// shortest angular path, snapping once within `snap_epsilon_deg`.
    fn interpolation_step(&mut self) {
        let ease = self.config.ease_factor;
        let snap = self.config.snap_epsilon_deg;
        for obj in &mut self.objects {
            let truth = &obj.true_position;
            let disp = &mut obj.displayed;

            let mut d_lon = truth.lon - disp.lon;
            if d_lon > 180.0 {
                d_lon -= 360.0;
            } else if d_lon < -180.0 {
                d_lon += 360.0;
            }
            let d_lat = truth.lat - disp.lat;
            let d_alt = truth.altitude_km - disp.altitude_km;

            if d_lon.abs() <= snap && d_lat.abs() <= snap {
                disp.lon = truth.lon;
                disp.lat = truth.lat;
                disp.altitude_km = truth.altitude_km;
            } else {
                disp.lon = normalize_lon(disp.lon + d_lon * ease);
                disp.lat = (disp.lat + d_lat * ease).clamp(-90.0, 90.0);
                disp.altitude_km += d_alt * ease;
            }
        }
    }

    /// Projects the displayed set for rendering, reusing the session-owned
    /// scratch buffer. Hover/selection flags come from `selection`.
    pub fn render_points(&mut self, radius: f64, selection: &SelectionState) -> &[RenderPoint] {
        self.render_scratch.resize_with(self.objects.len(), || RenderPoint {
            id: String::new(),
            position: [0.0; 3],
            hovered: false,
            selected: false,
        });
        for (slot, obj) in self.render_scratch.iter_mut().zip(&self.objects) {
            slot.id.clone_from(&obj.id);
            slot.position = project(obj.displayed.lon, obj.displayed.lat, radius);
            slot.hovered = selection.hovered.as_deref() == Some(obj.id.as_str());
            slot.selected = selection.selected.as_deref() == Some(obj.id.as_str());
        }
        &self.render_scratch
    }

    /// The "show orbit" request: sample one period of the identified object's
    /// trajectory for line-strip rendering.
    pub fn orbit_path(
        &self,
        id: &str,
        base_time: DateTime<Utc>,
        radius: f64,
        resolution: usize,
    ) -> Option<Vec<[f64; 3]>> {
        self.object(id)
            .map(|obj| sample_path(&obj.record, base_time, radius, resolution))
    }

    /// Tears the session down: no further ticks run, and any in-flight load
    /// result is dropped when it arrives.
    pub fn dispose(&mut self) {
        self.state = SessionState::Disposed;
        self.load_generation += 1;
        self.last_propagation = None;
    }
}
