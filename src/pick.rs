use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::session::RenderPoint;

/// Default screen-space pick tolerance in NDC units.
pub const DEFAULT_PICK_TOLERANCE: f64 = 0.02;

/// Hover and selection identity, mutated only through the handlers below and
/// read by the session when it builds render points.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub hovered: Option<String>,
    pub selected: Option<String>,
}

impl SelectionState {
    /// Pointer moved: update hover. Returns true when the hovered id changed.
    pub fn on_pointer_move(&mut self, hit: Option<&str>) -> bool {
        let next = hit.map(str::to_string);
        if next != self.hovered {
            self.hovered = next;
            true
        } else {
            false
        }
    }

    /// Click: update the selection. A click that hits nothing leaves the
    /// current selection alone. Returns true when the selection changed.
    pub fn on_click(&mut self, hit: Option<&str>) -> bool {
        match hit {
            Some(id) if self.selected.as_deref() != Some(id) => {
                self.selected = Some(id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Pointer left the interactive surface: hover is always cleared, even if
    /// the final move events were dropped.
    pub fn on_pointer_leave(&mut self) {
        self.hovered = None;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

/// Camera state needed for the screen-space fallback hit test.
pub struct PickCamera {
    pub view_proj: Matrix4<f64>,
}

impl PickCamera {
    pub fn new(view_proj: Matrix4<f64>) -> Self {
        Self { view_proj }
    }

    pub fn look_at_perspective(
        eye: Point3<f64>,
        target: Point3<f64>,
        up: Vector3<f64>,
        fov_y: f64,
        aspect: f64,
        near: f64,
        far: f64,
    ) -> Self {
        let view = Matrix4::look_at_rh(&eye, &target, &up);
        let proj = nalgebra::Perspective3::new(aspect, fov_y, near, far);
        Self {
            view_proj: proj.as_matrix() * view,
        }
    }

    /// Projects a world point to normalized device coordinates, or None when
    /// the point is behind the camera.
    pub fn project_ndc(&self, p: [f64; 3]) -> Option<[f64; 2]> {
        let clip = self.view_proj * Vector4::new(p[0], p[1], p[2], 1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some([clip.x / clip.w, clip.y / clip.w])
    }
}

/// Screen-space fallback hit test: the tracked point nearest the pointer in
/// NDC wins, if within `tolerance`. Ties break on distance, then on the
/// lowest id so repeated picks are deterministic.
///
/// The primary strategy, an exact instance hit reported by the renderer,
/// bypasses this entirely: feed that id straight into
/// [`SelectionState::on_pointer_move`] or [`SelectionState::on_click`].
pub fn pick<'a>(
    pointer_ndc: [f64; 2],
    camera: &PickCamera,
    points: &'a [RenderPoint],
    tolerance: f64,
) -> Option<&'a RenderPoint> {
    let mut best: Option<(f64, &RenderPoint)> = None;
    for point in points {
        let Some(ndc) = camera.project_ndc(point.position) else {
            continue;
        };
        let dx = ndc[0] - pointer_ndc[0];
        let dy = ndc[1] - pointer_ndc[1];
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > tolerance {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_dist, best_point)) => {
                dist < best_dist || (dist == best_dist && point.id < best_point.id)
            }
        };
        if closer {
            best = Some((dist, point));
        }
    }
    best.map(|(_, point)| point)
}
