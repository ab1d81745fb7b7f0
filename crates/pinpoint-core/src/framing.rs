//! Fit-to-view framing for a freshly loaded model

use bevy_math::Vec3;

use crate::bounds::Aabb;
use crate::camera::CameraTarget;

/// Smallest fitting distance used for degenerate (flat or point) bounds
pub const MIN_FIT_DISTANCE: f32 = 0.1;

/// Camera placement that keeps the whole model in view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub eye: Vec3,
    pub look_at: Vec3,
    /// Distance at which the bounding sphere exactly fits the vertical field of view
    pub fit_distance: f32,
}

impl Framing {
    pub fn camera_target(&self) -> CameraTarget {
        CameraTarget::new(self.eye, self.look_at)
    }
}

/// Frame `bounds` for a camera with vertical field of view `fov_y` (radians).
///
/// The camera sits on the +Z axis through the bounds center at
/// `margin * max_half_extent / sin(fov_y / 2)`.
pub fn frame_bounds(bounds: &Aabb, fov_y: f32, margin: f32) -> Framing {
    let center = if bounds.is_empty() {
        Vec3::ZERO
    } else {
        bounds.center()
    };
    let half_angle = (fov_y * 0.5).clamp(1e-3, std::f32::consts::FRAC_PI_2);
    let fit_distance = (bounds.max_half_extent() / half_angle.sin()).max(MIN_FIT_DISTANCE);

    Framing {
        eye: center + Vec3::Z * fit_distance * margin,
        look_at: center,
        fit_distance,
    }
}
