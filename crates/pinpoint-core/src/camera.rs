//! Camera targets and orbit pose math

use bevy_math::Vec3;

/// Elevation is kept shy of the poles so the up vector stays well defined
pub const MAX_ELEVATION: f32 = 1.5;

/// A camera position together with the point it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraTarget {
    pub eye: Vec3,
    pub look_at: Vec3,
}

impl CameraTarget {
    pub fn new(eye: Vec3, look_at: Vec3) -> Self {
        Self { eye, look_at }
    }

    pub fn distance(&self) -> f32 {
        self.eye.distance(self.look_at)
    }
}

/// Spherical camera pose around a focus point.
///
/// Azimuth is measured around +Y starting from +Z, elevation from the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitPose {
    pub target: Vec3,
    pub distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
}

impl OrbitPose {
    pub fn from_eye_target(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Self {
                target,
                distance: 0.0,
                azimuth: 0.0,
                elevation: 0.0,
            };
        }

        let elevation = (offset.y / distance)
            .clamp(-1.0, 1.0)
            .asin()
            .clamp(-MAX_ELEVATION, MAX_ELEVATION);
        let azimuth = offset.x.atan2(offset.z);

        Self {
            target,
            distance,
            azimuth,
            elevation,
        }
    }

    pub fn from_camera_target(target: CameraTarget) -> Self {
        Self::from_eye_target(target.eye, target.look_at)
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        self.target + Vec3::new(cos_el * sin_az, sin_el, cos_el * cos_az) * self.distance
    }

    /// Apply a drag delta in radians, clamping elevation
    pub fn rotate(&mut self, delta_azimuth: f32, delta_elevation: f32) {
        self.azimuth += delta_azimuth;
        self.elevation = (self.elevation + delta_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Scale the distance multiplicatively, keeping it inside `[min, max]`
    pub fn zoom(&mut self, factor: f32, min: f32, max: f32) {
        self.distance = (self.distance * factor).clamp(min, max);
    }
}
