//! Screen-to-world ray casting against loaded geometry

use bevy_math::{Mat4, Quat, Vec2, Vec3, Vec4Swizzles};

use crate::asset::LoadedAsset;

const TRIANGLE_EPSILON: f32 = 1e-7;

/// Size of the drawing surface in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Closest intersection of a pick ray with the model surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub point: Vec3,
    /// Ray parameter at the hit, equal to the distance from the camera
    pub distance: f32,
    /// Index of the triangle in `LoadedAsset::world_triangles` order
    pub triangle: usize,
}

/// Canvas-local pixel coordinates to normalized device coordinates, y up
pub fn pixel_to_ndc(pointer: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(
        pointer.x / viewport.width * 2.0 - 1.0,
        -(pointer.y / viewport.height * 2.0 - 1.0),
    )
}

/// A perspective camera detached from any rendering backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraView {
    /// Camera at `eye` looking at `target` with +Y up
    pub fn looking_at(eye: Vec3, target: Vec3, fov_y: f32, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self {
            position: eye,
            rotation,
            fov_y,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Unit direction of the ray from the camera through an NDC point
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Vec3 {
        let inverse = (self.projection_matrix() * self.view_matrix()).inverse();
        let far = inverse.project_point3(ndc.extend(0.5));
        let direction = (far - self.position).normalize_or_zero();
        if direction == Vec3::ZERO {
            self.forward()
        } else {
            direction
        }
    }

    /// World point to NDC; `None` when the point is behind the camera
    pub fn project(&self, point: Vec3) -> Option<Vec3> {
        let clip = self.projection_matrix() * self.view_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(clip.xyz() / clip.w)
    }

    /// Distance from the camera along its view axis
    pub fn depth_of(&self, point: Vec3) -> f32 {
        (point - self.position).dot(self.forward())
    }
}

/// Möller–Trumbore ray/triangle intersection, returning the ray parameter
pub fn ray_triangle(origin: Vec3, direction: Vec3, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < TRIANGLE_EPSILON {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > TRIANGLE_EPSILON).then_some(t)
}

/// Nearest positive ray parameter at which the ray enters a sphere
pub fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let direction = direction.normalize_or_zero();
    if direction == Vec3::ZERO {
        return None;
    }

    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_d = discriminant.sqrt();
    let near = -b - sqrt_d;
    let far = -b + sqrt_d;
    if near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Cast a ray through `pointer` and return the closest surface hit.
///
/// Ties keep the earlier triangle.
pub fn pick_surface(
    view: &CameraView,
    pointer: Vec2,
    viewport: Viewport,
    asset: &LoadedAsset,
) -> Option<PickHit> {
    if viewport.is_degenerate() {
        return None;
    }

    let ndc = pixel_to_ndc(pointer, viewport);
    let origin = view.position;
    let direction = view.ray_through_ndc(ndc);

    let mut best: Option<PickHit> = None;
    for (triangle, tri) in asset.world_triangles().enumerate() {
        let Some(t) = ray_triangle(origin, direction, tri) else {
            continue;
        };
        if best.is_none_or(|b| t < b.distance) {
            best = Some(PickHit {
                point: origin + direction * t,
                distance: t,
                triangle,
            });
        }
    }

    if let Some(hit) = &best {
        tracing::debug!(point = ?hit.point, triangle = hit.triangle, "Surface pick hit");
    }
    best
}
