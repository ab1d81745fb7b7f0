//! Label placement and billboard orientation

use bevy_math::{Mat3, Quat, Vec3};

use crate::asset::LoadedAsset;
use crate::picking::ray_triangle;

/// Hits this close to the label itself do not hide it
const OCCLUSION_BIAS: f32 = 1e-3;

/// Where a hotspot's label plate sits, `offset` world units above the anchor
pub fn label_anchor(position: Vec3, offset: f32) -> Vec3 {
    position + Vec3::Y * offset
}

/// Rotation that turns a plate's +Z face toward the camera while keeping its
/// up direction aligned with the camera's up vector.
///
/// Falls back to the camera rotation when the camera sits on the anchor.
pub fn billboard_rotation(anchor: Vec3, camera_position: Vec3, camera_rotation: Quat) -> Quat {
    let facing = (camera_position - anchor).normalize_or_zero();
    if facing == Vec3::ZERO {
        return camera_rotation;
    }

    let camera_up = camera_rotation * Vec3::Y;
    let right = camera_up.cross(facing).normalize_or_zero();
    if right == Vec3::ZERO {
        return camera_rotation;
    }
    let up = facing.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, up, facing)).normalize()
}

/// Pixel height that text of `world_height` units occupies at `depth` in
/// front of a perspective camera
pub fn screen_text_height(world_height: f32, depth: f32, fov_y: f32, viewport_height: f32) -> f32 {
    if depth <= 0.0 {
        return 0.0;
    }
    let visible_height = 2.0 * depth * (fov_y * 0.5).tan();
    world_height / visible_height * viewport_height
}

/// True when model geometry lies between the camera and `point`
pub fn is_occluded(camera_position: Vec3, point: Vec3, asset: &LoadedAsset) -> bool {
    let to_point = point - camera_position;
    let distance = to_point.length();
    if distance <= OCCLUSION_BIAS {
        return false;
    }
    let direction = to_point / distance;
    asset.world_triangles().any(|tri| {
        ray_triangle(camera_position, direction, tri).is_some_and(|t| t < distance - OCCLUSION_BIAS)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetMesh;
    use approx::assert_relative_eq;

    /// Unit quad in the z=0 plane, already centered at the origin
    fn wall() -> LoadedAsset {
        let mesh = AssetMesh {
            name: None,
            positions: vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
            base_color: [1.0; 4],
        };
        LoadedAsset::from_meshes("wall.glb", vec![mesh]).unwrap()
    }

    #[test]
    fn test_label_behind_model_is_occluded() {
        let asset = wall();
        let camera = Vec3::new(0.2, 0.1, 5.0);
        assert!(is_occluded(camera, Vec3::new(0.1, 0.3, -1.0), &asset));
        assert!(!is_occluded(camera, Vec3::new(0.1, 0.3, 1.0), &asset));
        // Beside the wall the line of sight is clear
        assert!(!is_occluded(camera, Vec3::new(3.0, 0.3, -1.0), &asset));
    }

    #[test]
    fn test_label_on_surface_is_visible() {
        let asset = wall();
        let camera = Vec3::new(0.2, 0.1, 5.0);
        assert!(!is_occluded(camera, Vec3::new(0.1, 0.3, 0.0), &asset));
        assert!(!is_occluded(camera, camera, &asset));
    }

    #[test]
    fn test_label_anchor() {
        assert_eq!(label_anchor(Vec3::new(1.0, 2.0, 3.0), 0.3), Vec3::new(1.0, 2.3, 3.0));
    }

    #[test]
    fn test_plate_faces_camera() {
        let anchor = Vec3::new(1.0, 0.0, 0.0);
        let camera = Vec3::new(1.0, 0.0, 5.0);
        let rotation = billboard_rotation(anchor, camera, Quat::IDENTITY);
        assert!((rotation * Vec3::Z).abs_diff_eq(Vec3::Z, 1e-5));
        assert!((rotation * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));

        let side = billboard_rotation(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0), Quat::IDENTITY);
        assert!((side * Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn test_plate_follows_camera_each_call() {
        let anchor = Vec3::ZERO;
        let a = billboard_rotation(anchor, Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);
        let b = billboard_rotation(anchor, Vec3::new(0.0, 3.0, 4.0), Quat::from_rotation_x(-0.6435));
        assert!(!(a * Vec3::Z).abs_diff_eq(b * Vec3::Z, 1e-3));
        assert!((b * Vec3::Z).abs_diff_eq(Vec3::new(0.0, 0.6, 0.8), 1e-4));
    }

    #[test]
    fn test_degenerate_camera_positions() {
        let cam = Quat::from_rotation_y(0.5);
        assert_eq!(billboard_rotation(Vec3::ONE, Vec3::ONE, cam), cam);
        // Looking straight down the up axis
        assert_eq!(
            billboard_rotation(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0), Quat::IDENTITY),
            Quat::IDENTITY
        );
    }

    #[test]
    fn test_screen_text_height() {
        let fov = 90f32.to_radians();
        // At depth 1 with a 90 degree fov the view spans 2 world units
        assert_relative_eq!(screen_text_height(0.5, 1.0, fov, 800.0), 200.0, epsilon = 1e-3);
        assert_relative_eq!(screen_text_height(0.5, 2.0, fov, 800.0), 100.0, epsilon = 1e-3);
        assert_eq!(screen_text_height(0.5, -1.0, fov, 800.0), 0.0);
    }
}
