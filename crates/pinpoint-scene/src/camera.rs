//! Camera controls and orbit navigation

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use pinpoint_core::camera::MAX_ELEVATION;
use pinpoint_core::config::CameraConfig;
use pinpoint_core::{CameraTarget, OrbitPose};

use crate::types::ViewerSettings;

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl CameraSettings {
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut settings = Self {
            distance: 0.0,
            target_distance: 0.0,
            azimuth: 0.0,
            elevation: 0.0,
            target: Vec3::ZERO,
            target_focus: Vec3::ZERO,
            sensitivity: config.sensitivity,
            zoom_speed: config.zoom_speed,
            smooth_factor: config.smooth_factor,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
        };
        settings.snap_to(CameraTarget::new(
            Vec3::from_array(config.initial_position),
            Vec3::ZERO,
        ));
        settings
    }

    /// Jump to a camera target without easing
    pub fn snap_to(&mut self, target: CameraTarget) {
        let pose = OrbitPose::from_camera_target(target);
        let distance = pose.distance.max(self.min_distance);
        self.distance = distance;
        self.target_distance = distance;
        self.azimuth = pose.azimuth;
        self.elevation = pose.elevation;
        self.target = pose.target;
        self.target_focus = pose.target;
        // Framing a large model can push past the configured zoom limit
        self.max_distance = self.max_distance.max(distance * 4.0);
    }

    pub fn pose(&self) -> OrbitPose {
        OrbitPose {
            target: self.target,
            distance: self.distance,
            azimuth: self.azimuth,
            elevation: self.elevation,
        }
    }

    fn zoom_by(&mut self, factor: f32) {
        self.target_distance =
            (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .add_systems(Startup, setup_camera)
            .add_systems(Update, update_camera);
    }
}

fn setup_camera(
    mut commands: Commands,
    mut camera_settings: ResMut<CameraSettings>,
    settings: Res<ViewerSettings>,
) {
    let config = &settings.camera;
    *camera_settings = CameraSettings::from_config(config);

    let eye = camera_settings.pose().eye();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: config.fov_radians(),
            near: config.near,
            far: config.far,
            ..default()
        }),
        Transform::from_translation(eye).looking_at(camera_settings.target, Vec3::Y),
        MainCamera,
    ));
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    let motion = mouse_motion.delta;

    // Orbit with left drag
    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer {
        let sensitivity = settings.sensitivity;
        settings.azimuth -= motion.x * sensitivity;
        settings.elevation = (settings.elevation + motion.y * sensitivity)
            .clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    // Pan in the view plane with right drag
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        let (sin_az, cos_az) = settings.azimuth.sin_cos();
        let right = Vec3::new(cos_az, 0.0, -sin_az);
        let pan_speed = settings.distance * 0.002;
        settings.target_focus -= right * motion.x * pan_speed;
        settings.target_focus += Vec3::Y * motion.y * pan_speed;
    }

    if !egui_wants_pointer && mouse_scroll.delta.y != 0.0 {
        let lines = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / 100.0,
        };
        let zoom_factor = (1.0 - lines * settings.zoom_speed).max(0.1);
        settings.zoom_by(zoom_factor);
    }

    // Touch: one finger orbits, two fingers pinch-zoom
    let touch_count = touch_input.iter().count();
    if touch_count == 1 && !egui_wants_pointer {
        for touch in touch_input.iter() {
            let delta = touch.delta();
            if delta != Vec2::ZERO {
                let sensitivity = settings.sensitivity;
                settings.azimuth -= delta.x * sensitivity;
                settings.elevation = (settings.elevation + delta.y * sensitivity)
                    .clamp(-MAX_ELEVATION, MAX_ELEVATION);
            }
        }
    }
    if touch_count == 2 {
        let touches: Vec<_> = touch_input.iter().collect();
        if let (Some(t1), Some(t2)) = (touches.first(), touches.get(1)) {
            let curr_dist = t1.position().distance(t2.position());
            let prev_dist = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
            settings.zoom_by(prev_dist / curr_dist.max(1.0));
        }
    }

    // Exponential damping toward the requested zoom and focus
    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance += (settings.target_distance - settings.distance) * lerp_factor;
    let focus = settings.target_focus;
    let current_target = settings.target;
    settings.target += (focus - current_target) * lerp_factor;

    if let Ok(mut transform) = camera_query.single_mut() {
        let pose = settings.pose();
        transform.translation = pose.eye();
        transform.look_at(pose.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_reaches_eye() {
        let mut settings = CameraSettings::default();
        let target = CameraTarget::new(Vec3::new(3.0, 2.0, 1.0), Vec3::new(1.0, 0.0, -1.0));
        settings.snap_to(target);

        assert_eq!(settings.target, target.look_at);
        assert_eq!(settings.target_focus, target.look_at);
        assert_eq!(settings.distance, settings.target_distance);
        assert!(settings.pose().eye().abs_diff_eq(target.eye, 1e-4));
    }

    #[test]
    fn test_initial_pose_from_config() {
        let settings = CameraSettings::default();
        assert!(settings
            .pose()
            .eye()
            .abs_diff_eq(Vec3::new(2.0, 2.0, 5.0), 1e-4));
    }

    #[test]
    fn test_far_framing_extends_zoom_range() {
        let mut settings = CameraSettings::default();
        settings.snap_to(CameraTarget::new(Vec3::new(0.0, 0.0, 2000.0), Vec3::ZERO));
        assert!(settings.max_distance >= 2000.0);
        settings.zoom_by(1.5);
        assert!(settings.target_distance > 2000.0);
    }
}
