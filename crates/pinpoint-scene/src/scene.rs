//! Scene setup - lights, grid, axes, and environment

use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::types::ViewerSettings;

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Marker component for grid lines
#[derive(Component)]
pub struct GridLine;

/// Marker component for world axis visualization
#[derive(Component)]
pub struct WorldAxis;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_lights, setup_grid, setup_axes));
    }
}

fn setup_lights(mut commands: Commands) {
    // Key light from above, like sunlight
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));

    // Opposite fill so the unlit side of a model is not black
    commands.spawn((
        DirectionalLight {
            illuminance: 2500.0,
            shadows_enabled: false,
            color: Color::srgb(0.9, 0.95, 1.0),
            ..default()
        },
        Transform::from_xyz(-5.0, 3.0, -4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        PointLight {
            intensity: 200_000.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            range: 50.0,
            ..default()
        },
        Transform::from_xyz(0.0, 6.0, 4.0),
    ));
}

/// Ground grid on the XZ plane, one unit per cell
fn setup_grid(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    let scene = &settings.scene;
    let visibility = if scene.show_grid {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };

    let half_cells = (scene.grid_size / 2) as i32;
    let extent = scene.grid_size as f32;
    let thickness = 0.01;

    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.55, 0.55),
        unlit: true,
        ..default()
    });
    let line_along_x = meshes.add(Cuboid::new(extent, thickness, thickness));
    let line_along_z = meshes.add(Cuboid::new(thickness, thickness, extent));

    for i in -half_cells..=half_cells {
        let offset = i as f32;
        commands.spawn((
            Mesh3d(line_along_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(0.0, 0.0, offset),
            GridLine,
            visibility,
        ));
        commands.spawn((
            Mesh3d(line_along_z.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_xyz(offset, 0.0, 0.0),
            GridLine,
            visibility,
        ));
    }
}

/// X (red), Y (green) and Z (blue) world axes from the origin
fn setup_axes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    let scene = &settings.scene;
    let visibility = if scene.show_axes {
        Visibility::Visible
    } else {
        Visibility::Hidden
    };

    let length = scene.axes_length;
    let thickness = 0.015;
    let shaft = meshes.add(Cylinder::new(thickness, length));

    // Cylinders are Y-aligned; rotate each into place
    let axes = [
        (
            Color::srgb(0.9, 0.2, 0.2),
            Vec3::X,
            Quat::from_rotation_z(-FRAC_PI_2),
        ),
        (Color::srgb(0.2, 0.9, 0.2), Vec3::Y, Quat::IDENTITY),
        (
            Color::srgb(0.2, 0.2, 0.9),
            Vec3::Z,
            Quat::from_rotation_x(FRAC_PI_2),
        ),
    ];

    for (color, direction, rotation) in axes {
        commands.spawn((
            Mesh3d(shaft.clone()),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                unlit: true,
                ..default()
            })),
            Transform::from_translation(direction * length * 0.5).with_rotation(rotation),
            WorldAxis,
            visibility,
        ));
    }
}
