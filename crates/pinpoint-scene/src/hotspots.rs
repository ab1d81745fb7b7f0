//! Hotspot presentation: markers, billboard label plates and label text
//!
//! Visuals are derived from the session's hotspot store every frame. An id
//! that appears in the store gets a marker and a label plate; an id that
//! disappears has both despawned.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use pinpoint_core::label::{billboard_rotation, is_occluded, label_anchor, screen_text_height};
use pinpoint_core::HotspotId;
use std::collections::HashMap;

use crate::camera::MainCamera;
use crate::types::{color_from_rgb, Session, ViewerSettings};

/// Width of one character relative to the text height, used to size plates
const GLYPH_ASPECT: f32 = 0.55;

/// Smallest on-screen label size worth drawing
const MIN_TEXT_PX: f32 = 4.0;

/// Entities owned by a hotspot
#[derive(Debug, Clone, Copy)]
pub struct HotspotVisual {
    pub marker: Entity,
    pub plate: Entity,
}

/// Presentation handles keyed by hotspot id
#[derive(Resource, Default)]
pub struct HotspotVisuals(pub HashMap<HotspotId, HotspotVisual>);

#[derive(Component)]
pub struct HotspotMarker {
    pub id: HotspotId,
}

/// Camera-facing plate behind a hotspot's label text
#[derive(Component)]
pub struct LabelPlate {
    pub id: HotspotId,
    pub anchor: Vec3,
    pub text: String,
}

/// Shared meshes and materials for hotspot visuals
#[derive(Resource)]
pub struct HotspotMaterials {
    marker_mesh: Handle<Mesh>,
    marker: Handle<StandardMaterial>,
    selected: Handle<StandardMaterial>,
    plate: Handle<StandardMaterial>,
}

pub struct HotspotsPlugin;

impl Plugin for HotspotsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HotspotVisuals>()
            .add_systems(Startup, setup_hotspot_materials)
            .add_systems(
                Update,
                (
                    sync_hotspot_visuals,
                    update_marker_highlight,
                    billboard_labels,
                )
                    .chain(),
            )
            .add_systems(EguiPrimaryContextPass, draw_label_text);
    }
}

fn setup_hotspot_materials(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    let config = &settings.hotspots;
    commands.insert_resource(HotspotMaterials {
        marker_mesh: meshes.add(Sphere::new(config.marker_radius)),
        marker: materials.add(StandardMaterial {
            base_color: color_from_rgb(config.marker_color),
            unlit: true,
            ..default()
        }),
        selected: materials.add(StandardMaterial {
            base_color: color_from_rgb(config.selected_color),
            unlit: true,
            ..default()
        }),
        plate: materials.add(StandardMaterial {
            base_color: Color::srgba(0.1, 0.1, 0.15, 0.75),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            cull_mode: None,
            double_sided: true,
            ..default()
        }),
    });
}

/// World-space plate size for a label
pub fn plate_size(text: &str, text_height: f32) -> Vec2 {
    let chars = text.chars().count().max(1) as f32;
    Vec2::new(
        text_height * (chars * GLYPH_ASPECT + 1.0),
        text_height * 1.8,
    )
}

fn sync_hotspot_visuals(
    mut commands: Commands,
    session: Res<Session>,
    mut visuals: ResMut<HotspotVisuals>,
    assets: Option<Res<HotspotMaterials>>,
    mut meshes: ResMut<Assets<Mesh>>,
    settings: Res<ViewerSettings>,
) {
    if !session.is_changed() {
        return;
    }
    let Some(assets) = assets else { return };
    let store = session.hotspots();

    // Despawn visuals whose hotspot is gone
    visuals.0.retain(|id, visual| {
        if store.contains(*id) {
            return true;
        }
        commands.entity(visual.marker).despawn();
        commands.entity(visual.plate).despawn();
        tracing::debug!(%id, "Despawned hotspot visuals");
        false
    });

    let config = &settings.hotspots;
    for hotspot in store.iter() {
        if visuals.0.contains_key(&hotspot.id) {
            continue;
        }

        let marker = commands
            .spawn((
                Mesh3d(assets.marker_mesh.clone()),
                MeshMaterial3d(assets.marker.clone()),
                Transform::from_translation(hotspot.position),
                HotspotMarker { id: hotspot.id },
                Name::new(format!("Hotspot {}", hotspot.id)),
            ))
            .id();

        let anchor = label_anchor(hotspot.position, config.label_offset);
        let size = plate_size(&hotspot.name, config.label_height);
        let plate = commands
            .spawn((
                Mesh3d(meshes.add(Rectangle::new(size.x, size.y))),
                MeshMaterial3d(assets.plate.clone()),
                Transform::from_translation(anchor),
                LabelPlate {
                    id: hotspot.id,
                    anchor,
                    text: hotspot.name.clone(),
                },
            ))
            .id();

        visuals.0.insert(hotspot.id, HotspotVisual { marker, plate });
        tracing::debug!(id = %hotspot.id, name = %hotspot.name, "Spawned hotspot visuals");
    }
}

fn update_marker_highlight(
    session: Res<Session>,
    assets: Option<Res<HotspotMaterials>>,
    mut markers: Query<(&HotspotMarker, &mut MeshMaterial3d<StandardMaterial>)>,
) {
    if !session.is_changed() {
        return;
    }
    let Some(assets) = assets else { return };
    let selected = session.selected();

    for (marker, mut material) in &mut markers {
        let wanted = if selected == Some(marker.id) {
            &assets.selected
        } else {
            &assets.marker
        };
        if material.0 != *wanted {
            material.0 = wanted.clone();
        }
    }
}

/// Turn every label plate toward the camera, every frame
fn billboard_labels(
    camera: Query<&GlobalTransform, With<MainCamera>>,
    mut plates: Query<(&LabelPlate, &mut Transform)>,
) {
    let Ok(camera_transform) = camera.single() else {
        return;
    };
    let camera_position = camera_transform.translation();
    let camera_rotation = camera_transform.rotation();

    for (plate, mut transform) in &mut plates {
        transform.rotation = billboard_rotation(plate.anchor, camera_position, camera_rotation);
    }
}

/// Paint label text over each plate at a size matching its world height.
/// Labels hidden behind the model are skipped.
fn draw_label_text(
    mut contexts: EguiContexts,
    camera: Query<(&Camera, &GlobalTransform, &Projection), With<MainCamera>>,
    plates: Query<&LabelPlate>,
    settings: Res<ViewerSettings>,
    session: Res<Session>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let Ok((camera, camera_transform, projection)) = camera.single() else {
        return;
    };
    let Projection::Perspective(perspective) = projection else {
        return;
    };
    let Some(viewport) = camera.logical_viewport_size() else {
        return;
    };

    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Background,
        egui::Id::new("hotspot_labels"),
    ));
    let forward = camera_transform.forward();
    let text_height = settings.hotspots.label_height;

    for plate in &plates {
        let depth = (plate.anchor - camera_transform.translation()).dot(*forward);
        if depth <= 0.0 {
            continue;
        }
        let Ok(screen) = camera.world_to_viewport(camera_transform, plate.anchor) else {
            continue;
        };
        let size = screen_text_height(text_height, depth, perspective.fov, viewport.y);
        if size < MIN_TEXT_PX {
            continue;
        }
        if let Some(asset) = session.asset() {
            if is_occluded(camera_transform.translation(), plate.anchor, asset) {
                continue;
            }
        }

        painter.text(
            egui::pos2(screen.x, screen.y),
            egui::Align2::CENTER_CENTER,
            &plate.text,
            egui::FontId::proportional(size),
            egui::Color32::WHITE,
        );
    }
}
