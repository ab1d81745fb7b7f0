//! Presentation of the installed asset

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use pinpoint_core::{AssetMesh, LoadedAsset};

use crate::types::Session;

/// Root entity of the displayed model, tagged with the session revision it shows
#[derive(Component)]
pub struct AssetRoot {
    pub revision: u64,
}

/// Marker for the mesh children of an `AssetRoot`
#[derive(Component)]
pub struct AssetPart;

pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, sync_asset_root);
    }
}

/// Convert a baked mesh into a renderable Bevy mesh
pub fn to_bevy_mesh(source: &AssetMesh) -> Mesh {
    let positions: Vec<[f32; 3]> = source.positions.iter().map(|p| p.to_array()).collect();
    let normals: Vec<[f32; 3]> = source.normals.iter().map(|n| n.to_array()).collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(source.indices.clone()));
    mesh
}

/// Replace the displayed model whenever the session installs a new asset
fn sync_asset_root(
    mut commands: Commands,
    session: Res<Session>,
    roots: Query<(Entity, &AssetRoot)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !session.is_changed() {
        return;
    }

    let revision = session.asset_revision();
    let mut up_to_date = false;
    for (entity, root) in &roots {
        if root.revision == revision && session.has_asset() {
            up_to_date = true;
        } else {
            commands.entity(entity).despawn();
            tracing::debug!(revision = root.revision, "Removed previous model");
        }
    }

    if up_to_date {
        return;
    }
    if let Some(asset) = session.asset() {
        spawn_asset(&mut commands, asset, revision, &mut meshes, &mut materials);
    }
}

fn spawn_asset(
    commands: &mut Commands,
    asset: &LoadedAsset,
    revision: u64,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let root = commands
        .spawn((
            Transform::from_translation(asset.root_translation()),
            Visibility::default(),
            AssetRoot { revision },
            Name::new(asset.name().to_string()),
        ))
        .id();

    for part in asset.meshes() {
        let [r, g, b, a] = part.base_color;
        let material = materials.add(StandardMaterial {
            base_color: Color::linear_rgba(r, g, b, a),
            perceptual_roughness: 0.6,
            metallic: 0.1,
            alpha_mode: if a < 1.0 {
                AlphaMode::Blend
            } else {
                AlphaMode::Opaque
            },
            ..default()
        });

        let mut child = commands.spawn((
            Mesh3d(meshes.add(to_bevy_mesh(part))),
            MeshMaterial3d(material),
            Transform::IDENTITY,
            AssetPart,
            ChildOf(root),
        ));
        if let Some(name) = &part.name {
            child.insert(Name::new(name.clone()));
        }
    }

    tracing::info!(
        name = asset.name(),
        parts = asset.meshes().len(),
        revision,
        "Spawned model"
    );
}
