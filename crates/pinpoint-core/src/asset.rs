//! GLB asset loading into CPU-side meshes
//!
//! Parsing is done with the `gltf` crate. Every triangle primitive reachable
//! from the default scene is baked into asset space (node transforms applied),
//! so the same vertex data serves both rendering and ray picking.

use bevy_math::{Mat3, Mat4, Vec3};
use gltf::mesh::Mode;

use crate::bounds::Aabb;
use crate::error::ViewerError;

const GLB_MAGIC: &[u8; 4] = b"glTF";

/// A triangle mesh in asset space
#[derive(Debug, Clone)]
pub struct AssetMesh {
    /// Node or mesh name from the container, if any
    pub name: Option<String>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Triangle list indices into `positions`
    pub indices: Vec<u32>,
    /// Linear RGBA base color factor of the primitive's material
    pub base_color: [f32; 4],
}

impl AssetMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as vertex triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(|tri| {
            Some([
                *self.positions.get(tri[0] as usize)?,
                *self.positions.get(tri[1] as usize)?,
                *self.positions.get(tri[2] as usize)?,
            ])
        })
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter().copied())
    }
}

/// A successfully parsed scene container: the renderable root node data plus
/// its bounding volume.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    name: String,
    meshes: Vec<AssetMesh>,
    bounds: Aabb,
}

impl LoadedAsset {
    /// Assemble an asset from already-baked meshes.
    ///
    /// Fails with `InvalidAssetFormat` when the meshes hold no triangles.
    pub fn from_meshes(name: impl Into<String>, meshes: Vec<AssetMesh>) -> Result<Self, ViewerError> {
        let meshes: Vec<AssetMesh> = meshes
            .into_iter()
            .filter(|m| m.triangle_count() > 0)
            .collect();

        if meshes.is_empty() {
            return Err(ViewerError::InvalidAssetFormat(
                "asset contains no triangle geometry".to_string(),
            ));
        }

        let bounds = meshes
            .iter()
            .fold(Aabb::empty(), |acc, m| acc.union(&m.bounds()));

        Ok(Self {
            name: name.into(),
            meshes,
            bounds,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meshes(&self) -> &[AssetMesh] {
        &self.meshes
    }

    /// Bounds in authored asset space
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Translation applied to the root node so its bounds are centered at the origin
    pub fn root_translation(&self) -> Vec3 {
        -self.bounds.center()
    }

    /// Bounds after re-centering; always centered at the world origin
    pub fn world_bounds(&self) -> Aabb {
        self.bounds.translated(self.root_translation())
    }

    /// All triangles of the asset in world space, in a stable order
    pub fn world_triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let offset = self.root_translation();
        self.meshes
            .iter()
            .flat_map(|m| m.triangles())
            .map(move |[a, b, c]| [a + offset, b + offset, c + offset])
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }
}

/// Fast suffix check done before any parsing
pub fn validate_file_name(file_name: &str) -> Result<(), ViewerError> {
    if file_name.to_ascii_lowercase().ends_with(".glb") {
        Ok(())
    } else {
        Err(ViewerError::InvalidAssetFormat(format!(
            "'{}' is not a .glb file",
            file_name
        )))
    }
}

/// Parse a binary glTF container into a `LoadedAsset`
pub fn load_glb(name: &str, bytes: &[u8]) -> Result<LoadedAsset, ViewerError> {
    if bytes.len() < 12 || &bytes[..4] != GLB_MAGIC {
        return Err(ViewerError::InvalidAssetFormat(
            "missing binary glTF header".to_string(),
        ));
    }

    let gltf = gltf::Gltf::from_slice(bytes)
        .map_err(|e| ViewerError::InvalidAssetFormat(format!("GLB parse error: {}", e)))?;
    let gltf::Gltf { document, blob } = gltf;

    let buffers = gltf::import_buffers(&document, None, blob)
        .map_err(|e| ViewerError::InvalidAssetFormat(format!("GLB buffer error: {}", e)))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| ViewerError::InvalidAssetFormat("GLB has no scenes".to_string()))?;

    let mut meshes = Vec::new();
    for node in scene.nodes() {
        visit_node(&node, Mat4::IDENTITY, &buffers, &mut meshes)?;
    }

    let asset = LoadedAsset::from_meshes(name, meshes)?;
    tracing::info!(
        name,
        meshes = asset.meshes().len(),
        triangles = asset.triangle_count(),
        "Parsed GLB asset"
    );
    Ok(asset)
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<AssetMesh>,
) -> Result<(), ViewerError> {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(|s| s.to_string());

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                tracing::debug!(mode = ?primitive.mode(), "Skipping non-triangle primitive");
                continue;
            }
            if let Some(baked) = bake_primitive(&primitive, world, buffers)? {
                out.push(AssetMesh {
                    name: name.clone(),
                    ..baked
                });
            }
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, out)?;
    }
    Ok(())
}

/// Reject accessors the `gltf` readers cannot iterate safely
fn check_accessor(accessor: &gltf::Accessor, role: &str) -> Result<(), ViewerError> {
    if accessor.count() == 0 {
        return Err(ViewerError::InvalidAssetFormat(format!(
            "{} accessor {} is empty",
            role,
            accessor.index()
        )));
    }
    if accessor.view().is_none() {
        return Err(ViewerError::InvalidAssetFormat(format!(
            "{} accessor {} has no buffer view",
            role,
            accessor.index()
        )));
    }
    Ok(())
}

fn bake_primitive(
    primitive: &gltf::Primitive,
    transform: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Result<Option<AssetMesh>, ViewerError> {
    for (semantic, accessor) in primitive.attributes() {
        check_accessor(&accessor, &format!("{:?}", semantic))?;
    }
    if let Some(accessor) = primitive.indices() {
        check_accessor(&accessor, "index")?;
    }

    let reader = primitive.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));

    let Some(positions) = reader.read_positions() else {
        return Ok(None);
    };
    let positions: Vec<Vec3> = positions
        .map(|p| transform.transform_point3(Vec3::from_array(p)))
        .collect();
    if positions.is_empty() {
        return Ok(None);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    let mut indices: Vec<u32> = indices
        .into_iter()
        .filter(|&i| (i as usize) < positions.len())
        .collect();
    indices.truncate(indices.len() - indices.len() % 3);

    let normal_matrix = Mat3::from_mat4(transform).inverse().transpose();
    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(normals) => normals
            .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
            .collect(),
        None => Vec::new(),
    };
    let normals = if normals.len() == positions.len() {
        normals
    } else {
        smooth_normals(&positions, &indices)
    };

    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Ok(Some(AssetMesh {
        name: None,
        positions,
        normals,
        indices,
        base_color,
    }))
}

/// Area-weighted vertex normals for meshes that ship without them
pub fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Y
            } else {
                n
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Build a minimal GLB holding one non-indexed triangle list under a
    /// single translated node.
    pub(crate) fn glb_with_triangles(positions: &[[f32; 3]], translation: [f32; 3]) -> Vec<u8> {
        let (bin, accessor) = position_buffer(positions);
        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "name": "body", "mesh": 0, "translation": translation }],
            "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
            "buffers": [{ "byteLength": bin.len() }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": bin.len() }],
            "accessors": [accessor]
        });
        pack_glb(&json, bin)
    }

    /// Little-endian position data plus a matching POSITION accessor
    fn position_buffer(positions: &[[f32; 3]]) -> (Vec<u8>, serde_json::Value) {
        let mut bin = Vec::new();
        let mut min = [f32::INFINITY; 3];
        let mut max = [f32::NEG_INFINITY; 3];
        for p in positions {
            for i in 0..3 {
                bin.extend_from_slice(&p[i].to_le_bytes());
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        let accessor = serde_json::json!({
            "bufferView": 0,
            "componentType": 5126,
            "count": positions.len(),
            "type": "VEC3",
            "min": min,
            "max": max
        });
        (bin, accessor)
    }

    /// Wrap a glTF document and its binary chunk in a GLB container
    fn pack_glb(json: &serde_json::Value, mut bin: Vec<u8>) -> Vec<u8> {
        let mut json_bytes = serde_json::to_vec(json).unwrap();
        while json_bytes.len() % 4 != 0 {
            json_bytes.push(b' ');
        }
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let total = 12 + 8 + json_bytes.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(GLB_MAGIC);
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x4E4F_534Au32.to_le_bytes());
        out.extend_from_slice(&json_bytes);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&0x004E_4942u32.to_le_bytes());
        out.extend_from_slice(&bin);
        out
    }

    /// Two triangles forming a quad in the z=0 plane
    pub(crate) fn quad(half: f32) -> Vec<[f32; 3]> {
        vec![
            [-half, -half, 0.0],
            [half, -half, 0.0],
            [half, half, 0.0],
            [-half, -half, 0.0],
            [half, half, 0.0],
            [-half, half, 0.0],
        ]
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("engine.glb").is_ok());
        assert!(validate_file_name("ENGINE.GLB").is_ok());
        assert!(matches!(
            validate_file_name("engine.gltf"),
            Err(ViewerError::InvalidAssetFormat(_))
        ));
        assert!(validate_file_name("glb").is_err());
    }

    #[test]
    fn test_load_glb_bakes_node_transform() {
        let bytes = glb_with_triangles(&quad(1.0), [0.5, 2.0, 0.0]);
        let asset = load_glb("quad.glb", &bytes).unwrap();

        assert_eq!(asset.name(), "quad.glb");
        assert_eq!(asset.meshes().len(), 1);
        assert_eq!(asset.triangle_count(), 2);
        assert_eq!(asset.vertex_count(), 6);
        assert_eq!(asset.meshes()[0].name.as_deref(), Some("body"));

        let bounds = asset.bounds();
        assert!(bounds.min.abs_diff_eq(Vec3::new(-0.5, 1.0, 0.0), 1e-6));
        assert!(bounds.max.abs_diff_eq(Vec3::new(1.5, 3.0, 0.0), 1e-6));
        assert!(asset.root_translation().abs_diff_eq(Vec3::new(-0.5, -2.0, 0.0), 1e-6));
        assert!(asset.world_bounds().center().abs_diff_eq(Vec3::ZERO, 1e-6));
    }

    #[test]
    fn test_load_glb_computes_missing_normals() {
        let bytes = glb_with_triangles(&quad(1.0), [0.0, 0.0, 0.0]);
        let asset = load_glb("quad.glb", &bytes).unwrap();
        let mesh = &asset.meshes()[0];
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        for n in &mesh.normals {
            assert!(n.abs_diff_eq(Vec3::Z, 1e-6));
        }
        assert_eq!(mesh.base_color, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_load_glb_rejects_garbage() {
        let err = load_glb("x.glb", b"definitely not a glb").unwrap_err();
        assert!(matches!(err, ViewerError::InvalidAssetFormat(_)));

        let mut truncated = glb_with_triangles(&quad(1.0), [0.0; 3]);
        truncated.truncate(40);
        assert!(matches!(
            load_glb("x.glb", &truncated),
            Err(ViewerError::InvalidAssetFormat(_))
        ));
    }

    #[test]
    fn test_from_meshes_requires_triangles() {
        let err = LoadedAsset::from_meshes("empty.glb", Vec::new()).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidAssetFormat(_)));
    }

    #[test]
    fn test_world_triangles_are_recentered() {
        let mesh = AssetMesh {
            name: None,
            positions: vec![
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(12.0, 0.0, 0.0),
                Vec3::new(10.0, 2.0, 0.0),
            ],
            normals: vec![Vec3::Z; 3],
            indices: vec![0, 1, 2],
            base_color: [1.0; 4],
        };
        let asset = LoadedAsset::from_meshes("tri.glb", vec![mesh]).unwrap();
        let tris: Vec<_> = asset.world_triangles().collect();
        assert_eq!(tris.len(), 1);
        assert!(tris[0][0].abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), 1e-6));
        assert!(tris[0][1].abs_diff_eq(Vec3::new(1.0, -1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_load_glb_composes_nested_node_transforms() {
        let (bin, accessor) = position_buffer(&quad(1.0));
        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "frame", "translation": [10.0, 0.0, 0.0], "scale": [2.0, 2.0, 2.0], "children": [1] },
                { "name": "panel", "mesh": 0, "translation": [1.0, 0.0, 0.0] }
            ],
            "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
            "buffers": [{ "byteLength": bin.len() }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": bin.len() }],
            "accessors": [accessor]
        });
        let asset = load_glb("nested.glb", &pack_glb(&json, bin)).unwrap();

        assert_eq!(asset.meshes().len(), 1);
        assert_eq!(asset.meshes()[0].name.as_deref(), Some("panel"));
        let bounds = asset.bounds();
        assert!(bounds.min.abs_diff_eq(Vec3::new(10.0, -2.0, 0.0), 1e-5));
        assert!(bounds.max.abs_diff_eq(Vec3::new(14.0, 2.0, 0.0), 1e-5));

        // The child's geometry is what a click in front of the model hits
        let view = crate::picking::CameraView::looking_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            75f32.to_radians(),
            1.0,
        );
        let hit = crate::picking::pick_surface(
            &view,
            bevy_math::Vec2::new(60.0, 45.0),
            crate::picking::Viewport::new(100.0, 100.0),
            &asset,
        )
        .unwrap();
        assert_relative_eq!(hit.point.z, 0.0, epsilon = 1e-4);
        assert!(hit.point.x.abs() <= 2.0 + 1e-4);
        assert!(hit.point.y.abs() <= 2.0 + 1e-4);
    }

    #[test]
    fn test_load_glb_rejects_empty_accessor() {
        let (mut bin, mut accessor) = position_buffer(&quad(1.0));
        accessor["count"] = serde_json::json!(0);
        accessor["min"] = serde_json::json!([0.0, 0.0, 0.0]);
        accessor["max"] = serde_json::json!([0.0, 0.0, 0.0]);
        bin.truncate(36);
        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [{ "mesh": 0 }],
            "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
            "buffers": [{ "byteLength": bin.len() }],
            "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": bin.len() }],
            "accessors": [accessor]
        });

        let result = std::panic::catch_unwind(|| load_glb("empty.glb", &pack_glb(&json, bin)));
        let result = result.expect("loading an empty accessor must not panic");
        assert!(matches!(result, Err(ViewerError::InvalidAssetFormat(_))));
    }
}
