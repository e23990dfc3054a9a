//! glTF model import
//!
//! Loads the first mesh of a glTF file. Its triangle primitives (lists, strips
//! and fans) are merged into a single render mesh and a matching collision
//! mesh. Point and line primitives are skipped.

use std::path::Path;

use glam::Vec3;

use crate::physics::CollisionMesh;
use crate::renderer::{Material, Mesh, Vertex};

/// Diffuse color for models without a material
pub const DEFAULT_MODEL_COLOR: Vec3 = Vec3::new(0.3, 1.0, 0.3);

/// First mesh of an imported file
#[derive(Debug, Clone)]
pub struct ImportedModel {
    /// Name of the glTF mesh, if any
    pub name: Option<String>,
    /// Render mesh with the material of its first primitive
    pub mesh: Mesh,
    /// Triangles for a static collision shape
    pub collision: CollisionMesh,
}

/// Import the first mesh of a `.gltf` or `.glb` file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, has no meshes, or
/// its first mesh has no triangle primitive
pub fn load_gltf(path: impl AsRef<Path>) -> Result<ImportedModel, AssetError> {
    let path = path.as_ref();
    let (document, buffers, _images) =
        gltf::import(path).map_err(|e| AssetError::Import(format!("{}: {e}", path.display())))?;

    let model = build_model(&document, &buffers)?;
    log::info!(
        "Loaded model {} ({} vertices, {} triangles)",
        path.display(),
        model.mesh.vertices.len(),
        model.collision.num_triangles()
    );
    Ok(model)
}

fn build_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<ImportedModel, AssetError> {
    let mesh = document.meshes().next().ok_or(AssetError::NoMeshes)?;

    let mut vertices: Vec<Vertex> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut material = None;
    let mut skipped = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
        let Some(positions) = reader.read_positions() else {
            skipped.push("primitive without positions".to_string());
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let base = vertices.len() as u32;

        let raw_indices: Vec<u32> = match reader.read_indices() {
            Some(read) => read.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };
        let Some(primitive_indices) = triangle_list(primitive.mode(), raw_indices) else {
            skipped.push(format!("{:?}", primitive.mode()));
            continue;
        };
        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => smooth_normals(&positions, &primitive_indices),
        };
        let uvs: Vec<[f32; 2]> = reader
            .read_tex_coords(0)
            .map(|uvs| uvs.into_f32().collect())
            .unwrap_or_default();

        vertices.extend(positions.iter().enumerate().map(|(i, &position)| {
            Vertex::new(
                position,
                normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            )
        }));
        indices.extend(primitive_indices.iter().map(|&i| base + i));

        if material.is_none() {
            material = Some(primitive_material(&primitive));
        }
    }

    if vertices.is_empty() {
        return Err(AssetError::UnsupportedPrimitive(if skipped.is_empty() {
            "mesh has no primitives".to_string()
        } else {
            skipped.join(", ")
        }));
    }
    if !skipped.is_empty() {
        log::warn!("Skipped primitives: {}", skipped.join(", "));
    }

    let collision = CollisionMesh::from_triangle_list(
        vertices.iter().map(|v| Vec3::from(v.position)).collect(),
        &indices,
    );
    let mesh_material = material.unwrap_or_else(|| Material::diffuse(DEFAULT_MODEL_COLOR));

    Ok(ImportedModel {
        name: mesh.name().map(str::to_string),
        mesh: Mesh::from_data(vertices, indices).with_material(mesh_material),
        collision,
    })
}

/// Expand strip and fan indices into a plain triangle list
///
/// Winding follows the glTF rules, so odd strip triangles swap their last two
/// corners. Returns `None` for point and line modes.
fn triangle_list(mode: gltf::mesh::Mode, indices: Vec<u32>) -> Option<Vec<u32>> {
    use gltf::mesh::Mode;

    match mode {
        Mode::Triangles => Some(indices),
        Mode::TriangleStrip => Some(
            indices
                .windows(3)
                .enumerate()
                .flat_map(|(i, w)| {
                    if i % 2 == 0 {
                        [w[0], w[1], w[2]]
                    } else {
                        [w[0], w[2], w[1]]
                    }
                })
                .collect(),
        ),
        Mode::TriangleFan => {
            let Some((&hub, rim)) = indices.split_first() else {
                return Some(Vec::new());
            };
            Some(rim.windows(2).flat_map(|w| [hub, w[0], w[1]]).collect())
        }
        Mode::Points | Mode::Lines | Mode::LineLoop | Mode::LineStrip => None,
    }
}

fn primitive_material(primitive: &gltf::Primitive<'_>) -> Material {
    let material = primitive.material();
    if material.index().is_none() {
        return Material::diffuse(DEFAULT_MODEL_COLOR);
    }
    let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();
    Material::new(Vec3::new(r, g, b))
}

/// Area-weighted vertex normals
fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let (Some(pa), Some(pb), Some(pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let (pa, pb, pc) = (Vec3::from(*pa), Vec3::from(*pb), Vec3::from(*pc));
        let face = (pb - pa).cross(pc - pa);
        for i in [a, b, c] {
            normals[i] += face;
        }
    }
    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y).into())
        .collect()
}

/// Errors that can occur while importing assets
#[derive(Debug, Clone)]
pub enum AssetError {
    /// The file could not be read or parsed
    Import(String),
    /// The file contains no meshes
    NoMeshes,
    /// The first mesh has no usable triangle primitives
    UnsupportedPrimitive(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import(e) => write!(f, "Import error: {e}"),
            Self::NoMeshes => write!(f, "File contains no meshes"),
            Self::UnsupportedPrimitive(e) => write!(f, "Unsupported primitive: {e}"),
        }
    }
}

impl std::error::Error for AssetError {}
