//! Mesh and vertex definitions
//!
//! Meshes are CPU-side and immutable once shared through an `AssetHandle`;
//! the renderer uploads them on first use.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::frustum::Aabb;
use super::material::Material;

/// Vertex with position, normal, and UV coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    /// Get the vertex buffer layout for wgpu
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // UV
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Indexed triangle mesh with its bounds and surface material
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Model-space bounds used for culling
    pub aabb: Aabb,
    pub material: Material,
}

impl Mesh {
    /// Create a mesh from vertices and indices; bounds are computed
    pub fn from_data(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let aabb = Aabb::from_points(vertices.iter().map(|v| Vec3::from(v.position)))
            .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO));
        Self {
            vertices,
            indices,
            aabb,
            material: Material::default(),
        }
    }

    /// Replace the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Replace the culling bounds
    pub fn with_aabb(mut self, aabb: Aabb) -> Self {
        self.aabb = aabb;
        self
    }

    /// Box centered at the origin with the given half extent on every axis
    pub fn cube(half_extent: f32) -> Self {
        let h = half_extent;
        // (normal, tangent u, tangent v) per face
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = (normal + u * su + v * sv) * h;
                vertices.push(Vertex::new(
                    position.into(),
                    normal.into(),
                    [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
                ));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::from_data(vertices, indices)
    }

    /// Capped cylinder along Y
    pub fn cylinder(half_height: f32, radius: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side
        for i in 0..=segments {
            let t = i as f32 / segments as f32;
            let (sin, cos) = (t * TAU).sin_cos();
            let normal = Vec3::new(cos, 0.0, sin);
            for (y, v) in [(-half_height, 0.0), (half_height, 1.0)] {
                vertices.push(Vertex::new(
                    [radius * cos, y, radius * sin],
                    normal.into(),
                    [t, v],
                ));
            }
        }
        for i in 0..segments {
            let bottom = i * 2;
            let (top, next_bottom, next_top) = (bottom + 1, bottom + 2, bottom + 3);
            indices.extend_from_slice(&[bottom, top, next_bottom, next_bottom, top, next_top]);
        }

        // Caps
        for (y, normal) in [(half_height, Vec3::Y), (-half_height, Vec3::NEG_Y)] {
            let center = vertices.len() as u32;
            vertices.push(Vertex::new([0.0, y, 0.0], normal.into(), [0.5, 0.5]));
            for i in 0..=segments {
                let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
                vertices.push(Vertex::new(
                    [radius * cos, y, radius * sin],
                    normal.into(),
                    [0.5 + cos * 0.5, 0.5 + sin * 0.5],
                ));
            }
            for i in 0..segments {
                let (a, b) = (center + 1 + i, center + 2 + i);
                if normal.y > 0.0 {
                    indices.extend_from_slice(&[center, b, a]);
                } else {
                    indices.extend_from_slice(&[center, a, b]);
                }
            }
        }

        Self::from_data(vertices, indices)
    }

    /// Square on the XZ plane facing +Y. UVs equal the XZ position so a
    /// repeating texture tiles once per world unit.
    pub fn plane(size: f32) -> Self {
        let half = size / 2.0;
        let corner = |x: f32, z: f32| Vertex::new([x, 0.0, z], [0.0, 1.0, 0.0], [x, z]);
        let vertices = vec![
            corner(-half, half),
            corner(half, half),
            corner(half, -half),
            corner(-half, -half),
        ];
        let indices = vec![0, 1, 2, 2, 3, 0];

        Self::from_data(vertices, indices)
    }

    /// Create a UV sphere
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let position = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());

                vertices.push(Vertex::new(
                    position.into(),
                    position.normalize_or(Vec3::Y).into(),
                    [segment as f32 / segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;
                indices.extend_from_slice(&[
                    current,
                    current + 1,
                    next,
                    current + 1,
                    next + 1,
                    next,
                ]);
            }
        }

        Self::from_data(vertices, indices)
    }

    /// Get the number of indices
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Vertex positions, for collision extraction
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices.iter().map(|v| Vec3::from(v.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's winding agrees with its vertex normals
    fn assert_outward(mesh: &Mesh) {
        for tri in mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let (pa, pb, pc) = (Vec3::from(a.position), Vec3::from(b.position), Vec3::from(c.position));
            let face = (pb - pa).cross(pc - pa);
            if face.length_squared() < 1e-10 {
                continue;
            }
            assert!(face.dot(Vec3::from(a.normal)) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn test_cube_bounds_and_winding() {
        let cube = Mesh::cube(1.0);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.index_count(), 36);
        assert_eq!(cube.aabb, Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
        assert_outward(&cube);
    }

    #[test]
    fn test_cylinder_bounds_and_winding() {
        let cylinder = Mesh::cylinder(1.0, 0.5, 16);
        assert!(cylinder.aabb.min.abs_diff_eq(Vec3::new(-0.5, -1.0, -0.5), 1e-5));
        assert!(cylinder.aabb.max.abs_diff_eq(Vec3::new(0.5, 1.0, 0.5), 1e-5));
        assert_outward(&cylinder);
    }

    #[test]
    fn test_plane_uvs_follow_positions() {
        let plane = Mesh::plane(2000.0);
        for v in &plane.vertices {
            assert_eq!(v.uv, [v.position[0], v.position[2]]);
        }
        assert_outward(&plane);
        assert_eq!(plane.aabb.max.x, 1000.0);
    }

    #[test]
    fn test_sphere_winding() {
        assert_outward(&Mesh::sphere(1.0, 12, 8));
    }
}
