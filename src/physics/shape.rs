//! Triangle meshes registered as reusable collision shapes

use glam::Vec3;

use super::PhysicsError;

/// Index of a collision mesh registered with `Physics::register_collision_mesh`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionMeshIndex(pub usize);

/// Raw triangle data for a static collision shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionMesh {
    /// Vertex positions in model space
    pub positions: Vec<Vec3>,
    /// Triangle vertex indices
    pub indices: Vec<[u32; 3]>,
}

impl CollisionMesh {
    /// Build from positions and a flat triangle-list index buffer.
    ///
    /// Trailing indices that do not form a full triangle are dropped.
    pub fn from_triangle_list(positions: Vec<Vec3>, indices: &[u32]) -> Self {
        Self {
            positions,
            indices: indices
                .chunks_exact(3)
                .map(|tri| [tri[0], tri[1], tri[2]])
                .collect(),
        }
    }

    /// Number of triangles
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Check the mesh can be turned into a collision shape
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh has no triangles, an index points past
    /// the vertex array, or a position is not finite
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.indices.is_empty() {
            return Err(PhysicsError::InvalidCollisionMesh(
                "mesh has no triangles".to_string(),
            ));
        }
        let vertex_count = self.positions.len();
        if let Some(bad) = self
            .indices
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(PhysicsError::InvalidCollisionMesh(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }
        if !self.positions.iter().all(|p| p.is_finite()) {
            return Err(PhysicsError::InvalidCollisionMesh(
                "non-finite vertex position".to_string(),
            ));
        }
        Ok(())
    }
}
