//! Components attached to sandbox entities and nodes

use glam::{Mat4, Quat, Vec3};

use super::hierarchy::NodeId;
use crate::assets::AssetHandle;
use crate::physics::{CollisionMesh, CollisionMeshIndex, PhysicsHandle};
use crate::renderer::Mesh;

/// Local transform of a scene node: position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position relative to the parent node
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
    /// Scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Builder-style scale override
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Get the transformation matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Binds an entity to the rigid body simulating it.
///
/// The physics service holds the reverse link (handle → entity), set with
/// `Physics::set_handle_parent` right after the component is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsComponent {
    pub handle: PhysicsHandle,
}

/// Triangle data extracted from an imported model, kept alive for the
/// physics shape registered from it
#[derive(Debug, Clone)]
pub struct CollisionMeshComponent {
    pub mesh: CollisionMesh,
    /// Index returned by `Physics::register_collision_mesh`, if registration
    /// succeeded
    pub shape: Option<CollisionMeshIndex>,
}

/// Something drawable. On an entity it is placed with the entity's
/// [`SceneNode`]; on a node it is a decoration drawn with that node.
#[derive(Debug, Clone)]
pub struct RenderableComponent {
    pub mesh: AssetHandle<Mesh>,
}

impl RenderableComponent {
    pub fn new(mesh: &AssetHandle<Mesh>) -> Self {
        Self { mesh: mesh.clone() }
    }
}

/// Scene node that positions an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneNode(pub NodeId);

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_matrix_round_trip() {
        let transform = Transform::from_position_rotation(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(0.5),
        )
        .with_scale(Vec3::new(0.75, 0.1, 0.1));

        let (scale, rotation, position) = transform.matrix().to_scale_rotation_translation();
        assert!(position.abs_diff_eq(transform.position, 1e-5));
        assert!(scale.abs_diff_eq(transform.scale, 1e-5));
        assert!(rotation.abs_diff_eq(transform.rotation, 1e-5));
    }
}
