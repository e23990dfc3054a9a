//! Object spawners
//!
//! Each spawner creates a node under the scene root, a body at that node's
//! pose, and an entity tying the two together. The body is bound back to the
//! entity and node before the spawner returns.

use glam::Vec3;
use hecs::Entity;

use crate::assets::AssetHandle;
use crate::ecs::{NodeId, PhysicsComponent, RenderableComponent, Scene, SceneNode, Transform};
use crate::physics::{CollisionMeshIndex, MaterialInfo, Physics, PhysicsError, PhysicsHandle};
use crate::renderer::Mesh;

/// Half extent of the unit cube mesh and its box shape
pub const CUBE_HALF_EXTENT: f32 = 1.0;
/// Half height of the cylinder mesh and shape
pub const CYLINDER_HALF_HEIGHT: f32 = 1.0;
/// Radius of the cylinder mesh and shape
pub const CYLINDER_RADIUS: f32 = 0.5;

/// Heavy, barely bouncy cube
pub fn cube_material() -> MaterialInfo {
    MaterialInfo::dynamic(10.0)
        .with_restitution(0.05)
        .with_damping(0.3, 0.3)
}

pub fn cylinder_material() -> MaterialInfo {
    MaterialInfo::dynamic(30.0)
        .with_restitution(0.2)
        .with_damping(0.3, 0.3)
}

/// Create a node at `transform` and hang it under the root
fn create_root_child(scene: &mut Scene, transform: Transform) -> NodeId {
    let node = scene.create_node_with(transform);
    if let Some(root) = scene.root_node() {
        scene.add_child(root, node);
    }
    node
}

/// Create the entity for a body and link both directions
pub(crate) fn bind_body(
    scene: &mut Scene,
    physics: &mut Physics,
    mesh: &AssetHandle<Mesh>,
    node: NodeId,
    handle: PhysicsHandle,
) -> Result<Entity, PhysicsError> {
    let entity = scene.world_mut().spawn((
        RenderableComponent::new(mesh),
        SceneNode(node),
        PhysicsComponent { handle },
    ));
    physics.set_handle_parent(handle, entity)?;
    physics.set_scene_node(handle, node)?;
    Ok(entity)
}

/// Drop a dynamic cube centered at `position`
pub fn spawn_cube(
    scene: &mut Scene,
    physics: &mut Physics,
    mesh: &AssetHandle<Mesh>,
    position: Vec3,
) -> Result<Entity, PhysicsError> {
    let transform = Transform::from_position(position);
    let node = create_root_child(scene, transform);
    let handle = physics.add_cube(&transform, Vec3::splat(CUBE_HALF_EXTENT), &cube_material());
    bind_body(scene, physics, mesh, node, handle)
}

/// Drop a dynamic Y-aligned cylinder centered at `position`
pub fn spawn_cylinder(
    scene: &mut Scene,
    physics: &mut Physics,
    mesh: &AssetHandle<Mesh>,
    position: Vec3,
) -> Result<Entity, PhysicsError> {
    let transform = Transform::from_position(position);
    let node = create_root_child(scene, transform);
    let handle = physics.add_cylinder(
        &transform,
        CYLINDER_HALF_HEIGHT,
        CYLINDER_RADIUS,
        &cylinder_material(),
    );
    bind_body(scene, physics, mesh, node, handle)
}

/// One cube of a dumbbell plus its decorative arm
fn spawn_dumbbell_half(
    scene: &mut Scene,
    physics: &mut Physics,
    mesh: &AssetHandle<Mesh>,
    center: Vec3,
    arm: Transform,
) -> Result<(Entity, PhysicsHandle), PhysicsError> {
    let transform = Transform::from_position(center);
    let node = create_root_child(scene, transform);
    let handle = physics.add_cube(&transform, Vec3::splat(CUBE_HALF_EXTENT), &cube_material());
    let entity = bind_body(scene, physics, mesh, node, handle)?;

    let arm = scene.create_node_with(arm);
    scene.add_child(node, arm);
    scene.attach_renderable(arm, mesh);
    Ok((entity, handle))
}

/// Drop two cubes `spacing` apart along +X, joined at the midpoint.
///
/// The left cube sits at `position`. Each cube carries a thin arm node
/// reaching from its face to the joint; the arms are drawn but have no
/// body. The joint anchors are in each cube's local frame, so they follow
/// the cubes however they rotate.
pub fn spawn_dumbbell(
    scene: &mut Scene,
    physics: &mut Physics,
    mesh: &AssetHandle<Mesh>,
    position: Vec3,
    spacing: f32,
) -> Result<[Entity; 2], PhysicsError> {
    let anchor = spacing / 2.0;
    let arm_half_length = (anchor - CUBE_HALF_EXTENT) / 2.0;
    let arm_offset = Vec3::X * (CUBE_HALF_EXTENT + arm_half_length);
    let arm_scale = Vec3::new(arm_half_length, 0.1, 0.1);

    let (left, left_handle) = spawn_dumbbell_half(
        scene,
        physics,
        mesh,
        position,
        Transform::from_position(arm_offset).with_scale(arm_scale),
    )?;
    let (right, right_handle) = spawn_dumbbell_half(
        scene,
        physics,
        mesh,
        position + Vec3::X * spacing,
        Transform::from_position(-arm_offset).with_scale(arm_scale),
    )?;

    physics
        .add_point_constraint(
            left_handle,
            right_handle,
            Vec3::X * anchor,
            Vec3::NEG_X * anchor,
        )
        .ok_or(PhysicsError::UnknownHandle)?;
    Ok([left, right])
}

/// Place a static body using a registered collision mesh
///
/// # Errors
///
/// Returns an error if `shape` was never registered
pub fn spawn_static_mesh(
    scene: &mut Scene,
    physics: &mut Physics,
    mesh: &AssetHandle<Mesh>,
    shape: CollisionMeshIndex,
    position: Vec3,
) -> Result<Entity, PhysicsError> {
    let transform = Transform::from_position(position);
    let handle = physics.add_mesh(&transform, shape, &MaterialInfo::fixed())?;
    let node = create_root_child(scene, transform);
    bind_body(scene, physics, mesh, node, handle)
}
