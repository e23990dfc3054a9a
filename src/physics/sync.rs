//! Transform exchange between scene nodes and bodies

use super::material::ObjectType;
use super::world::Physics;
use crate::ecs::{Scene, Transform};

/// Copy the world pose of every kinematic body's node into the simulation.
///
/// Call before `Physics::step` so kinematic bodies follow their nodes.
pub fn push_kinematic_nodes(physics: &mut Physics, scene: &Scene) -> usize {
    let mut pushed = 0;
    for (handle, node, object_type) in physics.scene_bound_handles() {
        if object_type != ObjectType::Kinematic {
            continue;
        }
        let Some(matrix) = scene.world_matrix(node) else {
            continue;
        };
        let (_, rotation, position) = matrix.to_scale_rotation_translation();
        physics.set_kinematic_pose(handle, position, rotation);
        pushed += 1;
    }
    pushed
}

/// Write simulated poses of dynamic bodies back into their nodes.
///
/// The body pose is a world pose; it is converted into the node's parent
/// space. Node scale is left untouched.
pub fn pull_dynamic_poses(physics: &Physics, scene: &mut Scene) -> usize {
    let mut pulled = 0;
    for (handle, node, object_type) in physics.scene_bound_handles() {
        if object_type != ObjectType::Dynamic {
            continue;
        }
        let (Some((position, rotation)), Some(local)) =
            (physics.body_pose(handle), scene.node_transform(node))
        else {
            continue;
        };

        let world = Transform::from_position_rotation(position, rotation).matrix();
        let parent_world = scene
            .parent(node)
            .and_then(|parent| scene.world_matrix(parent))
            .unwrap_or_default();
        let (_, rotation, position) = (parent_world.inverse() * world).to_scale_rotation_translation();

        scene.set_node_transform(
            node,
            Transform {
                position,
                rotation,
                scale: local.scale,
            },
        );
        pulled += 1;
    }
    pulled
}
