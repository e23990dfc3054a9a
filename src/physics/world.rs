//! Physics simulation using rapier3d

use std::sync::Mutex;

use glam::{Quat, Vec3, Vec4};
use hecs::Entity;
use rapier3d::na::{Quaternion, Translation3, Unit, UnitQuaternion};
use rapier3d::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use super::material::{MaterialInfo, ObjectType};
use super::shape::{CollisionMesh, CollisionMeshIndex};
use crate::core::PhysicsConfig;
use crate::ecs::{NodeId, Transform};

/// Handle to a rigid body owned by the physics service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicsHandle(pub RigidBodyHandle);

/// Handle to a constraint between two bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(pub ImpulseJointHandle);

/// Convert glam Quat to rapier3d UnitQuaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert rapier3d UnitQuaternion to glam Quat
fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(
        Translation3::new(position.x, position.y, position.z),
        quat_to_rapier(rotation),
    )
}

/// Links from a body back into the scene
#[derive(Debug, Clone, Copy)]
struct BodyLinks {
    /// Entity owning the body's `PhysicsComponent`
    entity: Option<Entity>,
    /// Node whose transform mirrors the body
    node: Option<NodeId>,
    object_type: ObjectType,
}

/// A contact that started during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub body_a: PhysicsHandle,
    pub body_b: PhysicsHandle,
    /// World-space contact point
    pub position: Vec3,
    /// World-space contact normal
    pub normal: Vec3,
}

/// Collects contact starts reported by the narrow phase
#[derive(Default)]
struct ContactCollector {
    started: Mutex<Vec<ContactEvent>>,
}

impl EventHandler for ContactCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        colliders: &ColliderSet,
        event: CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        if !event.started() {
            return;
        }
        let parent = |handle: ColliderHandle| colliders.get(handle).and_then(|c| c.parent());
        let (Some(body_a), Some(body_b)) = (parent(event.collider1()), parent(event.collider2()))
        else {
            return;
        };

        let contact = contact_pair.and_then(|pair| {
            pair.manifolds.iter().find_map(|manifold| {
                manifold
                    .data
                    .solver_contacts
                    .first()
                    .map(|c| (c.point, manifold.data.normal))
            })
        });
        let (position, normal) = match contact {
            Some((point, normal)) => (
                Vec3::new(point.x, point.y, point.z),
                Vec3::new(normal.x, normal.y, normal.z),
            ),
            None => {
                let position = colliders
                    .get(event.collider1())
                    .map(|c| {
                        let t = c.translation();
                        Vec3::new(t.x, t.y, t.z)
                    })
                    .unwrap_or_default();
                (position, Vec3::ZERO)
            }
        };

        if let Ok(mut started) = self.started.lock() {
            started.push(ContactEvent {
                body_a: PhysicsHandle(body_a),
                body_b: PhysicsHandle(body_b),
                position,
                normal,
            });
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Physics world manager
pub struct Physics {
    /// Gravity vector
    pub gravity: Vec3,
    /// Physics pipeline
    pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase
    broad_phase: DefaultBroadPhase,
    /// Narrow phase
    narrow_phase: NarrowPhase,
    /// Rigid body set
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,
    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,
    /// CCD solver
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
    /// Set when colliders were added or removed since the last query update
    queries_dirty: bool,
    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Fixed simulation step
    fixed_timestep: f32,
    /// Upper bound on substeps per `step` call
    max_substeps: u32,
    /// Unsimulated time carried into the next `step`
    accumulator: f32,
    /// Entity and node bound to each body
    links: FxHashMap<RigidBodyHandle, BodyLinks>,
    /// Bodies skipped by ray queries
    query_ignored: FxHashSet<RigidBodyHandle>,
    /// Shapes registered with `register_collision_mesh`
    collision_meshes: Vec<SharedShape>,
    /// Contact starts from the last `step`
    contacts: ContactCollector,
}

impl Physics {
    /// Create a new physics world with default gravity
    pub fn new() -> Self {
        Self::with_config(&PhysicsConfig::default())
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self::with_config(&PhysicsConfig {
            gravity,
            ..Default::default()
        })
    }

    /// Create a new physics world from configuration
    pub fn with_config(config: &PhysicsConfig) -> Self {
        Self {
            gravity: config.gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            queries_dirty: false,
            integration_parameters: IntegrationParameters::default(),
            fixed_timestep: config.fixed_timestep.max(1.0e-4),
            max_substeps: config.max_substeps.max(1),
            accumulator: 0.0,
            links: FxHashMap::default(),
            query_ignored: FxHashSet::default(),
            collision_meshes: Vec::new(),
            contacts: ContactCollector::default(),
        }
    }

    /// Advance the simulation by `dt` seconds of frame time.
    ///
    /// Time is consumed in fixed substeps; leftover time carries over to the
    /// next call. Forces added since the previous call act on every substep
    /// of this call and are cleared afterwards. Returns the substep count.
    pub fn step(&mut self, dt: f32) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }

        let mut substeps = 0;
        while self.accumulator >= self.fixed_timestep && substeps < self.max_substeps {
            self.step_once(self.fixed_timestep);
            self.accumulator -= self.fixed_timestep;
            substeps += 1;
        }
        if substeps == self.max_substeps {
            // Behind real time; drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(self.fixed_timestep);
        }

        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }
        substeps
    }

    fn step_once(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y, self.gravity.z],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.contacts,
        );
        self.queries_dirty = false;
    }

    fn insert_body(&mut self, body: RigidBody, collider: Collider, object_type: ObjectType) -> PhysicsHandle {
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.links.insert(
            handle,
            BodyLinks {
                entity: None,
                node: None,
                object_type,
            },
        );
        self.queries_dirty = true;
        PhysicsHandle(handle)
    }

    fn add_shape(&mut self, transform: &Transform, shape: ColliderBuilder, info: &MaterialInfo) -> PhysicsHandle {
        let body = info
            .body_builder(isometry(transform.position, transform.rotation))
            .build();
        let collider = info.collider_builder(shape).build();
        self.insert_body(body, collider, info.object_type)
    }

    /// Add an infinite static plane `n·x + d = 0` given as `(n, d)`
    pub fn add_infinite_plane(&mut self, plane: Vec4, info: &MaterialInfo) -> PhysicsHandle {
        let normal = plane.truncate().normalize_or(Vec3::Y);
        let origin = -plane.w * normal;
        let info = MaterialInfo {
            object_type: ObjectType::Static,
            ..*info
        };
        let shape = ColliderBuilder::halfspace(Unit::new_normalize(vector![
            normal.x, normal.y, normal.z
        ]));
        self.add_shape(&Transform::from_position(origin), shape, &info)
    }

    /// Add a box
    pub fn add_cube(&mut self, transform: &Transform, half_extents: Vec3, info: &MaterialInfo) -> PhysicsHandle {
        let shape = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z);
        self.add_shape(transform, shape, info)
    }

    /// Add a Y-aligned cylinder
    pub fn add_cylinder(
        &mut self,
        transform: &Transform,
        half_height: f32,
        radius: f32,
        info: &MaterialInfo,
    ) -> PhysicsHandle {
        let shape = ColliderBuilder::cylinder(half_height, radius);
        self.add_shape(transform, shape, info)
    }

    /// Add a sphere
    pub fn add_sphere(&mut self, transform: &Transform, radius: f32, info: &MaterialInfo) -> PhysicsHandle {
        self.add_shape(transform, ColliderBuilder::ball(radius), info)
    }

    /// Add a body using a registered collision mesh
    ///
    /// # Errors
    ///
    /// Returns an error if `index` was not returned by
    /// `register_collision_mesh`
    pub fn add_mesh(
        &mut self,
        transform: &Transform,
        index: CollisionMeshIndex,
        info: &MaterialInfo,
    ) -> Result<PhysicsHandle, PhysicsError> {
        let shape = self
            .collision_meshes
            .get(index.0)
            .cloned()
            .ok_or(PhysicsError::UnknownCollisionMesh(index.0))?;
        Ok(self.add_shape(transform, ColliderBuilder::new(shape), info))
    }

    /// Build a triangle-mesh shape once so many bodies can share it
    ///
    /// # Errors
    ///
    /// Returns an error if the mesh is empty or malformed
    pub fn register_collision_mesh(&mut self, mesh: &CollisionMesh) -> Result<CollisionMeshIndex, PhysicsError> {
        mesh.validate()?;
        let vertices = mesh
            .positions
            .iter()
            .map(|p| point![p.x, p.y, p.z])
            .collect();
        let shape = SharedShape::trimesh(vertices, mesh.indices.clone())
            .map_err(|e| PhysicsError::InvalidCollisionMesh(format!("{e:?}")))?;
        self.collision_meshes.push(shape);
        Ok(CollisionMeshIndex(self.collision_meshes.len() - 1))
    }

    /// Number of registered collision meshes
    pub fn collision_mesh_count(&self) -> usize {
        self.collision_meshes.len()
    }

    /// Pin a point of `a` to a point of `b`; anchors are in each body's
    /// local frame. Returns `None` if either body is gone.
    pub fn add_point_constraint(
        &mut self,
        a: PhysicsHandle,
        b: PhysicsHandle,
        local_anchor_a: Vec3,
        local_anchor_b: Vec3,
    ) -> Option<ConstraintHandle> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let joint = SphericalJointBuilder::new()
            .local_anchor1(point![local_anchor_a.x, local_anchor_a.y, local_anchor_a.z])
            .local_anchor2(point![local_anchor_b.x, local_anchor_b.y, local_anchor_b.z]);
        Some(ConstraintHandle(
            self.impulse_joint_set.insert(a.0, b.0, joint, true),
        ))
    }

    /// Number of live constraints
    pub fn constraint_count(&self) -> usize {
        self.impulse_joint_set.len()
    }

    /// Remove a body with its colliders and constraints
    pub fn remove_body(&mut self, handle: PhysicsHandle) -> bool {
        self.links.remove(&handle.0);
        self.query_ignored.remove(&handle.0);
        let removed = self
            .rigid_body_set
            .remove(
                handle.0,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some();
        self.queries_dirty |= removed;
        removed
    }

    /// Check whether a body is alive
    pub fn contains(&self, handle: PhysicsHandle) -> bool {
        self.rigid_body_set.contains(handle.0)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    fn links_mut(&mut self, handle: PhysicsHandle) -> Result<&mut BodyLinks, PhysicsError> {
        self.links
            .get_mut(&handle.0)
            .ok_or(PhysicsError::UnknownHandle)
    }

    /// Record the entity that owns a body
    ///
    /// # Errors
    ///
    /// Returns an error if the body was removed
    pub fn set_handle_parent(&mut self, handle: PhysicsHandle, entity: Entity) -> Result<(), PhysicsError> {
        self.links_mut(handle)?.entity = Some(entity);
        Ok(())
    }

    /// Entity that owns a body
    pub fn get_handle_parent(&self, handle: PhysicsHandle) -> Option<Entity> {
        self.links.get(&handle.0).and_then(|l| l.entity)
    }

    /// Associate a scene node with a body for transform sync
    ///
    /// # Errors
    ///
    /// Returns an error if the body was removed
    pub fn set_scene_node(&mut self, handle: PhysicsHandle, node: NodeId) -> Result<(), PhysicsError> {
        self.links_mut(handle)?.node = Some(node);
        Ok(())
    }

    /// Scene node mirroring a body
    pub fn get_scene_node(&self, handle: PhysicsHandle) -> Option<NodeId> {
        self.links.get(&handle.0).and_then(|l| l.node)
    }

    /// Motion type of a body
    pub fn object_type(&self, handle: PhysicsHandle) -> Option<ObjectType> {
        self.links.get(&handle.0).map(|l| l.object_type)
    }

    /// Every body that has a scene node, with its node and motion type
    pub fn scene_bound_handles(&self) -> Vec<(PhysicsHandle, NodeId, ObjectType)> {
        self.links
            .iter()
            .filter_map(|(&handle, links)| {
                links
                    .node
                    .map(|node| (PhysicsHandle(handle), node, links.object_type))
            })
            .collect()
    }

    /// Exclude a body from ray queries
    pub fn ignore_in_queries(&mut self, handle: PhysicsHandle) {
        self.query_ignored.insert(handle.0);
    }

    fn refresh_queries(&mut self) {
        if self.queries_dirty {
            self.query_pipeline.update(&self.collider_set);
            self.queries_dirty = false;
        }
    }

    /// Cast a ray and return the closest hit within `max_distance`
    pub fn query_closest_hit_ray(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        self.refresh_queries();

        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let ignored = &self.query_ignored;
        let predicate = |_: ColliderHandle, collider: &Collider| {
            collider
                .parent()
                .is_none_or(|body| !ignored.contains(&body))
        };
        let filter = QueryFilter::default().predicate(&predicate);

        let (collider, distance) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
        )?;
        let body = self.collider_set.get(collider)?.parent()?;
        let point = ray.point_at(distance);
        let handle = PhysicsHandle(body);

        Some(RaycastHit {
            handle,
            entity: self.get_handle_parent(handle),
            world_pos: Vec3::new(point.x, point.y, point.z),
            distance,
        })
    }

    /// Get the position and rotation of a body
    pub fn body_pose(&self, handle: PhysicsHandle) -> Option<(Vec3, Quat)> {
        self.rigid_body_set.get(handle.0).map(|rb| {
            let pos = rb.translation();
            (Vec3::new(pos.x, pos.y, pos.z), rapier_to_quat(rb.rotation()))
        })
    }

    /// Set the target pose of a kinematic body for the next step
    pub fn set_kinematic_pose(&mut self, handle: PhysicsHandle, position: Vec3, rotation: Quat) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle.0) {
            rb.set_next_kinematic_position(isometry(position, rotation));
        }
    }

    /// Apply a force to a dynamic body for the next `step`
    pub fn apply_force(&mut self, handle: PhysicsHandle, force: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle.0) {
            rb.add_force(vector![force.x, force.y, force.z], true);
        }
    }

    /// Apply an impulse at an offset from the body's center of mass
    pub fn apply_impulse(&mut self, handle: PhysicsHandle, impulse: Vec3, relative_position: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle.0) {
            let com = rb.center_of_mass();
            let point = point![
                com.x + relative_position.x,
                com.y + relative_position.y,
                com.z + relative_position.z
            ];
            rb.apply_impulse_at_point(vector![impulse.x, impulse.y, impulse.z], point, true);
        }
    }

    /// Apply an impulse at a world-space point
    pub fn apply_impulse_at_point(&mut self, handle: PhysicsHandle, impulse: Vec3, world_point: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(handle.0) {
            rb.apply_impulse_at_point(
                vector![impulse.x, impulse.y, impulse.z],
                point![world_point.x, world_point.y, world_point.z],
                true,
            );
        }
    }

    /// Get the linear velocity of a body
    pub fn linear_velocity(&self, handle: PhysicsHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle.0).map(|rb| {
            let vel = rb.linvel();
            Vec3::new(vel.x, vel.y, vel.z)
        })
    }

    /// Accumulated user force on a body (cleared at the end of `step`)
    pub fn pending_force(&self, handle: PhysicsHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle.0).map(|rb| {
            let f = rb.user_force();
            Vec3::new(f.x, f.y, f.z)
        })
    }

    /// Take the contacts that started during the last steps
    pub fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        self.contacts
            .started
            .get_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a raycast
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The body that was hit
    pub handle: PhysicsHandle,
    /// Entity owning the body, if bound
    pub entity: Option<Entity>,
    /// The point of intersection
    pub world_pos: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// Errors reported by the physics service
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The triangle data cannot form a collision shape
    InvalidCollisionMesh(String),
    /// No collision mesh was registered under this index
    UnknownCollisionMesh(usize),
    /// The handle does not name a live body
    UnknownHandle,
}

impl std::fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCollisionMesh(e) => write!(f, "Invalid collision mesh: {e}"),
            Self::UnknownCollisionMesh(i) => write!(f, "Unknown collision mesh index {i}"),
            Self::UnknownHandle => write!(f, "Unknown physics handle"),
        }
    }
}

impl std::error::Error for PhysicsError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_ground() -> (Physics, PhysicsHandle) {
        let mut physics = Physics::new();
        let ground = physics.add_infinite_plane(Vec4::new(0.0, 1.0, 0.0, 0.0), &MaterialInfo::default());
        (physics, ground)
    }

    fn run(physics: &mut Physics, seconds: f32) {
        let frames = (seconds * 60.0) as usize;
        for _ in 0..frames {
            physics.step(1.0 / 60.0);
        }
    }

    #[test]
    fn test_raycast_hits_ground() {
        let (mut physics, ground) = world_with_ground();
        let hit = physics
            .query_closest_hit_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 100.0)
            .unwrap();
        assert_eq!(hit.handle, ground);
        assert!((hit.distance - 5.0).abs() < 1e-3);
        assert!(hit.world_pos.abs_diff_eq(Vec3::ZERO, 1e-3));
        assert!(hit.entity.is_none());
    }

    #[test]
    fn test_raycast_respects_max_distance_and_ignored_bodies() {
        let (mut physics, _) = world_with_ground();
        assert!(
            physics
                .query_closest_hit_ray(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y, 2.0)
                .is_none()
        );

        let sphere = physics.add_sphere(
            &Transform::from_position(Vec3::new(0.0, 3.0, 0.0)),
            1.0,
            &MaterialInfo::kinematic(),
        );
        let hit = physics
            .query_closest_hit_ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 100.0)
            .unwrap();
        assert_eq!(hit.handle, sphere);

        physics.ignore_in_queries(sphere);
        let hit = physics
            .query_closest_hit_ray(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 100.0)
            .unwrap();
        assert_ne!(hit.handle, sphere);
    }

    #[test]
    fn test_cube_settles_on_ground() {
        let (mut physics, _) = world_with_ground();
        let info = MaterialInfo::dynamic(10.0)
            .with_restitution(0.05)
            .with_damping(0.3, 0.3);
        let cube = physics.add_cube(
            &Transform::from_position(Vec3::new(0.0, 20.0, 0.0)),
            Vec3::ONE,
            &info,
        );

        run(&mut physics, 8.0);

        let (position, _) = physics.body_pose(cube).unwrap();
        assert!((position.y - 1.0).abs() < 0.1, "cube rests at y={}", position.y);
    }

    #[test]
    fn test_forces_last_one_step_call() {
        let (mut physics, _) = world_with_ground();
        let cube = physics.add_cube(
            &Transform::from_position(Vec3::new(0.0, 5.0, 0.0)),
            Vec3::ONE,
            &MaterialInfo::dynamic(1.0),
        );

        physics.apply_force(cube, Vec3::new(0.0, 300.0, 0.0));
        assert!(physics.pending_force(cube).unwrap().y > 299.0);
        physics.step(1.0 / 60.0);
        assert_eq!(physics.pending_force(cube).unwrap(), Vec3::ZERO);
        assert!(physics.linear_velocity(cube).unwrap().y > 0.0);
    }

    #[test]
    fn test_step_uses_fixed_substeps() {
        let mut physics = Physics::new();
        assert_eq!(physics.step(1.0 / 120.0), 0);
        assert_eq!(physics.step(1.0 / 120.0 + 1e-4), 1);
        assert_eq!(physics.step(10.0), 4);
        assert!(physics.step(0.0) <= 1);
    }

    #[test]
    fn test_handle_links_round_trip() {
        let (mut physics, ground) = world_with_ground();
        let mut world = hecs::World::new();
        let entity = world.spawn(());
        let node = NodeId(world.spawn(()));

        physics.set_handle_parent(ground, entity).unwrap();
        physics.set_scene_node(ground, node).unwrap();
        assert_eq!(physics.get_handle_parent(ground), Some(entity));
        assert_eq!(physics.get_scene_node(ground), Some(node));
        assert_eq!(physics.object_type(ground), Some(ObjectType::Static));
        assert_eq!(physics.scene_bound_handles().len(), 1);

        assert!(physics.remove_body(ground));
        assert!(!physics.contains(ground));
        assert_eq!(physics.get_handle_parent(ground), None);
        assert!(!physics.remove_body(ground));
        assert_eq!(
            physics.set_handle_parent(ground, entity),
            Err(PhysicsError::UnknownHandle)
        );
    }

    #[test]
    fn test_point_constraint_holds_bodies_together() {
        let mut physics = Physics::with_gravity(Vec3::ZERO);
        let a = physics.add_cube(
            &Transform::from_position(Vec3::ZERO),
            Vec3::ONE,
            &MaterialInfo::dynamic(10.0),
        );
        let b = physics.add_cube(
            &Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),
            Vec3::ONE,
            &MaterialInfo::dynamic(10.0),
        );
        assert!(
            physics
                .add_point_constraint(a, b, Vec3::new(2.5, 0.0, 0.0), Vec3::new(-2.5, 0.0, 0.0))
                .is_some()
        );
        assert_eq!(physics.constraint_count(), 1);

        physics.apply_impulse(a, Vec3::new(-50.0, 0.0, 0.0), Vec3::ZERO);
        run(&mut physics, 1.0);

        let (pa, ra) = physics.body_pose(a).unwrap();
        let (pb, rb) = physics.body_pose(b).unwrap();
        let anchor_a = pa + ra * Vec3::new(2.5, 0.0, 0.0);
        let anchor_b = pb + rb * Vec3::new(-2.5, 0.0, 0.0);
        assert!(anchor_a.distance(anchor_b) < 0.1);

        physics.remove_body(a);
        assert_eq!(physics.constraint_count(), 0);
        assert!(physics.add_point_constraint(a, b, Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn test_collision_mesh_registration_and_reuse() {
        let (mut physics, _) = world_with_ground();
        let mesh = CollisionMesh::from_triangle_list(
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(-1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
            ],
            &[0, 1, 2, 2, 1, 3],
        );
        let index = physics.register_collision_mesh(&mesh).unwrap();
        assert_eq!(physics.collision_mesh_count(), 1);

        let first = physics
            .add_mesh(&Transform::from_position(Vec3::Y), index, &MaterialInfo::fixed())
            .unwrap();
        let second = physics
            .add_mesh(&Transform::from_position(Vec3::Y * 2.0), index, &MaterialInfo::fixed())
            .unwrap();
        assert_ne!(first, second);

        assert_eq!(
            physics
                .add_mesh(&Transform::new(), CollisionMeshIndex(7), &MaterialInfo::fixed())
                .unwrap_err(),
            PhysicsError::UnknownCollisionMesh(7)
        );
        assert!(
            physics
                .register_collision_mesh(&CollisionMesh::default())
                .is_err()
        );
    }

    #[test]
    fn test_falling_cube_reports_contact() {
        let (mut physics, ground) = world_with_ground();
        let cube = physics.add_cube(
            &Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
            Vec3::ONE,
            &MaterialInfo::dynamic(1.0),
        );
        run(&mut physics, 2.0);

        let contacts = physics.drain_contacts();
        assert!(contacts.iter().any(|c| {
            (c.body_a == cube && c.body_b == ground) || (c.body_a == ground && c.body_b == cube)
        }));
        assert!(physics.drain_contacts().is_empty());
    }
}
