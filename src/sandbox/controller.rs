//! Interactive sandbox controller
//!
//! Owns the scene, the physics service and the free camera, and turns input
//! events into spawn/delete/impulse operations. Nothing here touches the
//! window or the GPU; the per-frame output is a list of visible renderables
//! plus lighting, which `SandboxApp` hands to the renderer.

use glam::{Vec3, Vec4};
use hecs::Entity;
use winit::event::MouseButton;

use super::spawn::{self, CUBE_HALF_EXTENT, CYLINDER_HALF_HEIGHT, CYLINDER_RADIUS};
use crate::assets::{AssetHandle, ImportedModel};
use crate::core::{EngineEvent, EventDispatcher, EventKind, KeyState, SandboxConfig};
use crate::ecs::{
    CollisionMeshComponent, Name, NodeId, PhysicsComponent, Scene, SceneNode, Transform,
    VisibilityList, VisibleRenderable,
};
use crate::input::{Input, InputMapper, SandboxAction};
use crate::physics::{
    self, CollisionMeshIndex, MaterialInfo, Physics, PhysicsError, PhysicsHandle, RaycastHit,
};
use crate::renderer::{Aabb, Camera, LightingParameters, Material, Mesh};

/// Radius of the kinematic sphere that follows the camera
const CAMERA_PROXY_RADIUS: f32 = 1.0;
/// Side length of the drawn ground plane
const GROUND_SIZE: f32 = 2000.0;

/// Meshes shared by every spawned object of a kind
struct SandboxMeshes {
    cube: AssetHandle<Mesh>,
    cylinder: AssetHandle<Mesh>,
    /// Kept alive for the ground entity
    _ground: AssetHandle<Mesh>,
}

/// The imported model and its registered shape
struct ImportedAsset {
    mesh: AssetHandle<Mesh>,
    shape: Option<CollisionMeshIndex>,
}

/// What one call to [`Sandbox::update`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// Entities that received the anti-gravity force
    pub anti_gravity_targets: usize,
    /// Physics substeps taken
    pub substeps: u32,
    /// Contacts delivered as collision events
    pub contacts: usize,
    /// Renderables that survived culling
    pub visible: usize,
}

/// Result of a delete action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deletion {
    /// The destroyed entity
    pub entity: Entity,
    /// Its node
    pub node: NodeId,
    /// False when the node had children and was left attached
    pub node_removed: bool,
}

/// Physics sandbox: scene, simulation, camera and input handling
pub struct Sandbox {
    config: SandboxConfig,
    scene: Scene,
    physics: Physics,
    camera: Camera,
    lighting: LightingParameters,
    bindings: InputMapper,
    dispatcher: EventDispatcher<Sandbox>,
    meshes: SandboxMeshes,
    imported: Option<ImportedAsset>,
    camera_node: NodeId,
    camera_handle: PhysicsHandle,
    ground_entity: Entity,
    anti_gravity: bool,
    visible: VisibilityList,
}

impl Sandbox {
    /// Build the ground, the camera proxy and the handler table
    ///
    /// # Errors
    ///
    /// Returns an error if a body cannot be bound to its entity
    pub fn new(config: SandboxConfig) -> Result<Self, PhysicsError> {
        let mut scene = Scene::new();
        let mut physics = Physics::with_config(&config.physics);

        let root = scene.create_node();
        scene.set_root_node(root);

        let ground_mesh = AssetHandle::new(
            Mesh::plane(GROUND_SIZE)
                .with_material(Material::checker(Vec3::ONE))
                .with_aabb(Aabb::new(
                    Vec3::new(-GROUND_SIZE / 2.0, -1.0, -GROUND_SIZE / 2.0),
                    Vec3::new(GROUND_SIZE / 2.0, 0.0, GROUND_SIZE / 2.0),
                )),
        );
        let ground_entity = scene.create_renderable(&ground_mesh, root);
        let ground = physics.add_infinite_plane(Vec4::new(0.0, 1.0, 0.0, 0.0), &MaterialInfo::fixed());
        scene
            .world_mut()
            .insert_one(ground_entity, PhysicsComponent { handle: ground })
            .map_err(|_| PhysicsError::UnknownHandle)?;
        physics.set_handle_parent(ground, ground_entity)?;

        let mut camera = Camera::new();
        camera.position = config.camera.position;
        camera.set_perspective(config.camera.fov_y, config.camera.near, config.camera.far);

        let camera_transform = Transform::from_position(camera.position);
        let camera_node = scene.create_node_with(camera_transform);
        scene.add_child(root, camera_node);
        let camera_handle =
            physics.add_sphere(&camera_transform, CAMERA_PROXY_RADIUS, &MaterialInfo::kinematic());
        let camera_entity = scene
            .world_mut()
            .spawn((PhysicsComponent { handle: camera_handle }, SceneNode(camera_node)));
        physics.set_handle_parent(camera_handle, camera_entity)?;
        physics.set_scene_node(camera_handle, camera_node)?;
        // Crosshair rays start inside the proxy
        physics.ignore_in_queries(camera_handle);

        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(EventKind::Keyboard, Self::on_key);
        dispatcher.register(EventKind::MouseButton, Self::on_mouse);
        dispatcher.register(EventKind::Collision, Self::on_collision);
        dispatcher.register(EventKind::Resized, Self::on_resize);

        let lighting = LightingParameters::from_config(&config.lighting);
        scene.update_cached_transforms();

        log::info!("Sandbox ready ({} bodies)", physics.body_count());
        Ok(Self {
            config,
            scene,
            physics,
            camera,
            lighting,
            bindings: InputMapper::with_defaults(),
            dispatcher,
            meshes: SandboxMeshes {
                cube: AssetHandle::new(Mesh::cube(CUBE_HALF_EXTENT)),
                cylinder: AssetHandle::new(Mesh::cylinder(CYLINDER_HALF_HEIGHT, CYLINDER_RADIUS, 16)),
                _ground: ground_mesh,
            },
            imported: None,
            camera_node,
            camera_handle,
            ground_entity,
            anti_gravity: false,
            visible: VisibilityList::new(),
        })
    }

    /// Take ownership of an imported model and register its collision shape.
    ///
    /// Returns the entity holding the extracted triangles. If the shape
    /// cannot be registered the model can still be drawn but the import
    /// action does nothing.
    pub fn set_imported_model(&mut self, model: ImportedModel) -> Entity {
        let shape = match self.physics.register_collision_mesh(&model.collision) {
            Ok(index) => Some(index),
            Err(e) => {
                log::warn!("No collision shape for imported model: {e}");
                None
            }
        };
        let entity = self.scene.world_mut().spawn((CollisionMeshComponent {
            mesh: model.collision,
            shape,
        },));
        if let Some(name) = model.name {
            let _ = self.scene.world_mut().insert_one(entity, Name::new(name));
        }
        self.imported = Some(ImportedAsset {
            mesh: AssetHandle::new(model.mesh),
            shape,
        });
        entity
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Deliver one event to its registered handler
    pub fn handle_event(&mut self, event: &EngineEvent) -> bool {
        match self.dispatcher.handler(event.kind()) {
            Some(handler) => handler(self, event),
            None => false,
        }
    }

    fn on_key(&mut self, event: &EngineEvent) -> bool {
        let EngineEvent::Keyboard { key, state } = *event else {
            return false;
        };
        let Some(action) = self.bindings.get_action(key) else {
            return false;
        };

        if action == SandboxAction::AntiGravity {
            self.anti_gravity = state.is_down();
            return true;
        }
        if !action.is_triggered() || state != KeyState::Pressed {
            return false;
        }

        let result = match action {
            SandboxAction::SpawnCube => self.spawn_cube().map(|e| e.is_some()),
            SandboxAction::SpawnCylinder => self.spawn_cylinder().map(|e| e.is_some()),
            SandboxAction::SpawnDumbbell => self.spawn_dumbbell().map(|e| e.is_some()),
            SandboxAction::SpawnImport => self.spawn_import().map(|e| e.is_some()),
            SandboxAction::Delete => Ok(self.delete_at_crosshair().is_some()),
            SandboxAction::Launch => Ok(self.launch() > 0),
            _ => Ok(false),
        };
        if let Err(e) = result {
            log::error!("{action:?} failed: {e}");
        }
        true
    }

    fn on_mouse(&mut self, event: &EngineEvent) -> bool {
        match *event {
            EngineEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            } => {
                self.poke();
                true
            }
            _ => false,
        }
    }

    fn on_collision(&mut self, event: &EngineEvent) -> bool {
        let EngineEvent::Collision { position, normal, .. } = *event else {
            return false;
        };
        log::info!("Pos: {:.3}, {:.3}, {:.3}", position.x, position.y, position.z);
        log::info!("N: {:.3}, {:.3}, {:.3}", normal.x, normal.y, normal.z);
        true
    }

    fn on_resize(&mut self, event: &EngineEvent) -> bool {
        let EngineEvent::Resized { width, height } = *event else {
            return false;
        };
        let camera = &self.config.camera;
        self.camera.set_aspect(width, height);
        self.camera.set_perspective(camera.fov_y, camera.near, camera.far);
        log::debug!("Viewport {width}x{height}");
        true
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    /// Closest body under the crosshair, ignoring the camera proxy
    pub fn cast_from_camera(&mut self) -> Option<RaycastHit> {
        let hit = self.physics.query_closest_hit_ray(
            self.camera.position,
            self.camera.forward(),
            self.config.ray_distance,
        );
        if hit.is_none() {
            log::trace!("Crosshair ray missed");
        }
        hit
    }

    /// Hit point of a crosshair ray that struck an entity-bound body
    fn spawn_point(&mut self) -> Option<Vec3> {
        self.cast_from_camera()
            .filter(|hit| hit.entity.is_some())
            .map(|hit| hit.world_pos)
    }

    /// Drop a cube above the crosshair hit
    ///
    /// # Errors
    ///
    /// Returns an error if the new body cannot be bound
    pub fn spawn_cube(&mut self) -> Result<Option<Entity>, PhysicsError> {
        let Some(point) = self.spawn_point() else {
            return Ok(None);
        };
        let position = point + Vec3::Y * self.config.spawn_height;
        let entity = spawn::spawn_cube(&mut self.scene, &mut self.physics, &self.meshes.cube, position)?;
        log::debug!("Spawned cube {entity:?} at {position}");
        Ok(Some(entity))
    }

    /// Drop a cylinder above the crosshair hit
    ///
    /// # Errors
    ///
    /// Returns an error if the new body cannot be bound
    pub fn spawn_cylinder(&mut self) -> Result<Option<Entity>, PhysicsError> {
        let Some(point) = self.spawn_point() else {
            return Ok(None);
        };
        let position = point + Vec3::Y * self.config.spawn_height;
        let entity = spawn::spawn_cylinder(
            &mut self.scene,
            &mut self.physics,
            &self.meshes.cylinder,
            position,
        )?;
        log::debug!("Spawned cylinder {entity:?} at {position}");
        Ok(Some(entity))
    }

    /// Drop a linked pair of cubes above the crosshair hit
    ///
    /// # Errors
    ///
    /// Returns an error if the bodies cannot be bound or joined
    pub fn spawn_dumbbell(&mut self) -> Result<Option<[Entity; 2]>, PhysicsError> {
        let Some(point) = self.spawn_point() else {
            return Ok(None);
        };
        let position = point + Vec3::Y * self.config.spawn_height;
        let pair = spawn::spawn_dumbbell(
            &mut self.scene,
            &mut self.physics,
            &self.meshes.cube,
            position,
            self.config.dumbbell_spacing,
        )?;
        log::debug!("Spawned dumbbell {pair:?} at {position}");
        Ok(Some(pair))
    }

    /// Place a static copy of the imported model on the crosshair hit
    ///
    /// # Errors
    ///
    /// Returns an error if the new body cannot be bound
    pub fn spawn_import(&mut self) -> Result<Option<Entity>, PhysicsError> {
        let Some((mesh, shape)) = self
            .imported
            .as_ref()
            .and_then(|model| model.shape.map(|shape| (model.mesh.clone(), shape)))
        else {
            log::warn!("Import requested but no collision mesh is registered");
            return Ok(None);
        };
        let Some(point) = self.spawn_point() else {
            return Ok(None);
        };
        let position = point + Vec3::Y * self.config.import_height;
        let entity = spawn::spawn_static_mesh(&mut self.scene, &mut self.physics, &mesh, shape, position)?;
        log::debug!("Placed imported model {entity:?} at {position}");
        Ok(Some(entity))
    }

    /// Destroy the entity under the crosshair.
    ///
    /// Bodies without a scene node (the ground) are left alone. The node is
    /// freed only if it has no children; a node with children stays in the
    /// tree after its entity is gone.
    pub fn delete_at_crosshair(&mut self) -> Option<Deletion> {
        let hit = self.cast_from_camera()?;
        let entity = hit.entity?;
        let node = self
            .physics
            .get_scene_node(hit.handle)
            .filter(|&node| self.scene.contains_node(node))?;

        let node_removed = self.scene.child_count(node) == 0;
        if node_removed {
            self.scene.remove_node_from_hierarchy(node);
        }
        self.physics.remove_body(hit.handle);
        self.scene.destroy_entity(entity);

        log::debug!("Deleted {entity:?} (node removed: {node_removed})");
        Some(Deletion {
            entity,
            node,
            node_removed,
        })
    }

    /// Push the body under the crosshair along the view direction.
    ///
    /// Returns false on a miss.
    pub fn poke(&mut self) -> bool {
        let Some(hit) = self.cast_from_camera().filter(|hit| hit.entity.is_some()) else {
            return false;
        };
        let impulse = self.camera.forward() * self.config.poke_impulse;
        self.physics
            .apply_impulse_at_point(hit.handle, impulse, hit.world_pos);
        true
    }

    /// Kick every body that has a scene node. Returns the number kicked.
    pub fn launch(&mut self) -> usize {
        let handles: Vec<PhysicsHandle> = self
            .scene
            .world()
            .query::<&PhysicsComponent>()
            .iter()
            .map(|(_, component)| component.handle)
            .filter(|&handle| self.physics.get_scene_node(handle).is_some())
            .collect();

        for &handle in &handles {
            self.physics
                .apply_impulse(handle, self.config.launch_impulse, self.config.launch_offset);
        }
        handles.len()
    }

    // ------------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------------

    fn move_camera(&mut self, dt: f32, input: &Input) {
        let held = |action| self.bindings.is_action_held(action, input);
        let axis = |positive, negative| match (held(positive), held(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        };

        let forward = axis(SandboxAction::MoveForward, SandboxAction::MoveBackward);
        let right = axis(SandboxAction::MoveRight, SandboxAction::MoveLeft);
        let up = axis(SandboxAction::MoveUp, SandboxAction::MoveDown);
        let yaw = axis(SandboxAction::LookLeft, SandboxAction::LookRight);
        let pitch = axis(SandboxAction::LookUp, SandboxAction::LookDown);

        let step = self.config.camera.move_speed * dt;
        let turn = self.config.camera.look_speed * dt;
        self.camera.move_forward(forward * step);
        self.camera.move_right(right * step);
        self.camera.move_up(up * step);
        if yaw != 0.0 || pitch != 0.0 {
            self.camera.rotate(yaw * turn, pitch * turn);
        }
    }

    fn apply_anti_gravity(&mut self) -> usize {
        if !self.anti_gravity {
            return 0;
        }
        let force = Vec3::Y * self.config.anti_gravity_force;
        let handles: Vec<PhysicsHandle> = self
            .scene
            .world()
            .query::<&PhysicsComponent>()
            .iter()
            .map(|(_, component)| component.handle)
            .collect();
        for &handle in &handles {
            self.physics.apply_force(handle, force);
        }
        handles.len()
    }

    /// Advance one frame of `dt` seconds.
    ///
    /// Moves the camera, applies anti-gravity, moves the camera proxy, steps
    /// physics, writes poses back into the scene, reports contacts and
    /// collects what the camera can see.
    pub fn update(&mut self, dt: f32, input: &Input) -> FrameSummary {
        self.move_camera(dt, input);
        let anti_gravity_targets = self.apply_anti_gravity();

        self.scene
            .set_node_transform(self.camera_node, Transform::from_position(self.camera.position));
        physics::push_kinematic_nodes(&mut self.physics, &self.scene);

        let substeps = self.physics.step(dt);
        physics::pull_dynamic_poses(&self.physics, &mut self.scene);
        self.scene.update_cached_transforms();

        let contacts = self.physics.drain_contacts();
        for contact in &contacts {
            self.handle_event(&EngineEvent::Collision {
                body_a: contact.body_a,
                body_b: contact.body_b,
                position: contact.position,
                normal: contact.normal,
            });
        }

        self.visible.clear();
        self.scene
            .gather_visible_opaque_renderables(&self.camera.frustum(), &mut self.visible);

        FrameSummary {
            anti_gravity_targets,
            substeps,
            contacts: contacts.len(),
            visible: self.visible.len(),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn lighting(&self) -> &LightingParameters {
        &self.lighting
    }

    /// Renderables gathered by the last `update`
    pub fn visible(&self) -> &[VisibleRenderable] {
        &self.visible
    }

    pub fn is_anti_gravity_active(&self) -> bool {
        self.anti_gravity
    }

    pub fn camera_node(&self) -> NodeId {
        self.camera_node
    }

    pub fn camera_handle(&self) -> PhysicsHandle {
        self.camera_handle
    }

    pub fn ground_entity(&self) -> Entity {
        self.ground_entity
    }

    /// Whether an imported model with a usable collision shape is loaded
    pub fn has_import_shape(&self) -> bool {
        self.imported.as_ref().is_some_and(|m| m.shape.is_some())
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::ecs::RenderableComponent;
    use crate::physics::{CollisionMesh, ObjectType};

    const DT: f32 = 1.0 / 60.0;

    fn sandbox() -> Sandbox {
        Sandbox::new(SandboxConfig::default()).unwrap()
    }

    /// Turn the camera towards `target`
    fn aim(sandbox: &mut Sandbox, target: Vec3) {
        let camera = sandbox.camera_mut();
        camera.direction = (target - camera.position).normalize();
    }

    fn press(sandbox: &mut Sandbox, key: KeyCode) -> bool {
        sandbox.handle_event(&EngineEvent::Keyboard {
            key,
            state: KeyState::Pressed,
        })
    }

    fn handle_of(sandbox: &Sandbox, entity: Entity) -> PhysicsHandle {
        sandbox
            .scene()
            .world()
            .get::<PhysicsComponent>(entity)
            .unwrap()
            .handle
    }

    fn count_renderables_of(sandbox: &Sandbox, mesh: &AssetHandle<Mesh>) -> usize {
        sandbox
            .scene()
            .world()
            .query::<&RenderableComponent>()
            .iter()
            .filter(|(_, r)| r.mesh == *mesh)
            .count()
    }

    fn run(sandbox: &mut Sandbox, frames: usize) {
        let input = Input::new();
        for _ in 0..frames {
            sandbox.update(DT, &input);
        }
    }

    /// A cube dropped from above the origin, one frame simulated
    fn sandbox_with_cube() -> (Sandbox, Entity) {
        let mut sandbox = sandbox();
        aim(&mut sandbox, Vec3::ZERO);
        let cube = sandbox.spawn_cube().unwrap().unwrap();
        run(&mut sandbox, 1);
        (sandbox, cube)
    }

    #[test]
    fn test_new_sandbox_has_ground_and_camera_proxy() {
        let sandbox = sandbox();
        assert_eq!(sandbox.scene().entity_count(), 2);
        assert_eq!(sandbox.physics().body_count(), 2);

        let ground = handle_of(&sandbox, sandbox.ground_entity());
        assert_eq!(sandbox.physics().get_handle_parent(ground), Some(sandbox.ground_entity()));
        assert_eq!(sandbox.physics().get_scene_node(ground), None);
        assert_eq!(
            sandbox.physics().object_type(sandbox.camera_handle()),
            Some(ObjectType::Kinematic)
        );
    }

    #[test]
    fn test_spawn_misses_leave_scene_unchanged() {
        let mut sandbox = sandbox();
        let above = sandbox.camera().position + Vec3::Y;
        aim(&mut sandbox, above);
        let before = sandbox.scene().entity_count();

        for key in [KeyCode::KeyO, KeyCode::KeyP, KeyCode::KeyK, KeyCode::KeyL] {
            press(&mut sandbox, key);
        }
        assert!(sandbox.delete_at_crosshair().is_none());
        assert!(!sandbox.poke());
        assert_eq!(sandbox.scene().entity_count(), before);
    }

    #[test]
    fn test_spawn_cube_above_hit() {
        let mut sandbox = sandbox();
        aim(&mut sandbox, Vec3::ZERO);
        let before = sandbox.scene().entity_count();

        assert!(press(&mut sandbox, KeyCode::KeyO));
        assert_eq!(sandbox.scene().entity_count(), before + 1);

        let cube = sandbox.spawn_cube().unwrap().unwrap();
        let handle = handle_of(&sandbox, cube);
        assert_eq!(sandbox.physics().get_handle_parent(handle), Some(cube));
        let (position, _) = sandbox.physics().body_pose(handle).unwrap();
        assert!(position.abs_diff_eq(Vec3::new(0.0, 20.0, 0.0), 1e-3));
    }

    #[test]
    fn test_spawn_cylinder_binds_entity() {
        let mut sandbox = sandbox();
        aim(&mut sandbox, Vec3::new(1.0, 0.0, 0.0));
        let before = sandbox.scene().entity_count();

        let cylinder = sandbox.spawn_cylinder().unwrap().unwrap();
        assert_eq!(sandbox.scene().entity_count(), before + 1);
        let handle = handle_of(&sandbox, cylinder);
        assert_eq!(sandbox.physics().get_handle_parent(handle), Some(cylinder));
        assert_eq!(count_renderables_of(&sandbox, &sandbox.meshes.cylinder), 1);
    }

    #[test]
    fn test_dumbbell_creates_two_linked_entities() {
        let mut sandbox = sandbox();
        aim(&mut sandbox, Vec3::ZERO);
        let before = sandbox.scene().entity_count();

        assert!(press(&mut sandbox, KeyCode::KeyK));
        assert_eq!(sandbox.scene().entity_count(), before + 2);
        assert_eq!(sandbox.physics().constraint_count(), 1);

        let bound: Vec<(Entity, PhysicsHandle)> = sandbox
            .scene()
            .world()
            .query::<(&PhysicsComponent, &RenderableComponent)>()
            .iter()
            .filter(|(_, (_, r))| r.mesh == sandbox.meshes.cube)
            .map(|(e, (p, _))| (e, p.handle))
            .collect();
        assert_eq!(bound.len(), 2);
        for (entity, handle) in bound {
            assert_eq!(sandbox.physics().get_handle_parent(handle), Some(entity));
        }
    }

    #[test]
    fn test_delete_leaf_removes_node_and_entity() {
        let (mut sandbox, cube) = sandbox_with_cube();
        let handle = handle_of(&sandbox, cube);
        let (position, _) = sandbox.physics().body_pose(handle).unwrap();
        aim(&mut sandbox, position);
        let before = sandbox.scene().entity_count();

        let deletion = sandbox.delete_at_crosshair().unwrap();
        assert_eq!(deletion.entity, cube);
        assert!(deletion.node_removed);
        assert!(!sandbox.scene().contains_node(deletion.node));
        assert!(!sandbox.scene().world().contains(cube));
        assert!(!sandbox.physics().contains(handle));
        assert_eq!(sandbox.scene().entity_count(), before - 1);
    }

    #[test]
    fn test_delete_keeps_node_with_children() {
        let mut sandbox = sandbox();
        aim(&mut sandbox, Vec3::ZERO);
        let [left, _] = sandbox.spawn_dumbbell().unwrap().unwrap();
        run(&mut sandbox, 1);

        let (position, _) = sandbox.physics().body_pose(handle_of(&sandbox, left)).unwrap();
        aim(&mut sandbox, position);
        let deletion = sandbox.delete_at_crosshair().unwrap();

        assert_eq!(deletion.entity, left);
        assert!(!deletion.node_removed);
        assert!(sandbox.scene().contains_node(deletion.node));
        assert_eq!(sandbox.scene().child_count(deletion.node), 1);
        assert!(!sandbox.scene().world().contains(left));
        assert_eq!(sandbox.physics().constraint_count(), 0);
    }

    #[test]
    fn test_delete_ignores_ground() {
        let mut sandbox = sandbox();
        aim(&mut sandbox, Vec3::ZERO);
        let before = sandbox.scene().entity_count();

        assert!(sandbox.delete_at_crosshair().is_none());
        assert_eq!(sandbox.scene().entity_count(), before);
        assert!(sandbox.scene().world().contains(sandbox.ground_entity()));
    }

    #[test]
    fn test_anti_gravity_is_level_sensitive() {
        let (mut sandbox, cube) = sandbox_with_cube();
        let bound = sandbox.scene().world().entities_with::<PhysicsComponent>().len();
        let input = Input::new();

        assert_eq!(sandbox.update(DT, &input).anti_gravity_targets, 0);

        let held = |state| EngineEvent::Keyboard {
            key: KeyCode::KeyM,
            state,
        };
        sandbox.handle_event(&held(KeyState::Pressed));
        assert_eq!(sandbox.update(DT, &input).anti_gravity_targets, bound);
        sandbox.handle_event(&held(KeyState::Repeat));
        for _ in 0..10 {
            assert_eq!(sandbox.update(DT, &input).anti_gravity_targets, bound);
        }
        // 300 up on 10 kg beats gravity
        let velocity = sandbox.physics().linear_velocity(handle_of(&sandbox, cube)).unwrap();
        assert!(velocity.y > 0.0);

        sandbox.handle_event(&held(KeyState::Released));
        assert!(!sandbox.is_anti_gravity_active());
        assert_eq!(sandbox.update(DT, &input).anti_gravity_targets, 0);
    }

    #[test]
    fn test_camera_proxy_follows_camera() {
        let mut sandbox = sandbox();
        let mut input = Input::new();
        input.process_key(KeyCode::KeyW, KeyState::Pressed);
        input.process_key(KeyCode::KeyE, KeyState::Pressed);

        for _ in 0..5 {
            sandbox.update(DT, &input);
            let camera = sandbox.camera().position;
            let node = sandbox.scene().node_transform(sandbox.camera_node()).unwrap();
            assert_eq!(node.position, camera);
            let (proxy, _) = sandbox.physics().body_pose(sandbox.camera_handle()).unwrap();
            assert!(proxy.abs_diff_eq(camera, 1e-4));
        }
        assert!(sandbox.camera().position.y > 2.0);
        assert!(sandbox.camera().position.z < 8.0);
    }

    #[test]
    fn test_cube_settles_on_ground() {
        let (mut sandbox, cube) = sandbox_with_cube();
        run(&mut sandbox, 600);

        let (position, _) = sandbox.physics().body_pose(handle_of(&sandbox, cube)).unwrap();
        assert!((position.y - CUBE_HALF_EXTENT).abs() < 0.05, "rested at {position}");

        let node = sandbox
            .physics()
            .get_scene_node(handle_of(&sandbox, cube))
            .unwrap();
        let transform = sandbox.scene().node_transform(node).unwrap();
        assert!(transform.position.abs_diff_eq(position, 1e-4));
    }

    #[test]
    fn test_poke_pushes_along_view() {
        let (mut sandbox, cube) = sandbox_with_cube();
        let handle = handle_of(&sandbox, cube);
        let (position, _) = sandbox.physics().body_pose(handle).unwrap();
        aim(&mut sandbox, position);
        let before = sandbox.physics().linear_velocity(handle).unwrap();

        assert!(sandbox.handle_event(&EngineEvent::MouseButton {
            button: MouseButton::Left,
            pressed: true,
        }));
        let after = sandbox.physics().linear_velocity(handle).unwrap();
        assert!((after - before).dot(sandbox.camera().forward()) > 1.0);
    }

    #[test]
    fn test_launch_kicks_scene_bound_bodies() {
        let (mut sandbox, cube) = sandbox_with_cube();
        let handle = handle_of(&sandbox, cube);
        let before = sandbox.physics().linear_velocity(handle).unwrap();

        assert!(press(&mut sandbox, KeyCode::Space));
        let after = sandbox.physics().linear_velocity(handle).unwrap();
        assert!(after.y - before.y > 1.0);
        assert!(after.z < before.z);
    }

    #[test]
    fn test_import_requires_registered_shape() {
        let mut sandbox = sandbox();
        aim(&mut sandbox, Vec3::ZERO);
        let before = sandbox.scene().entity_count();
        assert_eq!(sandbox.spawn_import().unwrap(), None);
        assert_eq!(sandbox.scene().entity_count(), before);

        let mesh = Mesh::cube(0.5);
        let collision = CollisionMesh::from_triangle_list(mesh.positions().collect(), &mesh.indices);
        let holder = sandbox.set_imported_model(ImportedModel {
            name: Some("crate".to_string()),
            mesh,
            collision,
        });
        assert!(sandbox.has_import_shape());
        assert_eq!(sandbox.scene().world().get::<Name>(holder).unwrap().0, "crate");

        let entity = sandbox.spawn_import().unwrap().unwrap();
        let handle = handle_of(&sandbox, entity);
        assert_eq!(sandbox.physics().object_type(handle), Some(ObjectType::Static));
        let (position, _) = sandbox.physics().body_pose(handle).unwrap();
        assert!(position.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-3));
    }

    #[test]
    fn test_import_with_bad_mesh_registers_nothing() {
        let mut sandbox = sandbox();
        let entity = sandbox.set_imported_model(ImportedModel {
            name: None,
            mesh: Mesh::cube(0.5),
            collision: CollisionMesh::from_triangle_list(Vec::new(), &[]),
        });
        assert!(!sandbox.has_import_shape());
        assert_eq!(sandbox.physics().collision_mesh_count(), 0);
        let component = sandbox
            .scene()
            .world()
            .get::<CollisionMeshComponent>(entity)
            .unwrap();
        assert!(component.shape.is_none());
    }

    #[test]
    fn test_resize_sets_projection() {
        let mut sandbox = sandbox();
        assert!(sandbox.handle_event(&EngineEvent::Resized {
            width: 1920,
            height: 1080,
        }));
        let camera = sandbox.camera();
        assert!((camera.aspect - 1920.0 / 1080.0).abs() < 1e-5);
        assert!((camera.fov - 0.4 * std::f32::consts::PI).abs() < 1e-5);
        assert_eq!((camera.near, camera.far), (0.1, 500.0));
    }

    #[test]
    fn test_falling_cube_reports_contact() {
        let (mut sandbox, _) = sandbox_with_cube();
        let input = Input::new();
        let contacts: usize = (0..240).map(|_| sandbox.update(DT, &input).contacts).sum();
        assert!(contacts >= 1);
    }

    #[test]
    fn test_ground_and_cube_are_visible() {
        let (mut sandbox, _) = sandbox_with_cube();
        aim(&mut sandbox, Vec3::new(0.0, 10.0, 0.0));
        let summary = sandbox.update(DT, &Input::new());
        assert_eq!(summary.visible, 2);
    }
}
