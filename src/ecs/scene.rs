//! Scene: a transform hierarchy of nodes plus the entity pool
//!
//! Nodes and entities live in separate hecs worlds. Nodes own the transform
//! tree (a parent owns its children); entities are component bags that point
//! at a node through [`SceneNode`]. Destroying an entity never touches its
//! node, and removing a node never destroys entities, so callers decide the
//! order.

use glam::Mat4;
use hecs::Entity;

use super::components::{RenderableComponent, SceneNode, Transform};
use super::hierarchy::{Children, GlobalTransform, NodeId, Parent};
use super::world::World;
use crate::assets::AssetHandle;
use crate::renderer::{Frustum, Mesh};

/// A renderable that survived frustum culling this frame
#[derive(Debug, Clone)]
pub struct VisibleRenderable {
    /// Mesh to draw
    pub mesh: AssetHandle<Mesh>,
    /// World transform of the mesh
    pub transform: Mat4,
}

/// Visible renderables collected for one frame
pub type VisibilityList = Vec<VisibleRenderable>;

/// Node tree and entity pool
pub struct Scene {
    /// Entity pool
    entities: World,
    /// Node storage
    nodes: hecs::World,
    /// Root of the transform tree
    root: Option<NodeId>,
}

impl Scene {
    /// Create an empty scene with no root
    pub fn new() -> Self {
        Self {
            entities: World::new(),
            nodes: hecs::World::new(),
            root: None,
        }
    }

    // ------------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------------

    /// Create a detached node at the origin
    pub fn create_node(&mut self) -> NodeId {
        self.create_node_with(Transform::default())
    }

    /// Create a detached node with a local transform
    pub fn create_node_with(&mut self, transform: Transform) -> NodeId {
        NodeId(self.nodes.spawn((
            transform,
            GlobalTransform::new(transform.matrix()),
            Children::new(),
        )))
    }

    /// Make `node` the root of the transform tree
    pub fn set_root_node(&mut self, node: NodeId) {
        self.root = Some(node);
    }

    /// The root node, if one was set
    pub fn root_node(&self) -> Option<NodeId> {
        self.root
    }

    /// Check whether a node is alive
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> u32 {
        self.nodes.len()
    }

    /// Attach `child` under `parent`, detaching it from any previous parent.
    ///
    /// Returns false if either node is dead or the link would form a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.contains_node(parent) || !self.contains_node(child) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            return false;
        }

        self.detach(child);
        if let Ok(mut children) = self.nodes.get::<&mut Children>(parent.0) {
            children.add(child);
        }
        self.nodes.insert_one(child.0, Parent::new(parent)).is_ok()
    }

    /// Parent of a node
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get::<&Parent>(node.0).ok().map(|p| p.node())
    }

    /// Children of a node
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get::<&Children>(node.0)
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of children of a node (0 for dead nodes)
    pub fn child_count(&self, node: NodeId) -> usize {
        self.nodes
            .get::<&Children>(node.0)
            .map(|c| c.len())
            .unwrap_or(0)
    }

    /// Local transform of a node
    pub fn node_transform(&self, node: NodeId) -> Option<Transform> {
        self.nodes.get::<&Transform>(node.0).ok().map(|t| *t)
    }

    /// Overwrite the local transform of a node
    pub fn set_node_transform(&mut self, node: NodeId, transform: Transform) -> bool {
        match self.nodes.get::<&mut Transform>(node.0) {
            Ok(mut local) => {
                *local = transform;
                true
            }
            Err(_) => false,
        }
    }

    /// Cached world transform from the last `update_cached_transforms`
    pub fn global_transform(&self, node: NodeId) -> Option<GlobalTransform> {
        self.nodes.get::<&GlobalTransform>(node.0).ok().map(|g| *g)
    }

    /// World matrix computed from the current local transforms, ignoring
    /// the cache
    pub fn world_matrix(&self, node: NodeId) -> Option<Mat4> {
        let mut matrix = self.node_transform(node)?.matrix();
        let mut current = self.parent(node);
        while let Some(parent) = current {
            matrix = self.node_transform(parent)?.matrix() * matrix;
            current = self.parent(parent);
        }
        Some(matrix)
    }

    /// Attach a decoration renderable to a node
    pub fn attach_renderable(&mut self, node: NodeId, mesh: &AssetHandle<Mesh>) -> bool {
        self.nodes
            .insert_one(node.0, RenderableComponent::new(mesh))
            .is_ok()
    }

    /// Unlink a node from its parent and free it together with its subtree.
    ///
    /// Returns the number of nodes freed.
    pub fn remove_node_from_hierarchy(&mut self, node: NodeId) -> usize {
        if !self.contains_node(node) {
            return 0;
        }
        self.detach(node);
        if self.root == Some(node) {
            self.root = None;
        }

        let mut freed = 0;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            stack.extend(self.children(current));
            if self.nodes.despawn(current.0).is_ok() {
                freed += 1;
            }
        }
        freed
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Ok(mut children) = self.nodes.get::<&mut Children>(parent.0) {
            children.remove(node);
        }
        let _ = self.nodes.remove_one::<Parent>(node.0);
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Recompute cached world transforms for the tree under the root
    pub fn update_cached_transforms(&mut self) {
        let Some(root) = self.root else {
            return;
        };

        let mut stack = vec![(root, Mat4::IDENTITY)];
        while let Some((node, parent_matrix)) = stack.pop() {
            let Some(local) = self.node_transform(node) else {
                continue;
            };
            let matrix = parent_matrix * local.matrix();
            if let Ok(mut global) = self.nodes.get::<&mut GlobalTransform>(node.0) {
                global.matrix = matrix;
            }
            stack.extend(self.children(node).into_iter().map(|child| (child, matrix)));
        }
    }

    // ------------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------------

    /// Create an entity that draws `mesh` at `node`
    pub fn create_renderable(&mut self, mesh: &AssetHandle<Mesh>, node: NodeId) -> Entity {
        self.entities
            .spawn((RenderableComponent::new(mesh), SceneNode(node)))
    }

    /// Destroy an entity and all its components
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        self.entities.despawn(entity).is_ok()
    }

    /// Number of live entities
    pub fn entity_count(&self) -> u32 {
        self.entities.len()
    }

    /// The entity pool
    pub fn world(&self) -> &World {
        &self.entities
    }

    /// The entity pool, mutably
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.entities
    }

    // ------------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------------

    /// Append every renderable whose world bounds intersect `frustum`
    pub fn gather_visible_opaque_renderables(&self, frustum: &Frustum, out: &mut VisibilityList) {
        let mut push_if_visible = |renderable: &RenderableComponent, matrix: Mat4| {
            let bounds = renderable.mesh.aabb.transformed(&matrix);
            if frustum.intersects_aabb(&bounds) {
                out.push(VisibleRenderable {
                    mesh: renderable.mesh.clone(),
                    transform: matrix,
                });
            }
        };

        for (_, (renderable, node)) in self
            .entities
            .query::<(&RenderableComponent, &SceneNode)>()
            .iter()
        {
            if let Some(global) = self.global_transform(node.0) {
                push_if_visible(renderable, global.matrix);
            }
        }

        for (_, (renderable, global)) in self
            .nodes
            .query::<(&RenderableComponent, &GlobalTransform)>()
            .iter()
        {
            push_if_visible(renderable, global.matrix);
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Camera;
    use glam::Vec3;

    fn scene_with_root() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let root = scene.create_node();
        scene.set_root_node(root);
        (scene, root)
    }

    #[test]
    fn test_add_child_and_reparent() {
        let (mut scene, root) = scene_with_root();
        let a = scene.create_node();
        let b = scene.create_node();

        assert!(scene.add_child(root, a));
        assert!(scene.add_child(root, b));
        assert_eq!(scene.child_count(root), 2);

        assert!(scene.add_child(a, b));
        assert_eq!(scene.child_count(root), 1);
        assert_eq!(scene.parent(b), Some(a));
    }

    #[test]
    fn test_add_child_rejects_cycles() {
        let (mut scene, root) = scene_with_root();
        let a = scene.create_node();
        scene.add_child(root, a);

        assert!(!scene.add_child(a, root));
        assert!(!scene.add_child(a, a));
    }

    #[test]
    fn test_remove_node_frees_subtree() {
        let (mut scene, root) = scene_with_root();
        let a = scene.create_node();
        let b = scene.create_node();
        scene.add_child(root, a);
        scene.add_child(a, b);

        assert_eq!(scene.remove_node_from_hierarchy(a), 2);
        assert!(!scene.contains_node(a));
        assert!(!scene.contains_node(b));
        assert_eq!(scene.child_count(root), 0);
        assert_eq!(scene.node_count(), 1);
        assert_eq!(scene.remove_node_from_hierarchy(a), 0);
    }

    #[test]
    fn test_cached_transforms_compose_parent_first() {
        let (mut scene, root) = scene_with_root();
        scene.set_node_transform(root, Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
        let arm = scene.create_node_with(
            Transform::from_position(Vec3::new(1.75, 0.0, 0.0)).with_scale(Vec3::splat(0.5)),
        );
        scene.add_child(root, arm);

        scene.update_cached_transforms();

        let global = scene.global_transform(arm).unwrap();
        assert!(global.position().abs_diff_eq(Vec3::new(1.75, 1.0, 0.0), 1e-5));
        assert!(
            scene
                .world_matrix(arm)
                .unwrap()
                .abs_diff_eq(global.matrix, 1e-5)
        );
    }

    #[test]
    fn test_entity_lifecycle_leaves_node() {
        let (mut scene, root) = scene_with_root();
        let mesh = AssetHandle::new(Mesh::cube(1.0));
        let node = scene.create_node();
        scene.add_child(root, node);

        let entity = scene.create_renderable(&mesh, node);
        assert_eq!(scene.entity_count(), 1);

        assert!(scene.destroy_entity(entity));
        assert!(!scene.destroy_entity(entity));
        assert_eq!(scene.entity_count(), 0);
        assert!(scene.contains_node(node));
    }

    #[test]
    fn test_gather_culls_behind_camera() {
        let (mut scene, root) = scene_with_root();
        let mesh = AssetHandle::new(Mesh::cube(1.0));

        let in_front = scene.create_node_with(Transform::from_position(Vec3::new(0.0, 0.0, -10.0)));
        let behind = scene.create_node_with(Transform::from_position(Vec3::new(0.0, 0.0, 10.0)));
        scene.add_child(root, in_front);
        scene.add_child(root, behind);
        scene.create_renderable(&mesh, in_front);
        scene.create_renderable(&mesh, behind);
        scene.attach_renderable(in_front, &mesh);
        scene.update_cached_transforms();

        let mut camera = Camera::new();
        camera.position = Vec3::ZERO;
        camera.direction = Vec3::NEG_Z;

        let mut visible = VisibilityList::new();
        scene.gather_visible_opaque_renderables(&camera.frustum(), &mut visible);

        assert_eq!(visible.len(), 2);
        for item in &visible {
            assert!(item.transform.col(3).z < 0.0);
        }
    }
}
