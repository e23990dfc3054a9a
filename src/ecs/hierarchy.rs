//! Scene node hierarchy components
//!
//! Nodes live in their own hecs world inside [`Scene`](super::Scene). Each one
//! carries a local [`Transform`](super::Transform), a cached
//! [`GlobalTransform`], a [`Children`] list, and (unless it is a root or
//! detached) a [`Parent`].

use glam::{Mat4, Vec3};
use hecs::Entity;
use smallvec::SmallVec;

/// Identifier of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) Entity);

impl NodeId {
    /// The underlying node-world entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Parent component - indicates this node has a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub NodeId);

impl Parent {
    /// Create a new parent reference
    #[must_use]
    pub const fn new(node: NodeId) -> Self {
        Self(node)
    }

    /// Get the parent node
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.0
    }
}

/// Children component - owned child nodes
#[derive(Debug, Clone, Default)]
pub struct Children(pub SmallVec<[NodeId; 8]>);

impl Children {
    /// Create an empty children list
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Add a child
    pub fn add(&mut self, child: NodeId) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child
    pub fn remove(&mut self, child: NodeId) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    /// Check if this node has children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over children
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.0.iter()
    }
}

/// Global transform - cached world-space transform of a node
#[derive(Debug, Clone, Copy)]
pub struct GlobalTransform {
    /// World-space transformation matrix
    pub matrix: Mat4,
}

impl GlobalTransform {
    /// Create from a transformation matrix
    #[must_use]
    pub const fn new(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Create identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    /// Get world position
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.matrix.col(3).truncate()
    }

}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_add_remove() {
        let mut world = hecs::World::new();
        let node1 = NodeId(world.spawn(()));
        let node2 = NodeId(world.spawn(()));

        let mut children = Children::new();

        children.add(node1);
        children.add(node2);
        assert_eq!(children.len(), 2);

        // No duplicates
        children.add(node1);
        assert_eq!(children.len(), 2);

        assert!(children.remove(node1));
        assert!(!children.remove(node1));
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_global_transform_position() {
        let transform = GlobalTransform::new(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
        assert!(transform.position().abs_diff_eq(Vec3::new(1.0, 2.0, 3.0), 1e-5));
    }
}
