//! Body material and motion type

use rapier3d::prelude::*;

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectType {
    /// Moved by forces, impulses, and contacts
    #[default]
    Dynamic,
    /// Moved only by setting its pose; pushes dynamic bodies, ignores forces
    Kinematic,
    /// Never moves
    Static,
}

/// Per-body physical parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialInfo {
    /// Total mass of the body (ignored for non-dynamic bodies)
    pub mass: f32,
    /// Bounciness, 0 = no bounce
    pub restitution: f32,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Linear velocity damping
    pub linear_damping: f32,
    /// Angular velocity damping
    pub angular_damping: f32,
    /// Motion type
    pub object_type: ObjectType,
}

impl Default for MaterialInfo {
    fn default() -> Self {
        Self {
            mass: 1.0,
            restitution: 0.5,
            friction: 0.5,
            linear_damping: 0.1,
            angular_damping: 0.1,
            object_type: ObjectType::Dynamic,
        }
    }
}

impl MaterialInfo {
    /// Dynamic body of the given mass
    pub fn dynamic(mass: f32) -> Self {
        Self {
            mass,
            ..Default::default()
        }
    }

    /// Kinematic body
    pub fn kinematic() -> Self {
        Self {
            object_type: ObjectType::Kinematic,
            ..Default::default()
        }
    }

    /// Static body
    pub fn fixed() -> Self {
        Self {
            object_type: ObjectType::Static,
            ..Default::default()
        }
    }

    /// Set restitution
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set linear and angular damping
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub(crate) fn body_builder(&self, position: Isometry<Real>) -> RigidBodyBuilder {
        let builder = match self.object_type {
            ObjectType::Dynamic => RigidBodyBuilder::dynamic(),
            ObjectType::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            ObjectType::Static => RigidBodyBuilder::fixed(),
        };
        builder
            .position(position)
            .linear_damping(self.linear_damping)
            .angular_damping(self.angular_damping)
    }

    pub(crate) fn collider_builder(&self, builder: ColliderBuilder) -> ColliderBuilder {
        let builder = builder
            .restitution(self.restitution)
            .friction(self.friction);
        match self.object_type {
            ObjectType::Dynamic => builder
                .mass(self.mass)
                .active_events(ActiveEvents::COLLISION_EVENTS),
            ObjectType::Kinematic | ObjectType::Static => builder,
        }
    }
}
