//! Physics simulation module
//!
//! Built on top of rapier3d

mod material;
mod shape;
mod sync;
mod world;

pub use material::{MaterialInfo, ObjectType};
pub use shape::{CollisionMesh, CollisionMeshIndex};
pub use sync::{pull_dynamic_poses, push_kinematic_nodes};
pub use world::{ConstraintHandle, ContactEvent, Physics, PhysicsError, PhysicsHandle, RaycastHit};
