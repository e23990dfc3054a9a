//! Entity Component System module
//!
//! Built on top of the hecs ECS library

mod components;
mod hierarchy;
mod scene;
mod world;

pub use components::{
    CollisionMeshComponent, Name, PhysicsComponent, RenderableComponent, SceneNode, Transform,
};
pub use hierarchy::{Children, GlobalTransform, NodeId, Parent};
pub use scene::{Scene, VisibilityList, VisibleRenderable};
pub use world::World;
