//! Interactive rigid-body sandbox
//!
//! Spawn cubes, cylinders, linked dumbbells and copies of an imported model
//! by casting a ray from a free-fly camera, then poke, launch or delete them.
//!
//! The crate provides:
//! - A headless [`sandbox::Sandbox`] controller over the scene and physics
//! - Forward rendering with wgpu
//! - A node hierarchy and entity pool on top of hecs
//! - Physics simulation with rapier3d
//! - Input handling with winit

pub mod assets;
pub mod core;
pub mod ecs;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod sandbox;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;
pub use wgpu;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{
        Engine, EngineConfig, EngineContext, EngineEvent, Game, KeyState, SandboxConfig,
    };
    pub use crate::ecs::{PhysicsComponent, Scene, SceneNode, Transform};
    pub use crate::input::{Input, InputMapper, SandboxAction};
    pub use crate::physics::{MaterialInfo, ObjectType, Physics, PhysicsHandle};
    pub use crate::renderer::{Camera, Material, Mesh, Renderer};
    pub use crate::sandbox::{Sandbox, SandboxApp, create_application};
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::keyboard::KeyCode;
}
