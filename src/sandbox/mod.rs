//! Interactive physics sandbox
//!
//! [`Sandbox`] holds all scene and simulation state and runs headless;
//! [`SandboxApp`] plugs it into the windowed engine loop.

mod app;
mod controller;
mod spawn;

pub use app::{SandboxApp, SandboxError, create_application};
pub use controller::{Deletion, FrameSummary, Sandbox};
pub use spawn::{
    CUBE_HALF_EXTENT, CYLINDER_HALF_HEIGHT, CYLINDER_RADIUS, cube_material, cylinder_material,
    spawn_cube, spawn_cylinder, spawn_dumbbell, spawn_static_mesh,
};
