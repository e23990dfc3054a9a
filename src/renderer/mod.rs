//! Rendering module
//!
//! CPU meshes and culling are usable headless; `Renderer` needs a window.

mod camera;
mod context;
mod frustum;
mod material;
mod mesh;
mod texture;

pub use camera::Camera;
pub use context::{LightingParameters, ModelUniform, RenderError, Renderer};
pub use frustum::{Aabb, Frustum};
pub use material::{Material, MaterialTexture, MaterialUniform};
pub use mesh::{Mesh, Vertex};
pub use texture::Texture;
