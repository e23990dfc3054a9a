//! Asset loading and shared handles

mod gltf;
mod handle;

pub use self::gltf::{AssetError, DEFAULT_MODEL_COLOR, ImportedModel, load_gltf};
pub use handle::{AssetHandle, AssetId, WeakAssetHandle};
