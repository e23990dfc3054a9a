//! Shared asset handles
//!
//! Meshes are shared between many renderables; the GPU side keys its buffers
//! by [`AssetId`] and holds only weak handles, so buffers can be evicted once
//! the last renderable using a mesh is gone.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static NEXT_ASSET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(u64);

impl AssetId {
    fn next() -> Self {
        Self(NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// Strong, cheaply cloned handle to an immutable asset.
#[derive(Debug)]
pub struct AssetHandle<T> {
    id: AssetId,
    inner: Arc<T>,
}

impl<T> AssetHandle<T> {
    /// Take ownership of `value` under a fresh id
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            id: AssetId::next(),
            inner: Arc::new(value),
        }
    }

    #[must_use]
    pub const fn id(&self) -> AssetId {
        self.id
    }

    /// Handle that does not keep the asset alive
    #[must_use]
    pub fn downgrade(&self) -> WeakAssetHandle<T> {
        WeakAssetHandle {
            id: self.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Number of strong handles, this one included
    #[must_use]
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> std::ops::Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Weak counterpart of [`AssetHandle`].
#[derive(Debug)]
pub struct WeakAssetHandle<T> {
    id: AssetId,
    inner: Weak<T>,
}

impl<T> WeakAssetHandle<T> {
    #[must_use]
    pub const fn id(&self) -> AssetId {
        self.id
    }

    /// Strong handle, or `None` once every strong handle was dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<AssetHandle<T>> {
        self.inner
            .upgrade()
            .map(|inner| AssetHandle { id: self.id, inner })
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T> Clone for WeakAssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_id() {
        let a = AssetHandle::new(vec![1_u32, 2, 3]);
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a.strong_count(), 2);
        assert_eq!(b.len(), 3);

        let c = AssetHandle::new(vec![1_u32, 2, 3]);
        assert_ne!(a, c);
        assert!(a.id() < c.id());
    }

    #[test]
    fn test_weak_handle_dies_with_last_strong() {
        let strong = AssetHandle::new("mesh".to_string());
        let weak = strong.downgrade();
        assert_eq!(weak.id(), strong.id());

        let second = weak.upgrade().unwrap();
        drop(strong);
        assert!(weak.is_alive());

        drop(second);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }
}
