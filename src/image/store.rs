//! Shared, swap-on-load image map.

use std::sync::{Arc, Mutex, MutexGuard};

use super::codec::{self, ImageMap, Placeholder};

/// Handle to the session's image map.
///
/// Readers take an immutable snapshot; a load builds a fresh map and swaps it
/// in whole, so a render never observes a half-rebuilt map.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    inner: Arc<Mutex<Arc<ImageMap>>>,
}

impl ImageStore {
    /// Create a store holding `map`.
    pub fn new(map: ImageMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Arc::new(map))),
        }
    }

    /// The current map.
    pub fn snapshot(&self) -> Arc<ImageMap> {
        Arc::clone(&*self.lock())
    }

    /// Replace the whole map (the load path).
    pub fn replace(&self, map: ImageMap) {
        *self.lock() = Arc::new(map);
    }

    /// Encode `bytes` under the next label.
    pub fn encode(&self, bytes: &[u8]) -> Placeholder {
        let mut guard = self.lock();
        codec::encode(Arc::make_mut(&mut *guard), bytes)
    }

    /// Encode an existing data URI under the next label.
    pub fn encode_uri(&self, uri: String) -> Placeholder {
        let mut guard = self.lock();
        codec::encode_uri(Arc::make_mut(&mut *guard), uri)
    }

    /// Number of images currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no images.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Arc<ImageMap>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageLabel;

    #[test]
    fn test_store_new_is_empty() {
        let store = ImageStore::default();
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_encode() {
        let store = ImageStore::default();
        store.encode(b"one");
        let before = store.snapshot();
        store.encode(b"two");
        assert_eq!(before.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_swaps_whole_map() {
        let store = ImageStore::default();
        store.encode(b"one");
        store.encode(b"two");

        let mut fresh = ImageMap::new();
        fresh.insert(ImageLabel::new(7), "data:x;base64,");
        store.replace(fresh);

        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(snap.contains(ImageLabel::new(7)));
    }

    #[test]
    fn test_clones_share_the_map() {
        let store = ImageStore::default();
        let other = store.clone();
        other.encode(b"shared");
        assert_eq!(store.len(), 1);
    }
}
