use crate::version::MetadataV13;
use parking_lot::RwLock;
use std::sync::Arc;

/// A handle to the current metadata document of a chain connection.
///
/// Readers take a snapshot with [`SharedMetadata::current`] and keep using it
/// for as long as they need to, without holding a lock. A new document (e.g.
/// after a runtime upgrade) is only published once fully decoded, and replaces
/// the previous one in a single step.
#[derive(Debug, Clone)]
pub struct SharedMetadata {
    inner: Arc<RwLock<Arc<MetadataV13>>>,
}

impl SharedMetadata {
    pub fn new(metadata: MetadataV13) -> Self {
        SharedMetadata {
            inner: Arc::new(RwLock::new(Arc::new(metadata))),
        }
    }
    /// Returns the current document.
    pub fn current(&self) -> Arc<MetadataV13> {
        Arc::clone(&self.inner.read())
    }
    /// Publishes a new document and returns the previous one.
    pub fn replace(&self, metadata: MetadataV13) -> Arc<MetadataV13> {
        let metadata = Arc::new(metadata);
        log::debug!(
            "Replacing runtime metadata ({} modules)",
            metadata.modules.len()
        );

        std::mem::replace(&mut *self.inner.write(), metadata)
    }
}

impl From<MetadataV13> for SharedMetadata {
    fn from(val: MetadataV13) -> Self {
        SharedMetadata::new(val)
    }
}
