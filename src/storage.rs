//! Storage key construction.
//!
//! The key of a storage value is `twox128(prefix) ++ twox128(entry)`, followed
//! by one hashed component per key of the entry. Key material must already be
//! SCALE encoded by the caller.

use crate::hasher::HashAlgorithm;
use crate::query::QueryError;
use crate::version::{MetadataV13, StorageEntryMetadata};

/// The key prefix shared by all values of a storage entry.
pub fn storage_prefix(prefix: &str, entry: &str) -> Vec<u8> {
    let mut key = HashAlgorithm::DEFAULT.hash(prefix.as_bytes());
    key.extend(HashAlgorithm::DEFAULT.hash(entry.as_bytes()));
    key
}

impl StorageEntryMetadata {
    /// Builds the storage key of the entry under the given storage prefix. The
    /// number of keys must match [`StorageEntryMetadata::key_count`].
    pub fn storage_key<K: AsRef<[u8]>>(
        &self,
        prefix: &str,
        keys: &[K],
    ) -> Result<Vec<u8>, QueryError> {
        if keys.len() != self.key_count() {
            return Err(QueryError::KeyCountMismatch {
                entry: self.name.clone(),
                expected: self.key_count(),
                got: keys.len(),
            });
        }

        let mut out = storage_prefix(prefix, &self.name);
        for (position, key) in keys.iter().enumerate() {
            out.extend(self.hasher_at(position)?.hash(key.as_ref()));
        }

        Ok(out)
    }
}

impl MetadataV13 {
    /// Looks up the storage entry and builds its storage key, see
    /// [`StorageEntryMetadata::storage_key`].
    pub fn storage_key<K: AsRef<[u8]>>(
        &self,
        prefix: &str,
        entry: &str,
        keys: &[K],
    ) -> Result<Vec<u8>, QueryError> {
        self.find_storage_entry(prefix, entry)?.storage_key(prefix, keys)
    }
}
