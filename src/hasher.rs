//! Selection of the hash algorithm applied to storage key material.

use crate::query::QueryError;
use crate::version::{StorageEntryMetadata, StorageEntryType, StorageHasher};
use blake2_rfc::blake2b::blake2b;
use std::hash::Hasher as _;
use twox_hash::XxHash64;

/// A concrete hash algorithm. `width` is the digest width in bits. The
/// concatenating variants append the unhashed key material to the digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HashAlgorithm {
    Blake2 { width: usize, concat: bool },
    Twox { width: usize, concat: bool },
    Identity,
}

impl HashAlgorithm {
    /// 128-bit xxHash, used for module and entry prefixes and for entries
    /// without keys.
    pub const DEFAULT: HashAlgorithm = HashAlgorithm::Twox {
        width: 128,
        concat: false,
    };

    /// Length of the digest in bytes, excluding any concatenated key material.
    pub fn digest_len(&self) -> usize {
        match *self {
            HashAlgorithm::Blake2 { width, .. } | HashAlgorithm::Twox { width, .. } => width / 8,
            HashAlgorithm::Identity => 0,
        }
    }
    /// Whether the key material is appended to the digest.
    pub fn is_concat(&self) -> bool {
        match *self {
            HashAlgorithm::Blake2 { concat, .. } | HashAlgorithm::Twox { concat, .. } => concat,
            HashAlgorithm::Identity => true,
        }
    }
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        let mut out = match *self {
            HashAlgorithm::Blake2 { width, .. } => {
                blake2b(width / 8, &[], data).as_bytes().to_vec()
            }
            HashAlgorithm::Twox { width, .. } => twox(width / 8, data),
            HashAlgorithm::Identity => Vec::with_capacity(data.len()),
        };

        if self.is_concat() {
            out.extend_from_slice(data);
        }

        out
    }
}

/// Returns the hash algorithm selected by the hasher kind.
pub fn hash_function_for(kind: &StorageHasher) -> HashAlgorithm {
    use HashAlgorithm::*;

    match kind {
        StorageHasher::Blake2_128 => Blake2 {
            width: 128,
            concat: false,
        },
        StorageHasher::Blake2_256 => Blake2 {
            width: 256,
            concat: false,
        },
        StorageHasher::Blake2_128Concat => Blake2 {
            width: 128,
            concat: true,
        },
        StorageHasher::Twox128 => Twox {
            width: 128,
            concat: false,
        },
        StorageHasher::Twox256 => Twox {
            width: 256,
            concat: false,
        },
        StorageHasher::Twox64Concat => Twox {
            width: 64,
            concat: true,
        },
        StorageHasher::Identity => Identity,
    }
}

/// xxHash64 run with seeds `0..len / 8`, the little endian outputs concatenated.
fn twox(len: usize, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    for seed in 0..(len / 8) as u64 {
        let mut hasher = XxHash64::with_seed(seed);
        hasher.write(data);
        out.extend_from_slice(&hasher.finish().to_le_bytes());
    }

    out
}

impl StorageEntryMetadata {
    /// The number of key components expected by the entry. An `NMap` has one
    /// component per declared hasher.
    pub fn key_count(&self) -> usize {
        match &self.ty {
            StorageEntryType::Plain(_) => 0,
            StorageEntryType::Map { .. } => 1,
            StorageEntryType::DoubleMap { .. } => 2,
            StorageEntryType::NMap { hashers, .. } => hashers.len(),
        }
    }
    /// The hasher of the first key component. Plain entries have no keys and
    /// return [`HashAlgorithm::DEFAULT`]. An `NMap` without declared hashers has
    /// no first key component and is an error; use
    /// [`StorageEntryMetadata::hasher_at`] for the other `NMap` positions.
    pub fn hasher(&self) -> Result<HashAlgorithm, QueryError> {
        match &self.ty {
            StorageEntryType::Plain(_) => Ok(HashAlgorithm::DEFAULT),
            StorageEntryType::Map { hasher, .. } | StorageEntryType::DoubleMap { hasher, .. } => {
                Ok(hash_function_for(hasher))
            }
            StorageEntryType::NMap { .. } => self.hasher_at(0),
        }
    }
    /// The hasher aligned with the key component at `position`.
    pub fn hasher_at(&self, position: usize) -> Result<HashAlgorithm, QueryError> {
        let hasher = match (&self.ty, position) {
            (StorageEntryType::Map { hasher, .. }, 0) => Some(hasher),
            (StorageEntryType::DoubleMap { hasher, .. }, 0) => Some(hasher),
            (StorageEntryType::DoubleMap { key2_hasher, .. }, 1) => Some(key2_hasher),
            (StorageEntryType::NMap { hashers, .. }, _) => hashers.get(position),
            _ => None,
        };

        hasher
            .map(hash_function_for)
            .ok_or_else(|| QueryError::KeyPositionOutOfRange {
                entry: self.name.clone(),
                position,
                len: self.key_count(),
            })
    }
    /// The hasher of the second key of a `DoubleMap`.
    pub fn second_hasher(&self) -> Result<HashAlgorithm, QueryError> {
        match &self.ty {
            StorageEntryType::DoubleMap { key2_hasher, .. } => Ok(hash_function_for(key2_hasher)),
            _ => Err(QueryError::HasherTypeMismatch {
                entry: self.name.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    #[test]
    fn twox_128_known_values() {
        assert_eq!(
            hex::encode(HashAlgorithm::DEFAULT.hash(b"System")),
            "26aa394eea5630e07c48ae0c9558cef7"
        );
        assert_eq!(
            hex::encode(HashAlgorithm::DEFAULT.hash(b"Account")),
            "b99d880ec681799c0cf30e8886371da9"
        );
    }

    #[test]
    fn blake2_256_known_value() {
        let algo = hash_function_for(&StorageHasher::Blake2_256);
        assert_eq!(
            hex::encode(algo.hash(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn digest_lengths() {
        let data = b"key material";
        let kinds = [
            (StorageHasher::Blake2_128, 16),
            (StorageHasher::Blake2_256, 32),
            (StorageHasher::Blake2_128Concat, 16 + data.len()),
            (StorageHasher::Twox128, 16),
            (StorageHasher::Twox256, 32),
            (StorageHasher::Twox64Concat, 8 + data.len()),
            (StorageHasher::Identity, data.len()),
        ];

        for (kind, len) in kinds.iter() {
            let algo = hash_function_for(kind);
            let hash = algo.hash(data);
            assert_eq!(hash.len(), *len, "{:?}", kind);
            let concat_len = if algo.is_concat() { data.len() } else { 0 };
            assert_eq!(hash.len(), algo.digest_len() + concat_len);

            if algo.is_concat() {
                assert!(hash.ends_with(data));
            }
        }
    }

    #[test]
    fn concat_variants_prefix_plain_digest() {
        let data = b"account";
        let plain = hash_function_for(&StorageHasher::Blake2_128).hash(data);
        let concat = hash_function_for(&StorageHasher::Blake2_128Concat).hash(data);

        assert_eq!(&concat[..16], plain.as_slice());
        assert_eq!(
            &hash_function_for(&StorageHasher::Twox64Concat).hash(data)[..8],
            &hash_function_for(&StorageHasher::Twox128).hash(data)[..8]
        );
    }

    #[test]
    fn hasher_per_entry_type() {
        let storage = example_storage();
        let (plain, map, double, nmap) = (
            &storage.entries[0],
            &storage.entries[1],
            &storage.entries[2],
            &storage.entries[3],
        );

        assert_eq!(plain.hasher(), Ok(HashAlgorithm::DEFAULT));
        assert_eq!(map.hasher(), Ok(hash_function_for(&StorageHasher::Blake2_256)));
        assert_eq!(double.hasher(), Ok(hash_function_for(&StorageHasher::Blake2_256)));
        assert_eq!(nmap.hasher(), Ok(hash_function_for(&StorageHasher::Blake2_128)));
    }

    #[test]
    fn second_hasher_only_for_double_maps() {
        let storage = example_storage();

        assert_eq!(
            storage.entries[2].second_hasher(),
            Ok(hash_function_for(&StorageHasher::Twox256))
        );
        assert_eq!(
            storage.entries[1].second_hasher(),
            Err(QueryError::HasherTypeMismatch {
                entry: "myStorageFunc2".into()
            })
        );
        assert!(storage.entries[0].second_hasher().is_err());
        assert!(storage.entries[3].second_hasher().is_err());
    }

    #[test]
    fn hasher_at_positions() {
        let storage = example_storage();
        let double = &storage.entries[2];

        assert_eq!(double.hasher_at(0), double.hasher());
        assert_eq!(double.hasher_at(1), double.second_hasher());
        assert!(double.hasher_at(2).is_err());
        assert!(storage.entries[1].hasher_at(1).is_err());
        assert_eq!(
            storage.entries[0].hasher_at(0),
            Err(QueryError::KeyPositionOutOfRange {
                entry: "myStorageFunc".into(),
                position: 0,
                len: 0
            })
        );
    }

    #[test]
    fn nmap_hasher_follows_key_position() {
        let entry = storage_entry(
            "Approvals",
            StorageEntryType::NMap {
                keys: vec!["AssetId".into(), "AccountId".into(), "AccountId".into()],
                hashers: vec![
                    StorageHasher::Blake2_128Concat,
                    StorageHasher::Twox64Concat,
                    StorageHasher::Identity,
                ],
                value: "AssetApproval".into(),
            },
        );

        assert_eq!(entry.key_count(), 3);
        assert_eq!(entry.hasher_at(0), Ok(hash_function_for(&StorageHasher::Blake2_128Concat)));
        assert_eq!(entry.hasher_at(1), Ok(hash_function_for(&StorageHasher::Twox64Concat)));
        assert_eq!(entry.hasher_at(2), Ok(HashAlgorithm::Identity));
        assert!(entry.hasher_at(3).is_err());
    }

    #[test]
    fn nmap_with_fewer_hashers_than_keys() {
        // The example entry declares three keys but a single hasher. Only the
        // first key component has a hasher, instead of silently falling back to
        // a default for the remaining ones.
        let entry = &example_storage().entries[3];

        assert_eq!(entry.key_count(), 1);
        assert!(entry.hasher_at(0).is_ok());
        assert_eq!(
            entry.hasher_at(1),
            Err(QueryError::KeyPositionOutOfRange {
                entry: "myStorageFunc4".into(),
                position: 1,
                len: 1
            })
        );
    }

    #[test]
    fn nmap_without_hashers_has_no_default() {
        let entry = storage_entry(
            "Unhashed",
            StorageEntryType::NMap {
                keys: vec!["AssetId".into()],
                hashers: vec![],
                value: "AssetApproval".into(),
            },
        );

        assert_eq!(entry.key_count(), 0);
        assert_eq!(
            entry.hasher(),
            Err(QueryError::KeyPositionOutOfRange {
                entry: "Unhashed".into(),
                position: 0,
                len: 0
            })
        );
    }
}
