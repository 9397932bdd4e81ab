//! Metadata documents shared by the unit tests.

use crate::version::*;

/// `state_getMetadata` hex dump holding the `Timestamp` and `Indices` modules
/// of a V13 runtime.
pub const TIMESTAMP_INDICES_HEX: &str =
    include_str!("../dumps/metadata_v13_timestamp_indices.hex");

pub fn example_metadata() -> MetadataV13 {
    MetadataV13 {
        modules: vec![empty_module(), module_1(), module_2()],
        extrinsic: ExtrinsicMetadata {
            version: 4,
            signed_extensions: vec!["CheckSpecVersion".into(), "CheckNonce".into()],
        },
    }
}

pub fn empty_module() -> ModuleMetadata {
    ModuleMetadata {
        name: "EmptyModule".into(),
        storage: None,
        calls: None,
        events: None,
        constants: vec![],
        errors: vec![],
        index: 0,
    }
}

pub fn module_1() -> ModuleMetadata {
    ModuleMetadata {
        name: "Module1".into(),
        storage: Some(example_storage()),
        calls: Some(vec![example_function()]),
        events: Some(vec![example_event()]),
        constants: vec![example_constant()],
        errors: vec![example_error()],
        index: 1,
    }
}

pub fn module_2() -> ModuleMetadata {
    ModuleMetadata {
        name: "Module2".into(),
        index: 2,
        ..module_1()
    }
}

pub fn example_storage() -> StorageMetadata {
    StorageMetadata {
        prefix: "myStoragePrefix".into(),
        entries: vec![
            storage_entry("myStorageFunc", StorageEntryType::Plain("U8".into())),
            storage_entry(
                "myStorageFunc2",
                StorageEntryType::Map {
                    hasher: StorageHasher::Blake2_256,
                    key: "my key".into(),
                    value: "and my value".into(),
                    unused: false,
                },
            ),
            storage_entry(
                "myStorageFunc3",
                StorageEntryType::DoubleMap {
                    hasher: StorageHasher::Blake2_256,
                    key1: "myKey".into(),
                    key2: "otherKey".into(),
                    value: "and a value".into(),
                    key2_hasher: StorageHasher::Twox256,
                },
            ),
            // Declares three keys but only a single hasher.
            storage_entry(
                "myStorageFunc4",
                StorageEntryType::NMap {
                    keys: vec!["AssetId".into(), "AccountId".into(), "AccountId".into()],
                    hashers: vec![StorageHasher::Blake2_128],
                    value: "AssetApproval".into(),
                },
            ),
        ],
    }
}

pub fn storage_entry(name: &str, ty: StorageEntryType) -> StorageEntryMetadata {
    StorageEntryMetadata {
        name: name.into(),
        modifier: StorageEntryModifier::Optional,
        ty,
        default: vec![23, 14],
        documentation: vec!["My".into(), "storage func".into(), "doc".into()],
    }
}

pub fn example_function() -> FunctionMetadata {
    FunctionMetadata {
        name: "my function".into(),
        arguments: vec![FunctionArgumentMetadata {
            name: "my arg".into(),
            ty: "u8".into(),
        }],
        documentation: vec!["My".into(), "doc".into()],
    }
}

pub fn example_event() -> EventMetadata {
    EventMetadata {
        name: "myEvent".into(),
        arguments: vec!["u8".into()],
        documentation: vec!["My".into(), "doc".into()],
    }
}

pub fn example_constant() -> ModuleConstantMetadata {
    ModuleConstantMetadata {
        name: "myConstant".into(),
        ty: "u8".into(),
        value: vec![1],
        documentation: vec!["My".into(), "doc".into()],
    }
}

pub fn example_error() -> ErrorMetadata {
    ErrorMetadata {
        name: "myError".into(),
        documentation: vec!["My".into(), "doc".into()],
    }
}
