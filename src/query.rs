//! Lookups over a decoded [`MetadataV13`] document.
//!
//! Modules are identified by their explicit `index` field, never by their
//! position within the document. Name lookups stop at the first matching
//! module: module names (and storage prefixes) are expected to be unique
//! within a valid document, duplicates after the first match are unreachable.

use crate::version::{
    FunctionMetadata, MetadataV13, ModuleMetadata, StorageEntryMetadata, StorageEntryModifier,
    StorageEntryType, StorageMetadata,
};
use parity_scale_codec::Encode;
use std::convert::TryFrom;

/// The binary identifier of a call, as submitted on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize)]
pub struct CallIndex {
    pub section_index: u8,
    pub method_index: u8,
}

/// The binary identifier attached to an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize)]
pub struct EventId {
    pub section_index: u8,
    pub method_index: u8,
}

impl From<[u8; 2]> for EventId {
    fn from(val: [u8; 2]) -> Self {
        EventId {
            section_index: val[0],
            method_index: val[1],
        }
    }
}

/// Errors returned by lookups. None of them are fatal, the caller decides on a
/// fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("malformed call `{0}`, expected `Module.method`")]
    MalformedQuery(String),
    #[error("module `{module}` not found in metadata")]
    ModuleNotFound { module: String },
    #[error("module `{module}` has no calls")]
    CallsNotFound { module: String },
    #[error("call `{call}` not found within module `{module}`")]
    CallNotFound { module: String, call: String },
    #[error("call at position {position} of module `{module}` does not fit a call index")]
    CallIndexOutOfRange { module: String, position: usize },
    #[error("no module with index {index} declares events")]
    EventModuleNotFound { index: u8 },
    #[error("event index {index} for module `{module}` out of range ({len} events)")]
    EventOutOfRange {
        module: String,
        index: u8,
        len: usize,
    },
    #[error("storage module `{prefix}` not found in metadata")]
    StorageModuleNotFound { prefix: String },
    #[error("storage entry `{entry}` not found within module `{prefix}`")]
    StorageEntryNotFound { prefix: String, entry: String },
    #[error("key position {position} out of range for storage entry `{entry}` ({len} keys)")]
    KeyPositionOutOfRange {
        entry: String,
        position: usize,
        len: usize,
    },
    #[error("storage entry `{entry}` is not a double map")]
    HasherTypeMismatch { entry: String },
    #[error("storage entry `{entry}` expects {expected} keys, got {got}")]
    KeyCountMismatch {
        entry: String,
        expected: usize,
        got: usize,
    },
}

impl MetadataV13 {
    /// Whether some module is called exactly `name`.
    pub fn module_exists(&self, name: &str) -> bool {
        self.modules.iter().any(|module| module.name == name)
    }
    /// Returns the first module called `name`.
    pub fn find_module(&self, name: &str) -> Option<&ModuleMetadata> {
        self.modules.iter().find(|module| module.name == name)
    }
    /// Resolves a call of the form `"Module.method"` into its call index.
    pub fn find_call_index(&self, call: &str) -> Result<CallIndex, QueryError> {
        let (module_name, method) = call
            .split_once('.')
            .ok_or_else(|| QueryError::MalformedQuery(call.to_string()))?;

        let module = self
            .find_module(module_name)
            .ok_or_else(|| QueryError::ModuleNotFound {
                module: module_name.to_string(),
            })?;

        let calls = module
            .calls
            .as_ref()
            .ok_or_else(|| QueryError::CallsNotFound {
                module: module_name.to_string(),
            })?;

        let position = calls
            .iter()
            .position(|func| func.name == method)
            .ok_or_else(|| QueryError::CallNotFound {
                module: module_name.to_string(),
                call: method.to_string(),
            })?;

        // SCALE enums have at most 256 variants.
        let method_index = u8::try_from(position).map_err(|_| QueryError::CallIndexOutOfRange {
            module: module_name.to_string(),
            position,
        })?;

        Ok(CallIndex {
            section_index: module.index,
            method_index,
        })
    }
    /// Resolves an event id into the module name and the event name.
    pub fn find_event_names(&self, id: EventId) -> Result<(&str, &str), QueryError> {
        let (module, events) = self
            .modules
            .iter()
            .filter(|module| module.index == id.section_index)
            .find_map(|module| module.events.as_ref().map(|events| (module, events)))
            .ok_or(QueryError::EventModuleNotFound {
                index: id.section_index,
            })?;

        events
            .get(id.method_index as usize)
            .map(|event| (module.name.as_str(), event.name.as_str()))
            .ok_or_else(|| QueryError::EventOutOfRange {
                module: module.name.clone(),
                index: id.method_index,
                len: events.len(),
            })
    }
    /// Finds a storage entry by the storage prefix of its module and its name.
    ///
    /// The prefix is matched against the storage section's own prefix, which may
    /// differ from the module name.
    pub fn find_storage_entry(
        &self,
        prefix: &str,
        entry: &str,
    ) -> Result<&StorageEntryMetadata, QueryError> {
        let storage = self
            .modules
            .iter()
            .filter_map(|module| module.storage.as_ref())
            .find(|storage| storage.prefix == prefix)
            .ok_or_else(|| QueryError::StorageModuleNotFound {
                prefix: prefix.to_string(),
            })?;

        storage
            .entries
            .iter()
            .find(|item| item.name == entry)
            .ok_or_else(|| QueryError::StorageEntryNotFound {
                prefix: prefix.to_string(),
                entry: entry.to_string(),
            })
    }
}

/// A call ready to be included in an extrinsic: the call index followed by the
/// SCALE encoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub call_index: CallIndex,
    pub args: Vec<u8>,
}

impl Call {
    /// Creates a call of the form `"Module.method"`. The arguments are encoded
    /// as given, the caller is responsible for matching the argument types
    /// declared by the metadata.
    pub fn new<A: Encode>(metadata: &MetadataV13, call: &str, args: A) -> Result<Self, QueryError> {
        Ok(Call {
            call_index: metadata.find_call_index(call)?,
            args: args.encode(),
        })
    }
}

impl Encode for Call {
    fn using_encoded<R, F: FnOnce(&[u8]) -> R>(&self, f: F) -> R {
        let mut enc = Vec::with_capacity(2 + self.args.len());
        self.call_index.encode_to(&mut enc);
        enc.extend_from_slice(&self.args);
        f(&enc)
    }
}

/// Parameters and other information about an individual extrinsic.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExtrinsicInfo<'a> {
    /// The index of the module. This is required when encoding the final extrinsic.
    pub module_id: u8,
    /// The dispatch Id. This is required when encoding the final extrinsic.
    pub dispatch_id: u8,
    /// The name of the module.
    pub module_name: &'a str,
    /// The name of the extrinsic.
    pub extrinsic_name: &'a str,
    /// Arguments that must be passed as the extrinsics body. A sequence of
    /// key-value pairs, indicating the name and the type, respectively.
    pub args: Vec<(&'a str, &'a str)>,
    /// Documentation of the extrinsic, as provided by the Substrate metadata.
    pub documentation: Vec<&'a str>,
}

impl<'a> ExtrinsicInfo<'a> {
    pub fn call_index(&self) -> CallIndex {
        CallIndex {
            section_index: self.module_id,
            method_index: self.dispatch_id,
        }
    }
}

impl FunctionMetadata {
    /// Returns `None` if the position of the call does not fit a call index.
    fn to_extrinsic_info<'a>(
        &'a self,
        position: usize,
        module: &'a ModuleMetadata,
    ) -> Option<ExtrinsicInfo<'a>> {
        let dispatch_id = u8::try_from(position).ok()?;

        Some(ExtrinsicInfo {
            module_id: module.index,
            dispatch_id,
            module_name: module.name.as_str(),
            extrinsic_name: self.name.as_str(),
            args: self
                .arguments
                .iter()
                .map(|arg_meta| (arg_meta.name.as_str(), arg_meta.ty.as_str()))
                .collect(),
            documentation: self.documentation.iter().map(|s| s.as_str()).collect(),
        })
    }
}

/// Parameters and other information about an individual storage entry.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StorageInfo<'a> {
    pub module_name: &'a str,
    /// The storage prefix of the module.
    pub prefix: &'a str,
    /// The name of the storage entry.
    pub entry_name: &'a str,
    pub modifier: StorageEntryModifier,
    pub ty: &'a StorageEntryType,
    pub default: &'a [u8],
    /// Documentation of the storage entry, as provided by the Substrate metadata.
    pub documentation: &'a [String],
}

/// An interface to retrieve information about extrinsics.
pub trait ModuleMetadataExt {
    fn modules_extrinsics<'a>(&'a self) -> Vec<ExtrinsicInfo<'a>>;
    fn find_module_extrinsic<'a>(
        &'a self,
        module: &str,
        extrinsic: &str,
    ) -> Option<ExtrinsicInfo<'a>>;
}

/// An interface to retrieve information about storage entries.
pub trait StorageMetadataExt {
    fn storage_entries<'a>(&'a self) -> Vec<StorageInfo<'a>>;
    fn find_storage_entries<'a>(&'a self, prefix: &str, name: &str) -> Option<StorageInfo<'a>>;
}

impl ModuleMetadataExt for MetadataV13 {
    fn modules_extrinsics<'a>(&'a self) -> Vec<ExtrinsicInfo<'a>> {
        self.modules
            .iter()
            .flat_map(|mod_meta| {
                mod_meta
                    .calls
                    .iter()
                    .flatten()
                    .enumerate()
                    .filter_map(move |(position, func_meta)| {
                        func_meta.to_extrinsic_info(position, mod_meta)
                    })
            })
            .collect()
    }
    fn find_module_extrinsic<'a>(
        &'a self,
        module: &str,
        extrinsic: &str,
    ) -> Option<ExtrinsicInfo<'a>> {
        let mod_meta = self.find_module(module)?;

        mod_meta
            .calls
            .as_ref()?
            .iter()
            .enumerate()
            .find(|(_, func_meta)| func_meta.name == extrinsic)
            .and_then(|(position, func_meta)| func_meta.to_extrinsic_info(position, mod_meta))
    }
}

impl<'a> StorageInfo<'a> {
    fn new(
        module: &'a ModuleMetadata,
        storage: &'a StorageMetadata,
        entry: &'a StorageEntryMetadata,
    ) -> Self {
        StorageInfo {
            module_name: module.name.as_str(),
            prefix: storage.prefix.as_str(),
            entry_name: entry.name.as_str(),
            modifier: entry.modifier,
            ty: &entry.ty,
            default: &entry.default,
            documentation: &entry.documentation,
        }
    }
}

impl StorageMetadataExt for MetadataV13 {
    fn storage_entries<'a>(&'a self) -> Vec<StorageInfo<'a>> {
        self.modules
            .iter()
            .filter_map(|module| module.storage.as_ref().map(|storage| (module, storage)))
            .flat_map(|(module, storage)| {
                storage
                    .entries
                    .iter()
                    .map(move |entry| StorageInfo::new(module, storage, entry))
            })
            .collect()
    }
    /// Same lookup rules as [`MetadataV13::find_storage_entry`]: only the first
    /// module with a matching storage prefix is searched.
    fn find_storage_entries<'a>(&'a self, prefix: &str, name: &str) -> Option<StorageInfo<'a>> {
        let (module, storage) = self
            .modules
            .iter()
            .filter_map(|module| module.storage.as_ref().map(|storage| (module, storage)))
            .find(|(_, storage)| storage.prefix == prefix)?;

        storage
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| StorageInfo::new(module, storage, entry))
    }
}
