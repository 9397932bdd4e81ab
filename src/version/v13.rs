use crate::decode::{self, DecodeError, DecodeTree, Reader};

/// The runtime metadata document, schema version 13.
///
/// Encoding uses the derived SCALE `Encode`, which writes the fields in
/// declaration order. Decoding goes through [`MetadataV13::decode_all`], which
/// reads the same fields in the same order and reports the path of a failing
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct MetadataV13 {
    pub modules: Vec<ModuleMetadata>,
    pub extrinsic: ExtrinsicMetadata,
}

impl MetadataV13 {
    /// Decodes a document from `bytes`. The magic number and version byte must
    /// already be stripped, see [`crate::parse_raw_metadata`]. Every byte of the
    /// input must belong to the document.
    pub fn decode_all(bytes: &[u8]) -> Result<Self, DecodeError> {
        decode::decode_all(bytes)
    }
}

/// All metadata about a runtime module.
///
/// The optional sections are encoded as a boolean flag directly followed by
/// the payload when the flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub storage: Option<StorageMetadata>,
    pub calls: Option<Vec<FunctionMetadata>>,
    pub events: Option<Vec<EventMetadata>>,
    pub constants: Vec<ModuleConstantMetadata>,
    pub errors: Vec<ErrorMetadata>,
    /// The module identifier used in call indexes and event ids. This is not
    /// necessarily the position of the module within the document.
    pub index: u8,
}

/// All metadata of the storage.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct StorageMetadata {
    /// The common prefix used by all storage entries.
    pub prefix: String,
    pub entries: Vec<StorageEntryMetadata>,
}

/// All the metadata about one storage entry.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub struct StorageEntryMetadata {
    pub name: String,
    pub modifier: StorageEntryModifier,
    pub ty: StorageEntryType,
    pub default: Vec<u8>,
    pub documentation: Vec<String>,
}

/// A storage entry modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize)]
pub enum StorageEntryModifier {
    Optional,
    Default,
}

impl StorageEntryModifier {
    pub fn is_optional(&self) -> bool {
        matches!(self, StorageEntryModifier::Optional)
    }
}

/// A storage entry type. On the wire, a single tag byte selects the variant
/// and the variant's fields follow in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Serialize)]
pub enum StorageEntryType {
    Plain(String),
    Map {
        hasher: StorageHasher,
        key: String,
        value: String,
        // Legacy "is linked" flag, no longer used by the runtime.
        unused: bool,
    },
    DoubleMap {
        hasher: StorageHasher,
        key1: String,
        key2: String,
        value: String,
        key2_hasher: StorageHasher,
    },
    NMap {
        keys: Vec<String>,
        hashers: Vec<StorageHasher>,
        value: String,
    },
}

impl StorageEntryType {
    /// The type of the value stored in the entry.
    pub fn value_type(&self) -> &str {
        match self {
            StorageEntryType::Plain(value)
            | StorageEntryType::Map { value, .. }
            | StorageEntryType::DoubleMap { value, .. }
            | StorageEntryType::NMap { value, .. } => value,
        }
    }
}

/// Hasher used by storage maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize)]
pub enum StorageHasher {
    Blake2_128,
    Blake2_256,
    Blake2_128Concat,
    Twox128,
    Twox256,
    Twox64Concat,
    Identity,
}

/// All the metadata about a function.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct FunctionMetadata {
    pub name: String,
    pub arguments: Vec<FunctionArgumentMetadata>,
    pub documentation: Vec<String>,
}

/// All the metadata about a function argument.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct FunctionArgumentMetadata {
    pub name: String,
    pub ty: String,
}

/// All the metadata about an event.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct EventMetadata {
    pub name: String,
    pub arguments: Vec<String>,
    pub documentation: Vec<String>,
}

/// All the metadata about one module constant.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct ModuleConstantMetadata {
    pub name: String,
    pub ty: String,
    pub value: Vec<u8>,
    pub documentation: Vec<String>,
}

/// All the metadata about a module error.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct ErrorMetadata {
    pub name: String,
    pub documentation: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize)]
pub struct ExtrinsicMetadata {
    /// Extrinsic version.
    pub version: u8,
    /// The signed extensions in the order they appear in the extrinsic.
    pub signed_extensions: Vec<String>,
}

decode_tree_via_codec!(
    StorageEntryModifier,
    StorageHasher,
    FunctionMetadata,
    EventMetadata,
    ModuleConstantMetadata,
    ErrorMetadata,
    ExtrinsicMetadata,
);

impl DecodeTree for MetadataV13 {
    fn decode_tree(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(MetadataV13 {
            modules: reader.field("modules")?,
            extrinsic: reader.field("extrinsic")?,
        })
    }
}

impl DecodeTree for ModuleMetadata {
    fn decode_tree(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let name: String = reader.read("name")?;
        log::trace!("Decoding module {}", name);

        Ok(ModuleMetadata {
            name,
            storage: reader.optional("storage")?,
            calls: reader.optional("calls")?,
            events: reader.optional("events")?,
            constants: reader.field("constants")?,
            errors: reader.field("errors")?,
            index: reader.read("index")?,
        })
    }
}

impl DecodeTree for StorageMetadata {
    fn decode_tree(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(StorageMetadata {
            prefix: reader.read("prefix")?,
            entries: reader.field("entries")?,
        })
    }
}

impl DecodeTree for StorageEntryMetadata {
    fn decode_tree(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(StorageEntryMetadata {
            name: reader.read("name")?,
            modifier: reader.field("modifier")?,
            ty: reader.field("ty")?,
            default: reader.read("default")?,
            documentation: reader.read("documentation")?,
        })
    }
}

impl DecodeTree for StorageEntryType {
    fn decode_tree(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let ty = match reader.read::<u8>("tag")? {
            0 => StorageEntryType::Plain(reader.read("value")?),
            1 => StorageEntryType::Map {
                hasher: reader.field("hasher")?,
                key: reader.read("key")?,
                value: reader.read("value")?,
                unused: reader.read("unused")?,
            },
            2 => StorageEntryType::DoubleMap {
                hasher: reader.field("hasher")?,
                key1: reader.read("key1")?,
                key2: reader.read("key2")?,
                value: reader.read("value")?,
                key2_hasher: reader.field("key2_hasher")?,
            },
            3 => StorageEntryType::NMap {
                keys: reader.read("keys")?,
                hashers: reader.field("hashers")?,
                value: reader.read("value")?,
            },
            _ => {
                return Err(reader.invalid("tag", "unknown storage entry type discriminator"));
            }
        };

        Ok(ty)
    }
}
