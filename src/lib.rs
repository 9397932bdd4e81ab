//! Decoder and query engine for Substrate runtime metadata (schema version 13).
//!
//! The metadata returned by `state_getMetadata` is decoded into a [`MetadataV13`]
//! document which can be queried for call indexes, event names and storage
//! entries, and re-encoded byte-for-byte.
//!
//! # Example
//!
//! ```no_run
//! use runtime_metadata::*;
//!
//! // Parse runtime metadata
//! let content = std::fs::read_to_string("metadata_polkadot_9050.hex").unwrap();
//! let metadata = parse_hex_metadata(content).unwrap();
//!
//! // Resolve the binary identifier of a call.
//! let index = metadata.find_call_index("Balances.transfer").unwrap();
//! assert_eq!(index, CallIndex { section_index: 5, method_index: 0 });
//!
//! // Build the storage key of `System.Account` for some account.
//! let account = [0u8; 32];
//! let key = metadata.storage_key("System", "Account", &[account]).unwrap();
//! assert_eq!(key.len(), 32 + 16 + 32);
//! ```

#[macro_use]
extern crate serde;
#[macro_use]
extern crate parity_scale_codec;

use parity_scale_codec::Encode;
use serde_json::Error as SerdeJsonError;

pub use self::decode::DecodeError;
pub use self::hasher::{hash_function_for, HashAlgorithm};
pub use self::query::{
    Call, CallIndex, EventId, ExtrinsicInfo, ModuleMetadataExt, QueryError, StorageInfo,
    StorageMetadataExt,
};
pub use self::shared::SharedMetadata;
pub use self::storage::storage_prefix;
pub use self::version::*;

pub type Result<T> = std::result::Result<T, Error>;

#[macro_use]
mod decode;
#[cfg(test)]
mod fixtures;
pub mod hasher;
pub mod query;
pub mod shared;
pub mod storage;
pub mod version;

/// The magic number that is prefixed in the runtime metadata returned by
/// JSON-RPC `state_getMetadata`. 'meta' = 0x6d657461.
pub const MAGIC_NUMBER: &[u8; 4] = b"meta";

/// The only metadata schema version this crate decodes.
pub const METADATA_VERSION: u8 = 13;

/// Errors that can occur when parsing Substrate metadata.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse JSON-RPC response: {0}")]
    ParseJsonRpcMetadata(#[from] SerdeJsonError),
    #[error("failed to parse hex metadata: {0}")]
    ParseHexMetadata(#[from] hex::FromHexError),
    #[error("failed to decode metadata: {0}")]
    ParseRawMetadata(#[from] DecodeError),
    #[error("metadata version {0} is not supported, expected version 13")]
    InvalidMetadataVersion(u8),
    #[error("metadata is missing its version byte")]
    MissingMetadataVersion,
}

/// Helper type when dealing with the Json RPC response returned by
/// Substrates `state_getMetadata`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub result: String,
}

/// Convenience function for parsing the Json RPC response returned by Substrates
/// `state_getMetadata`.
///
/// Must fit the [`JsonRpcResponse`] structure.
pub fn parse_jsonrpc_metadata<T: AsRef<[u8]>>(json: T) -> Result<MetadataV13> {
    parse_raw_metadata(decode_jsonrpc_result(json)?)
}

/// Convenience function for parsing the metadata from a HEX representation, as
/// returned by `state_getMetadata`.
pub fn parse_hex_metadata<T: AsRef<[u8]>>(hex: T) -> Result<MetadataV13> {
    parse_raw_metadata(decode_hex(hex)?)
}

/// Extracts the raw bytes from the [`JsonRpcResponse`] of `state_getMetadata`,
/// without decoding the document.
pub fn decode_jsonrpc_result<T: AsRef<[u8]>>(json: T) -> Result<Vec<u8>> {
    let resp = serde_json::from_slice::<JsonRpcResponse>(json.as_ref())?;

    decode_hex(resp.result.as_bytes())
}

/// Decodes a HEX string, with or without the `0x` prefix. Surrounding
/// whitespace is ignored.
pub fn decode_hex<T: AsRef<[u8]>>(hex: T) -> Result<Vec<u8>> {
    let hex = trim_ascii(hex.as_ref());

    // The `hex` crate does not handle `0x`...
    let slice = if hex.starts_with(b"0x") {
        &hex[2..]
    } else {
        hex
    };

    Ok(hex::decode(slice)?)
}

/// Parse the raw Substrate metadata, with or without the magic number.
///
/// The version byte must be present and must select schema version 13. All
/// bytes after the version byte must belong to the document.
pub fn parse_raw_metadata<T: AsRef<[u8]>>(raw: T) -> Result<MetadataV13> {
    let raw = raw.as_ref();

    // Remove the magic number before decoding, if it exists. From the substrate
    // docs:
    // > "The hex blob that is returned by the JSON-RPCs state_getMetadata
    // > method starts with a hard-coded magic number, 0x6d657461, which
    // > represents "meta" in plain text."
    let slice = raw.strip_prefix(&MAGIC_NUMBER[..]).unwrap_or(raw);

    let (version, body) = slice
        .split_first()
        .ok_or(Error::MissingMetadataVersion)?;

    if *version != METADATA_VERSION {
        return Err(Error::InvalidMetadataVersion(*version));
    }

    let metadata = MetadataV13::decode_all(body)?;
    log::debug!(
        "Decoded V{} metadata with {} modules",
        version,
        metadata.modules.len()
    );

    Ok(metadata)
}

/// Encodes the document together with the magic number and version byte, the
/// exact form returned by `state_getMetadata`.
pub fn encode_prefixed(metadata: &MetadataV13) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAGIC_NUMBER.len() + 1 + metadata.size_hint());
    out.extend_from_slice(&MAGIC_NUMBER[..]);
    out.push(METADATA_VERSION);
    metadata.encode_to(&mut out);
    out
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |pos| pos + 1);

    &bytes[start..end]
}
