//! Field-tracking reader used to decode the metadata tree.
//!
//! Primitive values are decoded with `parity-scale-codec`. The reader keeps the
//! path of the field currently being decoded so that a failure deep in the tree
//! reports where the schema mismatch happened, e.g.
//! `modules[3].storage.entries[2].ty.hasher`.

use parity_scale_codec::{Compact, Decode, Error as ScaleError};
use std::borrow::Cow;

/// Error that can happen while decoding the metadata tree. Decoding is aborted
/// on the first error.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode `{path}` (depth {depth}): {source}")]
pub struct DecodeError {
    path: String,
    depth: usize,
    #[source]
    source: ScaleError,
}

impl DecodeError {
    /// The path of the field that failed to decode.
    pub fn path(&self) -> &str {
        &self.path
    }
    /// The nesting depth of the field that failed to decode. The document
    /// itself is at depth zero.
    pub fn depth(&self) -> usize {
        self.depth
    }
    /// The error returned by the underlying codec.
    pub fn codec_error(&self) -> &ScaleError {
        &self.source
    }
}

/// Types of the metadata tree which know how to decode themselves from a [`Reader`].
pub(crate) trait DecodeTree: Sized {
    fn decode_tree(reader: &mut Reader<'_>) -> Result<Self, DecodeError>;
}

impl<T: DecodeTree> DecodeTree for Vec<T> {
    fn decode_tree(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let len = reader.codec::<Compact<u32>>()?.0 as usize;

        // A bogus length prefix must not result in a huge allocation. Every item
        // occupies at least one byte.
        let mut items = Vec::with_capacity(len.min(reader.remaining()));
        for offset in 0..len {
            items.push(reader.scoped(format!("[{}]", offset), T::decode_tree)?);
        }

        Ok(items)
    }
}

/// Implements [`DecodeTree`] for leaf types that derive their SCALE `Decode`.
macro_rules! decode_tree_via_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl crate::decode::DecodeTree for $ty {
                fn decode_tree(
                    reader: &mut crate::decode::Reader<'_>,
                ) -> Result<Self, crate::decode::DecodeError> {
                    reader.codec()
                }
            }
        )*
    };
}

pub(crate) struct Reader<'a> {
    input: &'a [u8],
    path: Vec<Cow<'static, str>>,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Reader {
            input,
            path: vec![],
        }
    }
    pub fn remaining(&self) -> usize {
        self.input.len()
    }
    /// Decodes a value at the current path with the SCALE codec.
    pub fn codec<T: Decode>(&mut self) -> Result<T, DecodeError> {
        match T::decode(&mut self.input) {
            Ok(value) => Ok(value),
            Err(err) => Err(self.error(err)),
        }
    }
    /// Decodes a primitive field with the SCALE codec.
    pub fn read<T: Decode>(&mut self, field: &'static str) -> Result<T, DecodeError> {
        self.scoped(field, Self::codec)
    }
    /// Decodes a field of the metadata tree.
    pub fn field<T: DecodeTree>(&mut self, field: &'static str) -> Result<T, DecodeError> {
        self.scoped(field, T::decode_tree)
    }
    /// Decodes a boolean flag followed by the payload, if the flag is set. When
    /// the flag is unset the payload occupies zero bytes.
    pub fn optional<T: DecodeTree>(
        &mut self,
        field: &'static str,
    ) -> Result<Option<T>, DecodeError> {
        self.scoped(field, |reader| {
            if reader.codec::<bool>()? {
                T::decode_tree(reader).map(Some)
            } else {
                Ok(None)
            }
        })
    }
    /// Returns an error for a value which was decoded successfully but is not
    /// valid at the current path, such as an unknown discriminator.
    pub fn invalid(&self, field: &'static str, reason: &'static str) -> DecodeError {
        let mut path = self.path.clone();
        path.push(Cow::Borrowed(field));
        Self::error_at(&path, ScaleError::from(reason))
    }
    /// Ensures the whole input was consumed.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(self.error(ScaleError::from("unexpected trailing bytes after the document")))
        }
    }
    fn scoped<T, F>(
        &mut self,
        segment: impl Into<Cow<'static, str>>,
        f: F,
    ) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Self) -> Result<T, DecodeError>,
    {
        self.path.push(segment.into());
        let res = f(self);
        self.path.pop();
        res
    }
    fn error(&self, source: ScaleError) -> DecodeError {
        Self::error_at(&self.path, source)
    }
    fn error_at(path: &[Cow<'static, str>], source: ScaleError) -> DecodeError {
        let mut joined = String::new();
        for segment in path {
            if !joined.is_empty() && !segment.starts_with('[') {
                joined.push('.');
            }
            joined.push_str(segment);
        }

        if joined.is_empty() {
            joined.push_str("<document>");
        }

        DecodeError {
            path: joined,
            depth: path.len(),
            source,
        }
    }
}

/// Decodes a complete tree from `input`, rejecting trailing bytes.
pub(crate) fn decode_all<T: DecodeTree>(input: &[u8]) -> Result<T, DecodeError> {
    let mut reader = Reader::new(input);
    let value = T::decode_tree(&mut reader)?;
    reader.finish()?;
    Ok(value)
}
