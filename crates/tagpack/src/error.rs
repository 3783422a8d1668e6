//! Codec error type.

use tagpack_buffers::BufferError;
use thiserror::Error;

/// Errors raised by encoding, decoding and record projection.
///
/// Every error ends the call that raised it; no partial result is exposed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid tag byte 0x{tag:02x} at offset {offset}")]
    InvalidTag { tag: u8, offset: usize },
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,
    #[error("value {value} does not fit in {target}")]
    Overflow { value: String, target: &'static str },
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    #[error("length {0} exceeds the 32-bit wire limit")]
    LengthOverflow(usize),
    #[error("nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

impl From<BufferError> for CodecError {
    fn from(_: BufferError) -> Self {
        CodecError::UnexpectedEof
    }
}

impl CodecError {
    pub(crate) fn mismatch(expected: impl std::fmt::Display, found: &str) -> Self {
        CodecError::SchemaMismatch(format!("expected {expected}, found {found}"))
    }

    pub(crate) fn overflow(value: impl ToString, target: &'static str) -> Self {
        CodecError::Overflow {
            value: value.to_string(),
            target,
        }
    }

    /// Prefixes a schema mismatch with the record field it happened in.
    /// Other variants pass through unchanged.
    pub fn at_field(self, type_name: &str, field: &str) -> Self {
        match self {
            CodecError::SchemaMismatch(msg) => {
                CodecError::SchemaMismatch(format!("{type_name}.{field}: {msg}"))
            }
            other => other,
        }
    }
}
