//! `Codec`: encoder, decoder and schema registry behind one handle.

use std::any::TypeId;
use std::sync::Arc;

use tracing::debug;

use crate::decoder::{DecoderOptions, ValueDecoder};
use crate::encoder::{ValueEncoder, DEFAULT_MAX_DEPTH};
use crate::error::CodecError;
use crate::record::{
    record_from_value, record_to_value, FromValue, Projection, Record, StructMode, ToValue,
};
use crate::registry::SchemaRegistry;
use crate::schema::Schema;
use crate::value::Value;

/// Options shared by every call made through a [`Codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    /// Struct mode used by [`Codec::encode`] and [`Codec::decode`].
    pub mode: StructMode,
    /// Container nesting limit for both directions.
    pub max_depth: usize,
    /// Accept bytes after the top-level value on decode.
    pub allow_trailing: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            mode: StructMode::AsMap,
            max_depth: DEFAULT_MAX_DEPTH,
            allow_trailing: false,
        }
    }
}

/// Encodes and decodes values and records.
///
/// A codec is `Send + Sync`; each call builds its own encoder or decoder, so
/// one instance can serve many threads. Codecs built with
/// [`Codec::with_registry`] share a schema cache.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    options: CodecOptions,
    registry: Arc<SchemaRegistry>,
}

impl Codec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self {
            options,
            registry: Arc::default(),
        }
    }

    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            options: CodecOptions::default(),
            registry,
        }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Schema of `R`, resolved through this codec's registry.
    pub fn schema<R: Record>(&self) -> Result<Arc<Schema>, CodecError> {
        self.registry.resolve::<R>()
    }

    /// Schema registered under `type_id`, or `UnsupportedType`.
    pub fn lookup(&self, type_id: TypeId) -> Result<Arc<Schema>, CodecError> {
        self.registry.lookup(type_id)
    }

    fn projection(&self, mode: StructMode) -> Projection<'_> {
        Projection::new(mode, &self.registry)
    }

    fn decoder(&self) -> ValueDecoder {
        ValueDecoder::with_options(DecoderOptions {
            max_depth: self.options.max_depth,
            allow_trailing: self.options.allow_trailing,
        })
    }

    pub fn encode_value(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        ValueEncoder::with_max_depth(self.options.max_depth).encode(value)
    }

    pub fn decode_value(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        self.decoder().decode(bytes).inspect_err(|err| {
            debug!(%err, len = bytes.len(), "decode failed");
        })
    }

    /// Checks that `bytes` hold exactly one well-formed value; returns its length.
    pub fn validate(&self, bytes: &[u8]) -> Result<usize, CodecError> {
        self.decoder().validate(bytes)
    }

    /// Encodes a record as an array or a map of its fields.
    pub fn encode_record<R: Record>(
        &self,
        record: &R,
        mode: StructMode,
    ) -> Result<Vec<u8>, CodecError> {
        let value = record_to_value(record, self.projection(mode))?;
        self.encode_value(&value)
    }

    /// Decodes a record payload written in `mode`.
    pub fn decode_record<R: Record>(
        &self,
        bytes: &[u8],
        mode: StructMode,
    ) -> Result<R, CodecError> {
        let value = self.decode_value(bytes)?;
        record_from_value(value, self.projection(mode)).inspect_err(|err| {
            debug!(%err, record = R::TYPE_NAME, "record projection failed");
        })
    }

    /// Decodes into `target`, which is overwritten only if the whole decode
    /// succeeds.
    pub fn decode_record_into<R: Record>(
        &self,
        bytes: &[u8],
        mode: StructMode,
        target: &mut R,
    ) -> Result<(), CodecError> {
        *target = self.decode_record(bytes, mode)?;
        Ok(())
    }

    /// Encodes any projectable value using the configured struct mode.
    pub fn encode<T: ToValue>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let value = value.to_value(self.projection(self.options.mode))?;
        self.encode_value(&value)
    }

    /// Decodes any projectable value using the configured struct mode.
    pub fn decode<T: FromValue>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        let value = self.decode_value(bytes)?;
        T::from_value(value, self.projection(self.options.mode))
    }
}

/// Encodes `value` with a throwaway codec in `mode`.
pub fn encode<T: ToValue>(value: &T, mode: StructMode) -> Result<Vec<u8>, CodecError> {
    Codec::with_options(CodecOptions {
        mode,
        ..CodecOptions::default()
    })
    .encode(value)
}

/// Decodes `bytes` with a throwaway codec in `mode`.
pub fn decode<T: FromValue>(bytes: &[u8], mode: StructMode) -> Result<T, CodecError> {
    Codec::with_options(CodecOptions {
        mode,
        ..CodecOptions::default()
    })
    .decode(bytes)
}
