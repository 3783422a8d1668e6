//! `ValueDecoder`: parses tagged bytes back into a [`Value`] tree.
//!
//! Decoding is a single recursive-descent pass: read a tag, consume exactly
//! the payload it declares, recurse into containers. Variable-length payloads
//! are copied out, so the returned tree never borrows from the input.

use tagpack_buffers::Reader;

use crate::constants::{is_small_int, Tag, SMALL_INT_BASE};
use crate::encoder::DEFAULT_MAX_DEPTH;
use crate::error::CodecError;
use crate::value::{Extension, Value};

/// Options controlling decoder strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Deepest container nesting accepted before failing with
    /// [`CodecError::DepthLimitExceeded`].
    pub max_depth: usize,
    /// When `false` (default), bytes left over after the top-level value fail
    /// the decode with [`CodecError::TrailingBytes`].
    pub allow_trailing: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            allow_trailing: false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ValueDecoder {
    pub options: DecoderOptions,
}

impl ValueDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    /// Decodes exactly one value from `input`.
    pub fn decode(&self, input: &[u8]) -> Result<Value, CodecError> {
        let mut reader = Reader::new(input);
        let value = self.read_any(&mut reader, 0)?;
        self.finish(&reader)?;
        Ok(value)
    }

    /// Checks that `input` holds one well-formed value without building it.
    /// Returns the encoded length of that value.
    pub fn validate(&self, input: &[u8]) -> Result<usize, CodecError> {
        let mut reader = Reader::new(input);
        let size = self.skip_any(&mut reader, 0)?;
        self.finish(&reader)?;
        Ok(size)
    }

    fn finish(&self, reader: &Reader<'_>) -> Result<(), CodecError> {
        if !self.options.allow_trailing && !reader.is_empty() {
            return Err(CodecError::TrailingBytes(reader.remaining()));
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<usize, CodecError> {
        if depth >= self.options.max_depth {
            return Err(CodecError::DepthLimitExceeded(self.options.max_depth));
        }
        Ok(depth + 1)
    }

    fn read_tag(reader: &mut Reader<'_>) -> Result<(u8, Option<Tag>, usize), CodecError> {
        let offset = reader.position();
        let byte = reader.u8()?;
        Ok((byte, Tag::from_byte(byte), offset))
    }

    /// Reads one value at the reader's cursor.
    pub fn read_any(&self, reader: &mut Reader<'_>, depth: usize) -> Result<Value, CodecError> {
        let (byte, tag, offset) = Self::read_tag(reader)?;
        if is_small_int(byte) {
            return Ok(Value::Int((byte & !SMALL_INT_BASE) as i64));
        }
        let Some(tag) = tag else {
            return Err(CodecError::InvalidTag { tag: byte, offset });
        };
        let value = match tag {
            Tag::Nil => Value::Nil,
            Tag::False => Value::Bool(false),
            Tag::True => Value::Bool(true),
            Tag::Int8 => Value::Int(reader.i8()? as i64),
            Tag::Int16 => Value::Int(reader.i16()? as i64),
            Tag::Int32 => Value::Int(reader.i32()? as i64),
            Tag::Int64 => Value::Int(reader.i64()?),
            Tag::Uint8 => Value::Int(reader.u8()? as i64),
            Tag::Uint16 => Value::Int(reader.u16()? as i64),
            Tag::Uint32 => Value::Int(reader.u32()? as i64),
            Tag::Uint64 => Value::from(reader.u64()?),
            Tag::Float32 => Value::Float32(reader.f32()?),
            Tag::Float64 => Value::Float64(reader.f64()?),
            Tag::Str => {
                let size = reader.u32()? as usize;
                let bytes = reader.take(size)?;
                let s = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                Value::Str(s.to_owned())
            }
            Tag::Binary => {
                let size = reader.u32()? as usize;
                Value::Binary(reader.take(size)?.to_vec())
            }
            Tag::Array => {
                let depth = self.enter(depth)?;
                let size = reader.u32()? as usize;
                // every element takes at least one byte
                let mut items = Vec::with_capacity(size.min(reader.remaining()));
                for _ in 0..size {
                    items.push(self.read_any(reader, depth)?);
                }
                Value::Array(items)
            }
            Tag::Map => {
                let depth = self.enter(depth)?;
                let size = reader.u32()? as usize;
                let mut pairs = Vec::with_capacity(size.min(reader.remaining() / 2));
                for _ in 0..size {
                    let key = self.read_any(reader, depth)?;
                    let val = self.read_any(reader, depth)?;
                    pairs.push((key, val));
                }
                Value::Map(pairs)
            }
            Tag::Extension => {
                let kind = reader.i8()?;
                let size = reader.u32()? as usize;
                Value::Extension(Extension::new(kind, reader.take(size)?.to_vec()))
            }
        };
        Ok(value)
    }

    /// Skips one value at the reader's cursor and returns how many bytes it
    /// occupied.
    pub fn skip_any(&self, reader: &mut Reader<'_>, depth: usize) -> Result<usize, CodecError> {
        let start = reader.position();
        let (byte, tag, offset) = Self::read_tag(reader)?;
        if is_small_int(byte) {
            return Ok(1);
        }
        let Some(tag) = tag else {
            return Err(CodecError::InvalidTag { tag: byte, offset });
        };
        match tag {
            Tag::Nil | Tag::False | Tag::True => {}
            Tag::Int8 | Tag::Uint8 => reader.skip(1)?,
            Tag::Int16 | Tag::Uint16 => reader.skip(2)?,
            Tag::Int32 | Tag::Uint32 | Tag::Float32 => reader.skip(4)?,
            Tag::Int64 | Tag::Uint64 | Tag::Float64 => reader.skip(8)?,
            Tag::Str => {
                let size = reader.u32()? as usize;
                let bytes = reader.take(size)?;
                std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
            }
            Tag::Binary => {
                let size = reader.u32()? as usize;
                reader.skip(size)?;
            }
            Tag::Array => {
                let depth = self.enter(depth)?;
                let size = reader.u32()?;
                for _ in 0..size {
                    self.skip_any(reader, depth)?;
                }
            }
            Tag::Map => {
                let depth = self.enter(depth)?;
                let size = reader.u32()?;
                for _ in 0..size {
                    self.skip_any(reader, depth)?; // key
                    self.skip_any(reader, depth)?; // value
                }
            }
            Tag::Extension => {
                reader.skip(1)?;
                let size = reader.u32()? as usize;
                reader.skip(size)?;
            }
        }
        Ok(reader.position() - start)
    }
}
