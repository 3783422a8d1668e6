//! `ValueEncoder`: writes a [`Value`] tree as tagged bytes.

use tagpack_buffers::Writer;

use crate::constants::{Tag, MAX_LENGTH, SMALL_INT_BASE, SMALL_INT_MAX};
use crate::error::CodecError;
use crate::value::{Extension, Value};

/// Default limit on container nesting, shared with the decoder.
pub const DEFAULT_MAX_DEPTH: usize = 512;

pub struct ValueEncoder {
    pub writer: Writer,
    max_depth: usize,
    depth: usize,
}

impl Default for ValueEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueEncoder {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            writer: Writer::new(),
            max_depth,
            depth: 0,
        }
    }

    /// Encodes one value. The encoder can be reused after an error.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, CodecError> {
        self.writer.reset();
        self.depth = 0;
        self.write_any(value)?;
        Ok(self.writer.flush())
    }

    pub fn write_any(&mut self, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Bool(b) => self.write_bool(*b),
            Value::Int(i) => self.write_int(*i),
            Value::Uint(u) => self.write_uint(*u),
            Value::Float32(f) => self.writer.u8f32(Tag::Float32.byte(), *f),
            Value::Float64(f) => self.writer.u8f64(Tag::Float64.byte(), *f),
            Value::Str(s) => self.write_str(s)?,
            Value::Binary(b) => self.write_bin(b)?,
            Value::Array(items) => self.write_arr(items)?,
            Value::Map(pairs) => self.write_map(pairs)?,
            Value::Extension(ext) => self.write_ext(ext)?,
        }
        Ok(())
    }

    pub fn write_nil(&mut self) {
        self.writer.u8(Tag::Nil.byte());
    }

    pub fn write_bool(&mut self, b: bool) {
        self.writer.u8(if b { Tag::True } else { Tag::False }.byte());
    }

    /// Non-negative integers go through [`Self::write_uint`]; negative ones
    /// take the narrowest signed tag.
    pub fn write_int(&mut self, int: i64) {
        if int >= 0 {
            self.write_uint(int as u64);
        } else if int >= i8::MIN as i64 {
            self.writer.u8(Tag::Int8.byte());
            self.writer.i8(int as i8);
        } else if int >= i16::MIN as i64 {
            self.writer.u8(Tag::Int16.byte());
            self.writer.i16(int as i16);
        } else if int >= i32::MIN as i64 {
            self.writer.u8(Tag::Int32.byte());
            self.writer.i32(int as i32);
        } else {
            self.writer.u8(Tag::Int64.byte());
            self.writer.i64(int);
        }
    }

    pub fn write_uint(&mut self, uint: u64) {
        if uint <= SMALL_INT_MAX {
            self.writer.u8(SMALL_INT_BASE | uint as u8);
        } else if uint <= u8::MAX as u64 {
            self.writer.u8u8(Tag::Uint8.byte(), uint as u8);
        } else if uint <= u16::MAX as u64 {
            self.writer.u8u16(Tag::Uint16.byte(), uint as u16);
        } else if uint <= u32::MAX as u64 {
            self.writer.u8u32(Tag::Uint32.byte(), uint as u32);
        } else {
            self.writer.u8u64(Tag::Uint64.byte(), uint);
        }
    }

    fn write_len(&mut self, tag: Tag, length: usize) -> Result<(), CodecError> {
        if length > MAX_LENGTH {
            return Err(CodecError::LengthOverflow(length));
        }
        self.writer.u8u32(tag.byte(), length as u32);
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), CodecError> {
        self.writer.ensure_capacity(5 + s.len());
        self.write_len(Tag::Str, s.len())?;
        self.writer.utf8(s);
        Ok(())
    }

    pub fn write_bin(&mut self, buf: &[u8]) -> Result<(), CodecError> {
        self.writer.ensure_capacity(5 + buf.len());
        self.write_len(Tag::Binary, buf.len())?;
        self.writer.buf(buf);
        Ok(())
    }

    pub fn write_arr_hdr(&mut self, length: usize) -> Result<(), CodecError> {
        self.write_len(Tag::Array, length)
    }

    pub fn write_map_hdr(&mut self, length: usize) -> Result<(), CodecError> {
        self.write_len(Tag::Map, length)
    }

    fn enter(&mut self) -> Result<(), CodecError> {
        if self.depth >= self.max_depth {
            return Err(CodecError::DepthLimitExceeded(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn write_arr(&mut self, items: &[Value]) -> Result<(), CodecError> {
        self.enter()?;
        let res = self.write_arr_items(items);
        self.depth -= 1;
        res
    }

    fn write_arr_items(&mut self, items: &[Value]) -> Result<(), CodecError> {
        self.write_arr_hdr(items.len())?;
        for item in items {
            self.write_any(item)?;
        }
        Ok(())
    }

    /// Pairs are written in slice order; the encoder never reorders keys.
    pub fn write_map(&mut self, pairs: &[(Value, Value)]) -> Result<(), CodecError> {
        self.enter()?;
        let res = self.write_map_pairs(pairs);
        self.depth -= 1;
        res
    }

    fn write_map_pairs(&mut self, pairs: &[(Value, Value)]) -> Result<(), CodecError> {
        self.write_map_hdr(pairs.len())?;
        for (key, val) in pairs {
            self.write_any(key)?;
            self.write_any(val)?;
        }
        Ok(())
    }

    pub fn write_ext(&mut self, ext: &Extension) -> Result<(), CodecError> {
        if ext.data.len() > MAX_LENGTH {
            return Err(CodecError::LengthOverflow(ext.data.len()));
        }
        self.writer.ensure_capacity(6 + ext.data.len());
        self.writer.u8(Tag::Extension.byte());
        self.writer.i8(ext.kind);
        self.writer.u32(ext.data.len() as u32);
        self.writer.buf(&ext.data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: Value) -> Vec<u8> {
        ValueEncoder::new().encode(&value).expect("encode")
    }

    #[test]
    fn small_ints_inline_into_the_tag() {
        assert_eq!(enc(Value::Int(0)), [0x80]);
        assert_eq!(enc(Value::Int(127)), [0xff]);
        assert_eq!(enc(Value::Uint(5)), [0x85]);
    }

    #[test]
    fn integers_escalate_width() {
        assert_eq!(enc(Value::Int(128)), [0x07, 0x80]);
        assert_eq!(enc(Value::Int(256)), [0x08, 0x01, 0x00]);
        assert_eq!(enc(Value::Int(70_000)), [0x09, 0x00, 0x01, 0x11, 0x70]);
        assert_eq!(
            enc(Value::Uint(u64::MAX)),
            [0x0a, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn negative_integers_use_signed_tags() {
        assert_eq!(enc(Value::Int(-1)), [0x03, 0xff]);
        assert_eq!(enc(Value::Int(-128)), [0x03, 0x80]);
        assert_eq!(enc(Value::Int(-129)), [0x04, 0xff, 0x7f]);
        assert_eq!(enc(Value::Int(-123)), [0x03, 0x85]);
        assert_eq!(enc(Value::Int(i64::MIN))[0], 0x06);
    }

    #[test]
    fn strings_carry_four_byte_length() {
        assert_eq!(enc(Value::from("hi")), [0x0d, 0, 0, 0, 2, b'h', b'i']);
        assert_eq!(enc(Value::from("")), [0x0d, 0, 0, 0, 0]);
    }

    #[test]
    fn containers_prefix_count() {
        let arr = Value::Array(vec![Value::Nil, Value::Bool(true)]);
        assert_eq!(enc(arr), [0x0f, 0, 0, 0, 2, 0x00, 0x02]);
        let map = Value::Map(vec![(Value::from("a"), Value::Bool(false))]);
        assert_eq!(enc(map), [0x10, 0, 0, 0, 1, 0x0d, 0, 0, 0, 1, b'a', 0x01]);
    }

    #[test]
    fn extension_writes_kind_then_length() {
        let ext = Value::Extension(Extension::new(-1, vec![0xaa, 0xbb]));
        assert_eq!(enc(ext), [0x11, 0xff, 0, 0, 0, 2, 0xaa, 0xbb]);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut value = Value::Nil;
        for _ in 0..4 {
            value = Value::Array(vec![value]);
        }
        let mut encoder = ValueEncoder::with_max_depth(3);
        assert_eq!(
            encoder.encode(&value),
            Err(CodecError::DepthLimitExceeded(3))
        );
        // a failed call leaves the encoder usable
        assert_eq!(encoder.encode(&Value::Nil), Ok(vec![0x00]));
    }

    #[test]
    fn failed_nested_write_restores_depth_budget() {
        let mut encoder = ValueEncoder::with_max_depth(2);
        let deep = Value::Array(vec![Value::Array(vec![Value::Array(vec![])])]);
        assert_eq!(
            encoder.write_any(&deep),
            Err(CodecError::DepthLimitExceeded(2))
        );
        encoder.writer.reset();
        assert_eq!(encoder.write_any(&Value::Array(vec![])), Ok(()));
        let map = Value::Map(vec![(Value::from("k"), deep)]);
        assert!(encoder.write_map(map.as_map().unwrap()).is_err());
        encoder.writer.reset();
        let two_deep = Value::Map(vec![(Value::from("k"), Value::Array(vec![]))]);
        assert_eq!(encoder.write_any(&two_deep), Ok(()));
        assert_eq!(encoder.writer.flush().len(), 16);
    }
}
