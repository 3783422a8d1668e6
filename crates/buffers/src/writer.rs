//! Growable big-endian byte writer.

/// Appends big-endian fields to an owned buffer.
///
/// Bytes written since the last [`Writer::reset`] or [`Writer::flush`] form
/// the pending chunk; `flush` hands that chunk out and starts a new one, so a
/// single writer can be reused across encode calls.
///
/// # Example
///
/// ```
/// use tagpack_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8u16(0x04, 0x0203);
/// assert_eq!(writer.flush(), [0x04, 0x02, 0x03]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct Writer {
    uint8: Vec<u8>,
    x0: usize,
}

impl Writer {
    /// Default initial capacity in bytes.
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            uint8: Vec::with_capacity(capacity),
            x0: 0,
        }
    }

    /// Discards the pending chunk and releases flushed bytes.
    pub fn reset(&mut self) {
        self.uint8.clear();
        self.x0 = 0;
    }

    /// Number of pending bytes.
    pub fn len(&self) -> usize {
        self.uint8.len() - self.x0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the pending chunk and starts a new one.
    pub fn flush(&mut self) -> Vec<u8> {
        let out = self.uint8[self.x0..].to_vec();
        self.x0 = self.uint8.len();
        out
    }

    /// Makes room for `additional` bytes without reallocating mid-write.
    pub fn ensure_capacity(&mut self, additional: usize) {
        self.uint8.reserve(additional);
    }

    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.uint8.push(val);
    }

    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.uint8.push(val as u8);
    }

    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i16(&mut self, val: i16) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.uint8.extend_from_slice(&val.to_be_bytes());
    }

    /// Tag byte followed by a one-byte payload.
    pub fn u8u8(&mut self, tag: u8, val: u8) {
        self.uint8.extend_from_slice(&[tag, val]);
    }

    /// Tag byte followed by a big-endian `u16`.
    pub fn u8u16(&mut self, tag: u8, val: u16) {
        self.ensure_capacity(3);
        self.u8(tag);
        self.u16(val);
    }

    /// Tag byte followed by a big-endian `u32`.
    pub fn u8u32(&mut self, tag: u8, val: u32) {
        self.ensure_capacity(5);
        self.u8(tag);
        self.u32(val);
    }

    /// Tag byte followed by a big-endian `u64`.
    pub fn u8u64(&mut self, tag: u8, val: u64) {
        self.ensure_capacity(9);
        self.u8(tag);
        self.u64(val);
    }

    /// Tag byte followed by a big-endian `f32`.
    pub fn u8f32(&mut self, tag: u8, val: f32) {
        self.ensure_capacity(5);
        self.u8(tag);
        self.f32(val);
    }

    /// Tag byte followed by a big-endian `f64`.
    pub fn u8f64(&mut self, tag: u8, val: f64) {
        self.ensure_capacity(9);
        self.u8(tag);
        self.f64(val);
    }

    /// Raw bytes, no length prefix.
    pub fn buf(&mut self, bytes: &[u8]) {
        self.uint8.extend_from_slice(bytes);
    }

    /// UTF-8 bytes of `s`; returns how many were written.
    pub fn utf8(&mut self, s: &str) -> usize {
        self.buf(s.as_bytes());
        s.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_fields_are_big_endian() {
        let mut writer = Writer::new();
        writer.u16(0x0102);
        writer.i32(-2);
        writer.u64(1);
        assert_eq!(
            writer.flush(),
            [0x01, 0x02, 0xff, 0xff, 0xff, 0xfe, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn tagged_helpers_prefix_the_tag() {
        let mut writer = Writer::new();
        writer.u8u32(0x0d, 3);
        writer.utf8("abc");
        assert_eq!(writer.flush(), [0x0d, 0, 0, 0, 3, b'a', b'b', b'c']);
    }

    #[test]
    fn flush_starts_a_new_chunk() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        assert_eq!(writer.flush(), [0x01]);
        assert!(writer.is_empty());
        writer.u8(0x02);
        assert_eq!(writer.len(), 1);
        assert_eq!(writer.flush(), [0x02]);
    }

    #[test]
    fn reset_drops_pending_bytes() {
        let mut writer = Writer::with_capacity(4);
        writer.buf(&[1, 2, 3]);
        writer.reset();
        writer.u8(9);
        assert_eq!(writer.flush(), [9]);
    }

    #[test]
    fn floats_use_ieee754_bits() {
        let mut writer = Writer::new();
        writer.u8f32(0x0b, 1.5);
        let out = writer.flush();
        assert_eq!(out[0], 0x0b);
        assert_eq!(f32::from_be_bytes([out[1], out[2], out[3], out[4]]), 1.5);
    }
}
