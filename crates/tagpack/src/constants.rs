//! Wire tag bytes.
//!
//! Every encoded value starts with one tag byte. Bytes `0x00..=0x11` name a
//! type, `0x80..=0xff` carry a small non-negative integer inline and the range
//! in between is reserved.

/// Type-naming tag bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    Nil = 0x00,
    False = 0x01,
    True = 0x02,
    Int8 = 0x03,
    Int16 = 0x04,
    Int32 = 0x05,
    Int64 = 0x06,
    Uint8 = 0x07,
    Uint16 = 0x08,
    Uint32 = 0x09,
    Uint64 = 0x0a,
    Float32 = 0x0b,
    Float64 = 0x0c,
    Str = 0x0d,
    Binary = 0x0e,
    Array = 0x0f,
    Map = 0x10,
    Extension = 0x11,
}

impl Tag {
    /// Maps a tag byte to its type. Small-int and reserved bytes yield `None`.
    pub fn from_byte(byte: u8) -> Option<Tag> {
        let tag = match byte {
            0x00 => Tag::Nil,
            0x01 => Tag::False,
            0x02 => Tag::True,
            0x03 => Tag::Int8,
            0x04 => Tag::Int16,
            0x05 => Tag::Int32,
            0x06 => Tag::Int64,
            0x07 => Tag::Uint8,
            0x08 => Tag::Uint16,
            0x09 => Tag::Uint32,
            0x0a => Tag::Uint64,
            0x0b => Tag::Float32,
            0x0c => Tag::Float64,
            0x0d => Tag::Str,
            0x0e => Tag::Binary,
            0x0f => Tag::Array,
            0x10 => Tag::Map,
            0x11 => Tag::Extension,
            _ => return None,
        };
        Some(tag)
    }

    pub fn byte(self) -> u8 {
        self as u8
    }
}

/// First small-int tag byte; `SMALL_INT_BASE | n` encodes `n` for `n <= 0x7f`.
pub const SMALL_INT_BASE: u8 = 0x80;

/// Largest integer that fits in a small-int tag.
pub const SMALL_INT_MAX: u64 = 0x7f;

/// Largest byte or element count a 4-byte length field can carry.
pub const MAX_LENGTH: usize = u32::MAX as usize;

#[inline]
pub fn is_small_int(byte: u8) -> bool {
    byte & SMALL_INT_BASE != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tags_roundtrip_through_bytes() {
        for byte in 0x00..=0x11u8 {
            let tag = Tag::from_byte(byte).expect("named tag");
            assert_eq!(tag.byte(), byte);
        }
    }

    #[test]
    fn reserved_and_small_int_bytes_are_not_named() {
        assert_eq!(Tag::from_byte(0x12), None);
        assert_eq!(Tag::from_byte(0x7f), None);
        assert_eq!(Tag::from_byte(0x80), None);
        assert!(is_small_int(0x80));
        assert!(is_small_int(0xff));
        assert!(!is_small_int(0x7f));
    }
}
