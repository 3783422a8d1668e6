//! Bounds-checked big-endian byte reader.

use crate::BufferError;

/// Cursor over a borrowed byte slice.
///
/// Every read checks the remaining length first, so malformed input surfaces
/// as [`BufferError::EndOfBuffer`] rather than a panic.
///
/// # Example
///
/// ```
/// use tagpack_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
/// assert_eq!(reader.u8(), Ok(0x01));
/// assert_eq!(reader.u16(), Ok(0x0203));
/// assert!(reader.u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    uint8: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Current cursor offset from the start of the input.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.uint8.len() - self.x
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn check(&self, needed: usize) -> Result<(), BufferError> {
        let available = self.remaining();
        if needed > available {
            Err(BufferError::EndOfBuffer { needed, available })
        } else {
            Ok(())
        }
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Borrows the next `size` bytes and advances past them.
    pub fn take(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let start = self.x;
        self.x += size;
        Ok(&self.uint8[start..self.x])
    }

    pub fn skip(&mut self, size: usize) -> Result<(), BufferError> {
        self.check(size)?;
        self.x += size;
        Ok(())
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.array::<1>().map(|b| b[0])
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        self.array::<1>().map(|b| b[0] as i8)
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.array().map(u16::from_be_bytes)
    }

    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        self.array().map(i16::from_be_bytes)
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_be_bytes)
    }

    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        self.array().map(i32::from_be_bytes)
    }

    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.array().map(u64::from_be_bytes)
    }

    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        self.array().map(i64::from_be_bytes)
    }

    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.array().map(f32::from_be_bytes)
    }

    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        self.array().map(f64::from_be_bytes)
    }
}
