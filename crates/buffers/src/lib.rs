//! Byte buffer primitives for the tagpack codec.
//!
//! [`Writer`] appends big-endian fields to a growable buffer and [`Reader`]
//! consumes them again, reporting [`BufferError`] instead of panicking when a
//! read would run past the end of the input.

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// Errors raised by [`Reader`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read needed `needed` bytes but only `available` were left.
    #[error("end of buffer: needed {needed} bytes, {available} available")]
    EndOfBuffer { needed: usize, available: usize },
}
