//! Typed binary array decoding
//!
//! Vendor readers position a [`ByteBuffer`](crate::ByteBuffer) at the start of
//! an array and hand it to a [`DoubleReaderType`] or [`IntReaderType`] together
//! with [`ReadOptions`]. Two-dimensional images are assembled by
//! [`ArrayStorageType`], which decides whether the byte stream holds rows or
//! columns and in which order they land in the destination array.

mod element;
mod layout;
mod packed;

pub use element::{ArrayElementReader, DoubleReaderType, IntReaderType};
pub use layout::ArrayStorageType;
pub use packed::TwoBitReader;

/// Order in which decoded elements are assigned to destination indices.
///
/// The byte stream is always consumed forward; `Reversed` only fills the
/// destination from its last index backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataStorageDirection {
    #[default]
    Forward,
    Reversed,
}

impl DataStorageDirection {
    /// Destination index of the `k`-th element read out of `len`.
    #[inline]
    pub fn destination(self, k: usize, len: usize) -> usize {
        match self {
            DataStorageDirection::Forward => k,
            DataStorageDirection::Reversed => len - 1 - k,
        }
    }

    pub fn reversed(self) -> DataStorageDirection {
        match self {
            DataStorageDirection::Forward => DataStorageDirection::Reversed,
            DataStorageDirection::Reversed => DataStorageDirection::Forward,
        }
    }
}

/// Calibration and traversal parameters of a typed array read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadOptions {
    /// Multiplier applied to every floating-point result
    pub scale: f64,
    /// Added after scaling
    pub offset: f64,
    /// Bytes skipped after each element
    pub skip_bytes: usize,
    /// Destination fill order
    pub direction: DataStorageDirection,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            skip_bytes: 0,
            direction: DataStorageDirection::Forward,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calibration(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn with_skip_bytes(mut self, skip_bytes: usize) -> Self {
        self.skip_bytes = skip_bytes;
        self
    }

    pub fn with_direction(mut self, direction: DataStorageDirection) -> Self {
        self.direction = direction;
        self
    }

    #[inline]
    pub(crate) fn calibrate(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}
