//! Sub-byte reader for 2-bit packed mask values

use super::DataStorageDirection;
use crate::buffer::ByteBuffer;
use crate::error::{AfmError, Result};
use ndarray::Array2;

const BITS_PER_VALUE: u32 = 2;
const VALUES_PER_BYTE: u32 = 8 / BITS_PER_VALUE;

/// Reads 2-bit unsigned values, most significant pair first.
///
/// The bit cursor survives between calls, so a mask stored as one packed
/// stream can be read column by column. The underlying buffer only ever
/// advances in whole bytes.
#[derive(Debug, Default, Clone)]
pub struct TwoBitReader {
    current: u8,
    /// Values already taken from `current`; 0 means a fresh byte is needed
    consumed: u32,
}

impl TwoBitReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes that must still be fetched from the buffer to decode `count` values.
    pub fn bytes_needed(&self, count: usize) -> usize {
        let buffered = if self.consumed == 0 {
            0
        } else {
            (VALUES_PER_BYTE - self.consumed) as usize
        };
        count.saturating_sub(buffered).div_ceil(VALUES_PER_BYTE as usize)
    }

    /// Drop the rest of a partially consumed byte.
    pub fn align_to_byte(&mut self) {
        self.consumed = 0;
    }

    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.consumed == 0
    }

    pub fn read_value(&mut self, buf: &mut ByteBuffer<'_>) -> Result<i32> {
        if self.consumed == 0 {
            self.current = buf.read_u8()?;
        }
        let shift = 8 - BITS_PER_VALUE * (self.consumed + 1);
        let value = (self.current >> shift) & 0b11;
        self.consumed = (self.consumed + 1) % VALUES_PER_BYTE;
        Ok(value as i32)
    }

    pub fn read(&mut self, buf: &mut ByteBuffer<'_>, count: usize) -> Result<Vec<i32>> {
        self.read_directed(buf, count, DataStorageDirection::Forward)
    }

    pub fn read_directed(
        &mut self,
        buf: &mut ByteBuffer<'_>,
        count: usize,
        direction: DataStorageDirection,
    ) -> Result<Vec<i32>> {
        self.check_available(buf, count)?;
        let mut out = vec![0; count];
        for k in 0..count {
            out[direction.destination(k, count)] = self.read_value(buf)?;
        }
        Ok(out)
    }

    /// Decode one column of a mask array.
    pub fn fill_column(
        &mut self,
        buf: &mut ByteBuffer<'_>,
        array: &mut Array2<i32>,
        column: usize,
        direction: DataStorageDirection,
    ) -> Result<()> {
        if column >= array.ncols() {
            return Err(AfmError::InvalidArgument(format!(
                "column {column} outside mask with {} columns",
                array.ncols()
            )));
        }
        let rows = array.nrows();
        self.check_available(buf, rows)?;
        let mut lane = array.column_mut(column);
        for k in 0..rows {
            lane[direction.destination(k, rows)] = self.read_value(buf)?;
        }
        Ok(())
    }

    fn check_available(&self, buf: &ByteBuffer<'_>, count: usize) -> Result<()> {
        let needed = self.bytes_needed(count);
        if needed > buf.remaining() {
            return Err(AfmError::UnexpectedEof {
                needed,
                remaining: buf.remaining(),
            });
        }
        Ok(())
    }
}
