//! Position-tracking byte buffer consumed by the typed array readers

use crate::error::{AfmError, Result};
use crate::types::Endian;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Random-access view over raw file bytes with a read cursor and byte order.
///
/// Readers expect the caller to position the buffer first; every typed read
/// advances the cursor by exactly the element width.
#[derive(Debug, Clone)]
pub struct ByteBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

macro_rules! typed_read {
    ($name:ident, $t:ty, $size:expr, $read:ident) => {
        #[inline]
        pub fn $name(&mut self) -> Result<$t> {
            let bytes = self.read_bytes($size)?;
            Ok(match self.endian {
                Endian::Little => LittleEndian::$read(bytes),
                Endian::Big => BigEndian::$read(bytes),
            })
        }
    };
}

impl<'a> ByteBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            endian: Endian::Little,
        }
    }

    pub fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    #[inline]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    #[inline]
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Move the cursor to an absolute offset; the end of the buffer is allowed.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(AfmError::UnexpectedEof {
                needed: pos,
                remaining: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    #[inline]
    fn ensure(&self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(AfmError::UnexpectedEof {
                needed: count,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.ensure(count)?;
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.ensure(count)?;
        self.pos += count;
        Ok(())
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    typed_read!(read_u16, u16, 2, read_u16);
    typed_read!(read_i16, i16, 2, read_i16);
    typed_read!(read_u32, u32, 4, read_u32);
    typed_read!(read_i32, i32, 4, read_i32);
    typed_read!(read_u64, u64, 8, read_u64);
    typed_read!(read_i64, i64, 8, read_i64);
    typed_read!(read_f32, f32, 4, read_f32);
    typed_read!(read_f64, f64, 8, read_f64);
}

// ============================================================================
// Tests
// ============================================================================
