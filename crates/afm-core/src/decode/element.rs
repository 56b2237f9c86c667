//! Fixed-width element readers
//!
//! Each reader type resolves to a decode function pointer through a constant
//! table indexed by the variant, so the per-element loop never re-dispatches on
//! the format. The traversal logic (strides, reversal, rows and columns of a 2D
//! array) lives once in [`ArrayElementReader`] and is shared by the floating
//! point and the integer readers.

use super::{ArrayStorageType, DataStorageDirection, ReadOptions};
use crate::buffer::ByteBuffer;
use crate::error::{AfmError, Result};
use half::f16;
use ndarray::{Array2, ArrayViewMut1};
use tracing::instrument;

type DoubleDecodeFn = for<'a> fn(&mut ByteBuffer<'a>) -> Result<f64>;
type IntDecodeFn = for<'a> fn(&mut ByteBuffer<'a>) -> Result<i32>;

// ============================================================================
// Shared traversal
// ============================================================================

/// Decoding of one element type plus every traversal built on top of it.
pub trait ArrayElementReader {
    type Element: Copy + Default;

    /// Width of one element in bytes
    fn element_size(&self) -> usize;

    /// Decode a single element at the buffer position.
    fn read_element(
        &self,
        buf: &mut ByteBuffer<'_>,
        options: &ReadOptions,
    ) -> Result<Self::Element>;

    /// Fail up front if `count` elements with the configured stride are not
    /// available, so a failed read never leaves a half-consumed buffer.
    fn check_available(
        &self,
        buf: &ByteBuffer<'_>,
        count: usize,
        options: &ReadOptions,
    ) -> Result<()> {
        let needed = count
            .checked_mul(self.element_size() + options.skip_bytes)
            .ok_or_else(|| AfmError::InvalidArgument(format!("{count} elements overflow")))?;
        if needed > buf.remaining() {
            return Err(AfmError::UnexpectedEof {
                needed,
                remaining: buf.remaining(),
            });
        }
        Ok(())
    }

    /// Fill every slot of `lane` in the order given by `options.direction`.
    fn fill_lane(
        &self,
        buf: &mut ByteBuffer<'_>,
        mut lane: ArrayViewMut1<'_, Self::Element>,
        options: &ReadOptions,
    ) -> Result<()> {
        let len = lane.len();
        self.check_available(buf, len, options)?;
        for k in 0..len {
            let value = self.read_element(buf, options)?;
            lane[options.direction.destination(k, len)] = value;
            if options.skip_bytes > 0 {
                buf.skip(options.skip_bytes)?;
            }
        }
        Ok(())
    }

    /// Decode `count` elements into a new vector.
    ///
    /// The buffer advances by `count * (element_size + skip_bytes)`.
    fn read_1d(
        &self,
        buf: &mut ByteBuffer<'_>,
        count: usize,
        options: &ReadOptions,
    ) -> Result<Vec<Self::Element>> {
        self.check_available(buf, count, options)?;
        let mut out = Vec::new();
        out.try_reserve_exact(count)
            .map_err(|_| AfmError::OutOfMemory {
                context: format!("allocating {count} decoded elements"),
            })?;
        out.resize(count, Self::Element::default());
        self.read_1d_into(buf, &mut out, options)?;
        Ok(out)
    }

    /// Decode exactly `dest.len()` elements into `dest`.
    fn read_1d_into(
        &self,
        buf: &mut ByteBuffer<'_>,
        dest: &mut [Self::Element],
        options: &ReadOptions,
    ) -> Result<()> {
        self.fill_lane(buf, ArrayViewMut1::from(dest), options)
    }

    /// Decode one full row of `array`.
    fn fill_row(
        &self,
        buf: &mut ByteBuffer<'_>,
        array: &mut Array2<Self::Element>,
        row: usize,
        options: &ReadOptions,
    ) -> Result<()> {
        if row >= array.nrows() {
            return Err(AfmError::InvalidArgument(format!(
                "row {row} outside array with {} rows",
                array.nrows()
            )));
        }
        self.fill_lane(buf, array.row_mut(row), options)
    }

    /// Decode one full column of `array`.
    fn fill_column(
        &self,
        buf: &mut ByteBuffer<'_>,
        array: &mut Array2<Self::Element>,
        column: usize,
        options: &ReadOptions,
    ) -> Result<()> {
        if column >= array.ncols() {
            return Err(AfmError::InvalidArgument(format!(
                "column {column} outside array with {} columns",
                array.ncols()
            )));
        }
        self.fill_lane(buf, array.column_mut(column), options)
    }

    /// Assemble a `rows x columns` array stored with `storage` layout.
    ///
    /// `between` orders the stored vectors (rows or columns), while
    /// `options.direction` orders elements inside each vector.
    fn read_2d(
        &self,
        buf: &mut ByteBuffer<'_>,
        rows: usize,
        columns: usize,
        storage: ArrayStorageType,
        between: DataStorageDirection,
        options: &ReadOptions,
    ) -> Result<Array2<Self::Element>>
    where
        Self: Sized,
    {
        storage.read(self, buf, rows, columns, between, options)
    }
}

// ============================================================================
// Floating-point results
// ============================================================================

/// Source formats decodable into `f64` arrays with calibration applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoubleReaderType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float16,
    Float32,
    /// 48-bit float; recognised but not decodable
    Float48,
    Float64,
    /// x87 80-bit extended float; recognised but not decodable
    Float80,
}

fn decode_i8(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_i8()? as f64)
}

fn decode_u8(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_u8()? as f64)
}

fn decode_i16(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_i16()? as f64)
}

fn decode_u16(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_u16()? as f64)
}

fn decode_i32(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_i32()? as f64)
}

fn decode_u32(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_u32()? as f64)
}

fn decode_i64(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_i64()? as f64)
}

// Values above i64::MAX must survive, so the unsigned word is never
// reinterpreted as signed.
fn decode_u64(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_u64()? as f64)
}

fn decode_f16(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(f16::from_bits(buf.read_u16()?).to_f64())
}

fn decode_f32(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    Ok(buf.read_f32()? as f64)
}

fn decode_f64(buf: &mut ByteBuffer<'_>) -> Result<f64> {
    buf.read_f64()
}

/// Indexed by `DoubleReaderType as usize`
const DOUBLE_DECODERS: [Option<DoubleDecodeFn>; 13] = [
    Some(decode_i8),
    Some(decode_u8),
    Some(decode_i16),
    Some(decode_u16),
    Some(decode_i32),
    Some(decode_u32),
    Some(decode_i64),
    Some(decode_u64),
    Some(decode_f16),
    Some(decode_f32),
    None,
    Some(decode_f64),
    None,
];

impl DoubleReaderType {
    pub const ALL: [DoubleReaderType; 13] = [
        DoubleReaderType::Int8,
        DoubleReaderType::UInt8,
        DoubleReaderType::Int16,
        DoubleReaderType::UInt16,
        DoubleReaderType::Int32,
        DoubleReaderType::UInt32,
        DoubleReaderType::Int64,
        DoubleReaderType::UInt64,
        DoubleReaderType::Float16,
        DoubleReaderType::Float32,
        DoubleReaderType::Float48,
        DoubleReaderType::Float64,
        DoubleReaderType::Float80,
    ];

    /// Look up the reader for a width / signedness / kind descriptor.
    pub fn from_descriptor(byte_size: usize, signed: bool, floating: bool) -> Option<Self> {
        Self::ALL.into_iter().find(|t| {
            t.byte_size() == byte_size
                && t.is_floating() == floating
                && (floating || t.is_signed() == signed)
        })
    }

    pub fn byte_size(self) -> usize {
        match self {
            DoubleReaderType::Int8 | DoubleReaderType::UInt8 => 1,
            DoubleReaderType::Int16 | DoubleReaderType::UInt16 | DoubleReaderType::Float16 => 2,
            DoubleReaderType::Int32 | DoubleReaderType::UInt32 | DoubleReaderType::Float32 => 4,
            DoubleReaderType::Float48 => 6,
            DoubleReaderType::Int64 | DoubleReaderType::UInt64 | DoubleReaderType::Float64 => 8,
            DoubleReaderType::Float80 => 10,
        }
    }

    pub fn is_floating(self) -> bool {
        matches!(
            self,
            DoubleReaderType::Float16
                | DoubleReaderType::Float32
                | DoubleReaderType::Float48
                | DoubleReaderType::Float64
                | DoubleReaderType::Float80
        )
    }

    pub fn is_signed(self) -> bool {
        !matches!(
            self,
            DoubleReaderType::UInt8
                | DoubleReaderType::UInt16
                | DoubleReaderType::UInt32
                | DoubleReaderType::UInt64
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            DoubleReaderType::Int8 => "int8",
            DoubleReaderType::UInt8 => "uint8",
            DoubleReaderType::Int16 => "int16",
            DoubleReaderType::UInt16 => "uint16",
            DoubleReaderType::Int32 => "int32",
            DoubleReaderType::UInt32 => "uint32",
            DoubleReaderType::Int64 => "int64",
            DoubleReaderType::UInt64 => "uint64",
            DoubleReaderType::Float16 => "float16",
            DoubleReaderType::Float32 => "float32",
            DoubleReaderType::Float48 => "float48",
            DoubleReaderType::Float64 => "float64",
            DoubleReaderType::Float80 => "float80",
        }
    }

    pub fn is_supported(self) -> bool {
        DOUBLE_DECODERS[self as usize].is_some()
    }

    fn decoder(self) -> Result<DoubleDecodeFn> {
        DOUBLE_DECODERS[self as usize].ok_or(AfmError::Unimplemented {
            format: self.name(),
        })
    }

    /// Decode a whole array, logging the format at trace level.
    #[instrument(level = "trace", skip(self, buf, options), fields(format = self.name()))]
    pub fn read_array(
        self,
        buf: &mut ByteBuffer<'_>,
        count: usize,
        options: &ReadOptions,
    ) -> Result<Vec<f64>> {
        // resolve before touching the buffer
        self.decoder()?;
        self.read_1d(buf, count, options)
    }
}

impl ArrayElementReader for DoubleReaderType {
    type Element = f64;

    fn element_size(&self) -> usize {
        self.byte_size()
    }

    fn read_element(&self, buf: &mut ByteBuffer<'_>, options: &ReadOptions) -> Result<f64> {
        let decode = self.decoder()?;
        Ok(options.calibrate(decode(buf)?))
    }

    fn fill_lane(
        &self,
        buf: &mut ByteBuffer<'_>,
        mut lane: ArrayViewMut1<'_, f64>,
        options: &ReadOptions,
    ) -> Result<()> {
        let decode = self.decoder()?;
        let len = lane.len();
        self.check_available(buf, len, options)?;
        for k in 0..len {
            let value = options.calibrate(decode(buf)?);
            lane[options.direction.destination(k, len)] = value;
            if options.skip_bytes > 0 {
                buf.skip(options.skip_bytes)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Integer results
// ============================================================================

/// Source formats decodable into `i32` arrays (plain cast, no calibration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntReaderType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
}

fn decode_int_i8(buf: &mut ByteBuffer<'_>) -> Result<i32> {
    Ok(buf.read_i8()? as i32)
}

fn decode_int_u8(buf: &mut ByteBuffer<'_>) -> Result<i32> {
    Ok(buf.read_u8()? as i32)
}

fn decode_int_i16(buf: &mut ByteBuffer<'_>) -> Result<i32> {
    Ok(buf.read_i16()? as i32)
}

fn decode_int_u16(buf: &mut ByteBuffer<'_>) -> Result<i32> {
    Ok(buf.read_u16()? as i32)
}

fn decode_int_i32(buf: &mut ByteBuffer<'_>) -> Result<i32> {
    buf.read_i32()
}

/// Indexed by `IntReaderType as usize`
const INT_DECODERS: [IntDecodeFn; 5] = [
    decode_int_i8,
    decode_int_u8,
    decode_int_i16,
    decode_int_u16,
    decode_int_i32,
];

impl IntReaderType {
    pub const ALL: [IntReaderType; 5] = [
        IntReaderType::Int8,
        IntReaderType::UInt8,
        IntReaderType::Int16,
        IntReaderType::UInt16,
        IntReaderType::Int32,
    ];

    pub fn from_descriptor(byte_size: usize, signed: bool) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.byte_size() == byte_size && t.is_signed() == signed)
    }

    pub fn byte_size(self) -> usize {
        match self {
            IntReaderType::Int8 | IntReaderType::UInt8 => 1,
            IntReaderType::Int16 | IntReaderType::UInt16 => 2,
            IntReaderType::Int32 => 4,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntReaderType::Int8 | IntReaderType::Int16 | IntReaderType::Int32
        )
    }

    #[inline]
    fn decoder(self) -> IntDecodeFn {
        INT_DECODERS[self as usize]
    }
}

impl ArrayElementReader for IntReaderType {
    type Element = i32;

    fn element_size(&self) -> usize {
        self.byte_size()
    }

    fn read_element(&self, buf: &mut ByteBuffer<'_>, _options: &ReadOptions) -> Result<i32> {
        (self.decoder())(buf)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Endian;

    #[test]
    fn test_descriptor_lookup() {
        assert_eq!(
            DoubleReaderType::from_descriptor(2, false, false),
            Some(DoubleReaderType::UInt16)
        );
        assert_eq!(
            DoubleReaderType::from_descriptor(10, true, true),
            Some(DoubleReaderType::Float80)
        );
        assert_eq!(DoubleReaderType::from_descriptor(3, true, false), None);
        assert_eq!(
            IntReaderType::from_descriptor(1, true),
            Some(IntReaderType::Int8)
        );
    }

    #[test]
    fn test_calibration_applied() {
        let bytes = [10u8, 20, 30];
        let mut buf = ByteBuffer::new(&bytes);
        let options = ReadOptions::new().with_calibration(0.5, 1.0);
        let values = DoubleReaderType::UInt8.read_1d(&mut buf, 3, &options).unwrap();
        assert_eq!(values, vec![6.0, 11.0, 16.0]);
    }

    #[test]
    fn test_stride_and_reverse() {
        // int16 big-endian values 1, 2, 3 each followed by two padding bytes
        let bytes = [0, 1, 0xAA, 0xAA, 0, 2, 0xAA, 0xAA, 0, 3, 0xAA, 0xAA];
        let mut buf = ByteBuffer::with_endian(&bytes, Endian::Big);
        let options = ReadOptions::new()
            .with_skip_bytes(2)
            .with_direction(DataStorageDirection::Reversed);
        let values = IntReaderType::Int16.read_1d(&mut buf, 3, &options).unwrap();
        assert_eq!(values, vec![3, 2, 1]);
        assert_eq!(buf.position(), 12);
    }

    #[test]
    fn test_unsigned_64_above_signed_range() {
        let raw = u64::MAX - 1024;
        let bytes = raw.to_le_bytes();
        let mut buf = ByteBuffer::new(&bytes);
        let values = DoubleReaderType::UInt64
            .read_1d(&mut buf, 1, &ReadOptions::default())
            .unwrap();
        assert_eq!(values[0], raw as f64);
        assert!(values[0] > i64::MAX as f64);
    }

    #[test]
    fn test_extended_floats_unimplemented() {
        let bytes = [0u8; 20];
        for t in [DoubleReaderType::Float48, DoubleReaderType::Float80] {
            let mut buf = ByteBuffer::new(&bytes);
            let err = t.read_1d(&mut buf, 2, &ReadOptions::default()).unwrap_err();
            assert!(matches!(err, AfmError::Unimplemented { .. }));
            assert!(!t.is_supported());
            assert_eq!(buf.position(), 0);
        }
    }

    #[test]
    fn test_half_float() {
        let bytes = f16::from_f64(-2.5).to_bits().to_le_bytes();
        let mut buf = ByteBuffer::new(&bytes);
        let v = DoubleReaderType::Float16
            .read_1d(&mut buf, 1, &ReadOptions::default())
            .unwrap();
        assert_eq!(v, vec![-2.5]);
    }

    #[test]
    fn test_fill_column_bounds() {
        let bytes = [1u8, 2, 3, 4];
        let mut buf = ByteBuffer::new(&bytes);
        let mut array = Array2::<i32>::zeros((2, 2));
        IntReaderType::UInt8
            .fill_column(&mut buf, &mut array, 1, &ReadOptions::default())
            .unwrap();
        assert_eq!(array[[0, 1]], 1);
        assert_eq!(array[[1, 1]], 2);
        assert!(IntReaderType::UInt8
            .fill_column(&mut buf, &mut array, 2, &ReadOptions::default())
            .is_err());
    }
}
