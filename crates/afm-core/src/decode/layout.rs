//! Row-major and column-major assembly of 2D arrays

use super::element::ArrayElementReader;
use super::{DataStorageDirection, ReadOptions};
use crate::buffer::ByteBuffer;
use crate::error::{AfmError, Result};
use ndarray::Array2;
use tracing::{debug, instrument};

/// How the vectors of a 2D array follow each other in the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayStorageType {
    /// Each stored vector is a row of the destination array
    RowByRow,
    /// Each stored vector is a column of the destination array
    ColumnByColumn,
}

impl ArrayStorageType {
    /// Read a `rows x columns` array.
    ///
    /// Vectors are consumed in stream order; `between` decides whether the
    /// first stored vector becomes the first or the last row (column).
    #[instrument(level = "debug", skip(reader, buf, options), fields(offset = buf.position()))]
    pub fn read<R: ArrayElementReader>(
        self,
        reader: &R,
        buf: &mut ByteBuffer<'_>,
        rows: usize,
        columns: usize,
        between: DataStorageDirection,
        options: &ReadOptions,
    ) -> Result<Array2<R::Element>> {
        let items = rows
            .checked_mul(columns)
            .ok_or_else(|| AfmError::InvalidArgument(format!("{rows}x{columns} overflows")))?;
        reader.check_available(buf, items, options)?;

        let mut array = Array2::from_elem((rows, columns), R::Element::default());
        match self {
            ArrayStorageType::RowByRow => {
                for k in 0..rows {
                    let row = between.destination(k, rows);
                    reader.fill_row(buf, &mut array, row, options)?;
                }
            }
            ArrayStorageType::ColumnByColumn => {
                for k in 0..columns {
                    let column = between.destination(k, columns);
                    reader.fill_column(buf, &mut array, column, options)?;
                }
            }
        }

        debug!(rows, columns, end = buf.position(), "2D array decoded");
        Ok(array)
    }

    /// Number of elements in each stored vector
    pub fn vector_length(self, rows: usize, columns: usize) -> usize {
        match self {
            ArrayStorageType::RowByRow => columns,
            ArrayStorageType::ColumnByColumn => rows,
        }
    }

    /// Number of stored vectors
    pub fn vector_count(self, rows: usize, columns: usize) -> usize {
        match self {
            ArrayStorageType::RowByRow => rows,
            ArrayStorageType::ColumnByColumn => columns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DoubleReaderType, IntReaderType};
    use crate::types::Endian;

    const BYTES: [u8; 6] = [1, 2, 3, 4, 5, 6];

    #[test]
    fn test_row_by_row() {
        let mut buf = ByteBuffer::new(&BYTES);
        let a = IntReaderType::UInt8
            .read_2d(
                &mut buf,
                2,
                3,
                ArrayStorageType::RowByRow,
                DataStorageDirection::Forward,
                &ReadOptions::default(),
            )
            .unwrap();
        assert_eq!(a, ndarray::array![[1, 2, 3], [4, 5, 6]]);
    }

    #[test]
    fn test_column_by_column_reversed_between() {
        let mut buf = ByteBuffer::new(&BYTES);
        let a = IntReaderType::UInt8
            .read_2d(
                &mut buf,
                2,
                3,
                ArrayStorageType::ColumnByColumn,
                DataStorageDirection::Reversed,
                &ReadOptions::default(),
            )
            .unwrap();
        // first stored column lands in the last column
        assert_eq!(a, ndarray::array![[5, 3, 1], [6, 4, 2]]);
        assert_eq!(buf.position(), 6);
    }

    #[test]
    fn test_both_directions_reversed() {
        let mut buf = ByteBuffer::new(&BYTES);
        let options = ReadOptions::new().with_direction(DataStorageDirection::Reversed);
        let a = DoubleReaderType::UInt8
            .read_2d(
                &mut buf,
                2,
                3,
                ArrayStorageType::RowByRow,
                DataStorageDirection::Reversed,
                &options,
            )
            .unwrap();
        assert_eq!(a, ndarray::array![[6.0, 5.0, 4.0], [3.0, 2.0, 1.0]]);
    }

    #[test]
    fn test_short_buffer_leaves_position() {
        let mut buf = ByteBuffer::new(&BYTES);
        let err = IntReaderType::UInt8
            .read_2d(
                &mut buf,
                3,
                3,
                ArrayStorageType::RowByRow,
                DataStorageDirection::Forward,
                &ReadOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, AfmError::UnexpectedEof { .. }));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_big_endian_columns_with_stride_and_reversal() {
        // stored columns, each element followed by one filler byte
        let stored: [u16; 6] = [1, 40000, 2, 5, 3, 65535];
        let bytes: Vec<u8> = stored
            .iter()
            .flat_map(|v| {
                let [hi, lo] = v.to_be_bytes();
                [hi, lo, 0xFF]
            })
            .collect();
        let mut buf = ByteBuffer::with_endian(&bytes, Endian::Big);
        let options = ReadOptions::new()
            .with_skip_bytes(1)
            .with_direction(DataStorageDirection::Reversed);
        let a = IntReaderType::UInt16
            .read_2d(
                &mut buf,
                2,
                3,
                ArrayStorageType::ColumnByColumn,
                DataStorageDirection::Reversed,
                &options,
            )
            .unwrap();
        assert_eq!(a, ndarray::array![[65535, 5, 40000], [3, 2, 1]]);
        assert_eq!(buf.position(), 18);
    }

    #[test]
    fn test_rows_with_stride_and_calibration() {
        let bytes = [10u8, 0, 0, 20, 0, 0, 30, 0, 0, 40, 0, 0];
        let mut buf = ByteBuffer::new(&bytes);
        let options = ReadOptions::new()
            .with_skip_bytes(2)
            .with_calibration(0.5, 1.0);
        let a = DoubleReaderType::UInt8
            .read_2d(
                &mut buf,
                2,
                2,
                ArrayStorageType::RowByRow,
                DataStorageDirection::Forward,
                &options,
            )
            .unwrap();
        assert_eq!(a, ndarray::array![[6.0, 11.0], [16.0, 21.0]]);
        assert_eq!(buf.remaining(), 0);
    }
}
