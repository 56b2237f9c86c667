//! Property tests for decoding, grid inference and index-range merging

use afm_core::{
    ArrayElementReader, ArrayStorageType, ByteBuffer, DataAxis1D, DataStorageDirection,
    DoubleReaderType, Endian, Grid1D, IndexRange, IntReaderType, Quantity, ReadOptions,
    SortedArrayOrder, Unit, DEFAULT_GRID_TOLERANCE,
};
use ndarray::Array2;
use proptest::prelude::*;

// =============================================================================
// Helpers
// =============================================================================

const DECODABLE: [DoubleReaderType; 11] = [
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
    DoubleReaderType::Float64,
];

/// Little-endian bytes of `seed` narrowed to `format`, plus the value the
/// decoder must produce for them.
fn encode(format: DoubleReaderType, seed: i64) -> (Vec<u8>, f64) {
    let float = seed as f64 / 7.0;
    match format {
        DoubleReaderType::Int8 => ((seed as i8).to_le_bytes().to_vec(), f64::from(seed as i8)),
        DoubleReaderType::UInt8 => ((seed as u8).to_le_bytes().to_vec(), f64::from(seed as u8)),
        DoubleReaderType::Int16 => ((seed as i16).to_le_bytes().to_vec(), f64::from(seed as i16)),
        DoubleReaderType::UInt16 => ((seed as u16).to_le_bytes().to_vec(), f64::from(seed as u16)),
        DoubleReaderType::Int32 => ((seed as i32).to_le_bytes().to_vec(), f64::from(seed as i32)),
        DoubleReaderType::UInt32 => ((seed as u32).to_le_bytes().to_vec(), f64::from(seed as u32)),
        DoubleReaderType::Int64 => (seed.to_le_bytes().to_vec(), seed as f64),
        DoubleReaderType::UInt64 => ((seed as u64).to_le_bytes().to_vec(), seed as u64 as f64),
        DoubleReaderType::Float16 => {
            let h = half::f16::from_f64(float);
            (h.to_le_bytes().to_vec(), h.to_f64())
        }
        DoubleReaderType::Float32 => {
            let f = float as f32;
            (f.to_le_bytes().to_vec(), f64::from(f))
        }
        DoubleReaderType::Float64 => (float.to_le_bytes().to_vec(), float),
        DoubleReaderType::Float48 | DoubleReaderType::Float80 => {
            unreachable!("{} has no decoder", format.name())
        }
    }
}

/// Same as [`encode`] for the integer reader
fn encode_int(format: IntReaderType, seed: i64) -> (Vec<u8>, i32) {
    match format {
        IntReaderType::Int8 => ((seed as i8).to_le_bytes().to_vec(), i32::from(seed as i8)),
        IntReaderType::UInt8 => ((seed as u8).to_le_bytes().to_vec(), i32::from(seed as u8)),
        IntReaderType::Int16 => ((seed as i16).to_le_bytes().to_vec(), i32::from(seed as i16)),
        IntReaderType::UInt16 => ((seed as u16).to_le_bytes().to_vec(), i32::from(seed as u16)),
        IntReaderType::Int32 => ((seed as i32).to_le_bytes().to_vec(), seed as i32),
    }
}

/// Encoded stream in `endian` byte order with `skip` filler bytes after
/// every element.
fn stream_with<T>(
    seeds: &[i64],
    endian: Endian,
    skip: usize,
    encode_one: impl Fn(i64) -> (Vec<u8>, T),
) -> (Vec<u8>, Vec<T>) {
    let mut bytes = Vec::new();
    let mut expected = Vec::new();
    for &seed in seeds {
        let (mut b, v) = encode_one(seed);
        if endian == Endian::Big {
            b.reverse();
        }
        bytes.extend(b);
        bytes.extend(std::iter::repeat(0xAA).take(skip));
        expected.push(v);
    }
    (bytes, expected)
}

fn stream(format: DoubleReaderType, seeds: &[i64], skip: usize) -> (Vec<u8>, Vec<f64>) {
    stream_with(seeds, Endian::Little, skip, |seed| encode(format, seed))
}

fn endians() -> impl Strategy<Value = Endian> {
    prop_oneof![Just(Endian::Little), Just(Endian::Big)]
}

fn directions() -> impl Strategy<Value = DataStorageDirection> {
    prop_oneof![
        Just(DataStorageDirection::Forward),
        Just(DataStorageDirection::Reversed)
    ]
}

/// Where the `k`-th element of the stream lands in a `rows x columns` array
fn destination_2d(
    k: usize,
    rows: usize,
    columns: usize,
    storage: ArrayStorageType,
    between: DataStorageDirection,
    inside: DataStorageDirection,
) -> (usize, usize) {
    let len = storage.vector_length(rows, columns);
    let count = storage.vector_count(rows, columns);
    let vector = between.destination(k / len, count);
    let element = inside.destination(k % len, len);
    match storage {
        ArrayStorageType::RowByRow => (vector, element),
        ArrayStorageType::ColumnByColumn => (element, vector),
    }
}

fn nm(name: &str) -> Quantity {
    Quantity::new(name, Unit::new("m", -9))
}

fn index_ranges() -> impl Strategy<Value = Vec<IndexRange>> {
    prop::collection::vec((0isize..60, -1isize..8), 0..12)
        .prop_map(|v| v.into_iter().map(|(min, len)| IndexRange::new(min, min + len)).collect())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_decode_matches_reference_encoding(
        format in prop::sample::select(DECODABLE.to_vec()),
        seeds in prop::collection::vec(any::<i64>(), 0..48),
        skip in 0usize..4,
    ) {
        let (bytes, expected) = stream(format, &seeds, skip);
        let mut buf = ByteBuffer::new(&bytes);
        let decoded = format
            .read_1d(&mut buf, seeds.len(), &ReadOptions::new().with_skip_bytes(skip))
            .unwrap();
        prop_assert_eq!(decoded, expected);
        prop_assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn prop_decode_in_either_byte_order(
        format in prop::sample::select(DECODABLE.to_vec()),
        seeds in prop::collection::vec(any::<i64>(), 0..32),
        endian in endians(),
        skip in 0usize..3,
    ) {
        let (bytes, expected) = stream_with(&seeds, endian, skip, |seed| encode(format, seed));
        let mut buf = ByteBuffer::with_endian(&bytes, endian);
        let decoded = format
            .read_1d(&mut buf, seeds.len(), &ReadOptions::new().with_skip_bytes(skip))
            .unwrap();
        prop_assert_eq!(decoded, expected);
    }

    #[test]
    fn prop_int_decode_matches_reference_encoding(
        format in prop::sample::select(IntReaderType::ALL.to_vec()),
        seeds in prop::collection::vec(any::<i64>(), 0..48),
        endian in endians(),
        skip in 0usize..4,
    ) {
        let (bytes, expected) = stream_with(&seeds, endian, skip, |seed| encode_int(format, seed));
        let mut buf = ByteBuffer::with_endian(&bytes, endian);
        let options = ReadOptions::new().with_skip_bytes(skip);
        let decoded = format.read_1d(&mut buf, seeds.len(), &options).unwrap();
        prop_assert_eq!(&decoded, &expected);
        prop_assert_eq!(buf.remaining(), 0);

        let mut reversed = format
            .read_1d(
                &mut ByteBuffer::with_endian(&bytes, endian),
                seeds.len(),
                &options.with_direction(DataStorageDirection::Reversed),
            )
            .unwrap();
        reversed.reverse();
        prop_assert_eq!(reversed, expected);
    }

    #[test]
    fn prop_2d_assembly_honours_stride_and_directions(
        format in prop::sample::select(IntReaderType::ALL.to_vec()),
        rows in 1usize..5,
        columns in 1usize..5,
        column_major in any::<bool>(),
        between in directions(),
        inside in directions(),
        endian in endians(),
        skip in 0usize..3,
        seed in any::<i64>(),
    ) {
        let storage = if column_major {
            ArrayStorageType::ColumnByColumn
        } else {
            ArrayStorageType::RowByRow
        };
        let seeds: Vec<i64> = (0..rows * columns)
            .map(|k| seed.wrapping_add((k as i64).wrapping_mul(0x9E37_79B9)))
            .collect();
        let (bytes, values) = stream_with(&seeds, endian, skip, |s| encode_int(format, s));

        let mut expected = Array2::zeros((rows, columns));
        for (k, &v) in values.iter().enumerate() {
            expected[destination_2d(k, rows, columns, storage, between, inside)] = v;
        }

        let mut buf = ByteBuffer::with_endian(&bytes, endian);
        let options = ReadOptions::new().with_skip_bytes(skip).with_direction(inside);
        let decoded = format
            .read_2d(&mut buf, rows, columns, storage, between, &options)
            .unwrap();
        prop_assert_eq!(decoded, expected);
        prop_assert_eq!(buf.position(), bytes.len());
    }

    #[test]
    fn prop_reversed_direction_mirrors_forward(
        format in prop::sample::select(DECODABLE.to_vec()),
        seeds in prop::collection::vec(any::<i64>(), 1..48),
        skip in 0usize..4,
    ) {
        let (bytes, _) = stream(format, &seeds, skip);
        let options = ReadOptions::new().with_skip_bytes(skip).with_calibration(0.5, -3.0);

        let mut forward = format
            .read_1d(&mut ByteBuffer::new(&bytes), seeds.len(), &options)
            .unwrap();
        let reversed = format
            .read_1d(
                &mut ByteBuffer::new(&bytes),
                seeds.len(),
                &options.with_direction(DataStorageDirection::Reversed),
            )
            .unwrap();
        forward.reverse();
        prop_assert_eq!(forward, reversed);
    }

    #[test]
    fn prop_short_buffer_is_not_consumed(
        format in prop::sample::select(DECODABLE.to_vec()),
        seeds in prop::collection::vec(any::<i64>(), 1..16),
    ) {
        let (bytes, _) = stream(format, &seeds, 0);
        let mut buf = ByteBuffer::new(&bytes);
        prop_assert!(format.read_1d(&mut buf, seeds.len() + 1, &ReadOptions::new()).is_err());
        prop_assert_eq!(buf.position(), 0);
    }

    #[test]
    fn prop_grid_inference_recovers_grid(
        origin in -1.0e3f64..1.0e3,
        increment in 1.0e-3f64..10.0,
        count in 2usize..200,
        descending in any::<bool>(),
    ) {
        let signed = if descending { -increment } else { increment };
        let grid = Grid1D::new(origin, signed, count, nm("Distance")).unwrap();
        let nodes = grid.nodes();

        let inferred =
            Grid1D::try_build_regular_grid(&nodes, nm("Distance"), DEFAULT_GRID_TOLERANCE);
        prop_assert!(inferred.is_some());
        let inferred = inferred.unwrap();
        prop_assert_eq!(inferred.count(), count);
        let expected_order = if descending {
            SortedArrayOrder::Descending
        } else {
            SortedArrayOrder::Ascending
        };
        prop_assert_eq!(inferred.order(), expected_order);
        prop_assert!(grid.equal_up_to_prefix(&inferred));

        // inferring again from the inferred nodes is stable
        let again = Grid1D::try_build_regular_grid(
            &inferred.nodes(),
            nm("Distance"),
            DEFAULT_GRID_TOLERANCE,
        );
        prop_assert!(again.is_some_and(|g| g.equal_up_to_prefix(&inferred)));
    }

    #[test]
    fn prop_simplify_is_order_independent(
        (ranges, shuffled) in index_ranges()
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        prop_assert_eq!(IndexRange::simplify(&ranges), IndexRange::simplify(&shuffled));
    }

    #[test]
    fn prop_simplify_yields_disjoint_cover(ranges in index_ranges()) {
        let merged = IndexRange::simplify(&ranges);

        for pair in merged.windows(2) {
            prop_assert!(!pair[0].is_connected_to(&pair[1]));
            prop_assert!(pair[0].max < pair[1].min);
        }
        for range in ranges.iter().filter(|r| !r.is_empty()) {
            prop_assert!(merged.iter().any(|m| m.contains_range(range)));
        }
        let covered: usize = ranges
            .iter()
            .flat_map(|r| r.min..=r.max)
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        prop_assert_eq!(merged.iter().map(IndexRange::len).sum::<usize>(), covered);
    }
}
