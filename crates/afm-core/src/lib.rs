//! # AFM Channel Data - Core Library
//!
//! Channel data model and binary array decoding for atomic force microscopy
//! data: force curves, topography and property maps.
//!
//! ## Features
//!
//! - Typed binary array reader for 8-64 bit integers and 16/32/64 bit floats,
//!   with calibration, byte strides and reversed fill order
//! - Row-by-row and column-by-column assembly of 2D images
//! - Regular and irregular 1D axes with exact coordinate/index mapping
//! - Curve (`Channel1DData`) and map (`Channel2DData`) representations that
//!   answer range, search and ROI queries identically
//! - Bilinear, bicubic spline and natural-neighbour interpolation, built
//!   lazily and cached per data object
//! - Parallel batch ingestion with cancellation and progress reporting
//! - Structured logging via `tracing` for diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use afm_core::{
//!     ArrayElementReader, ArrayStorageType, ByteBuffer, Channel2DData, DataStorageDirection,
//!     DoubleReaderType, Grid1D, Grid2D, GridChannel2DData, Quantity, ReadOptions, Unit,
//! };
//!
//! // 2 x 3 image of little-endian i16 counts, stored column by column
//! let bytes: Vec<u8> = [1i16, 4, 2, 5, 3, 6]
//!     .iter()
//!     .flat_map(|v| v.to_le_bytes())
//!     .collect();
//! let mut buf = ByteBuffer::new(&bytes);
//! let options = ReadOptions::new().with_calibration(0.5, 0.0);
//! let values = DoubleReaderType::Int16
//!     .read_2d(
//!         &mut buf,
//!         2,
//!         3,
//!         ArrayStorageType::ColumnByColumn,
//!         DataStorageDirection::Forward,
//!         &options,
//!     )
//!     .unwrap();
//!
//! let nm = |name: &str| Quantity::new(name, Unit::new("m", -9));
//! let grid = Grid2D::new(
//!     Grid1D::new(0.0, 10.0, 3, nm("X")).unwrap(),
//!     Grid1D::new(0.0, 10.0, 2, nm("Y")).unwrap(),
//! );
//! let height = GridChannel2DData::new(grid, values, nm("Height")).unwrap();
//! assert_eq!(height.z_range().max, 3.0);
//! ```
//!
//! ## Enabling Logging
//!
//! This library uses `tracing` for structured logging. To see log output,
//! initialize a tracing subscriber in your application:
//!
//! ```rust,ignore
//! // Add tracing-subscriber to your Cargo.toml
//! tracing_subscriber::fmt::init();
//!
//! // Now library logs will be visible
//! let outcome = batch.run(&reader)?;
//! ```

mod buffer;
mod error;
mod types;

pub mod axis;
pub mod channel;
pub mod channel1d;
pub mod channel2d;
pub mod decode;
pub mod geometry;
pub mod grid2d;
pub mod index_range;
pub mod ingest;
pub mod interpolation;

// Re-export public types
pub use buffer::ByteBuffer;
pub use error::{AfmError, Result};
pub use types::{
    Endian, Quantity, Range, SortedArrayOrder, Unit, DEFAULT_GRID_TOLERANCE, MAD_TO_SIGMA,
    ROBUST_RANGE_MAD_FACTOR,
};

pub use axis::{Axis1D, DataAxis1D, Grid1D, IncreasingDataAxis1D};
pub use channel::{Channel1D, Channel2D, DomainKey, DomainRegistry};
pub use channel1d::{
    channel_from_samples, Channel1DData, FlexibleChannel1DData, FunctionChannel1DData,
    GridChannel1DData, PointChannel1DData, SinusoidalChannel1DData,
};
pub use channel2d::{
    near_square_grid, robust_range, Channel2DData, FlexibleChannel2DData, GridChannel2DData,
    SemiGridChannel2DData,
};
pub use decode::{
    ArrayElementReader, ArrayStorageType, DataStorageDirection, DoubleReaderType, IntReaderType,
    ReadOptions, TwoBitReader,
};
pub use geometry::{Ellipse, Point, Polygon, Rect, RoiPosition, RoiShape};
pub use grid2d::{ArraySupport2D, CellCorner, Grid2D, IndexBlock, SemiGrid2D};
pub use index_range::IndexRange;
pub use ingest::{
    map_file, BatchIngest, BatchOutcome, CancellationToken, FailedFile, FailureKind, IngestConfig,
    Progress, ReadFailure, SourceReader, DEFAULT_MAX_WORKERS,
};
pub use interpolation::{CacheStatus, LazyInterpolation, SurfaceInterpolation};
