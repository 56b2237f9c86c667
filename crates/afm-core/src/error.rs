//! Error type shared by the decoding layer and the channel data model

use thiserror::Error;

/// Error type for decoding and channel data operations
#[derive(Error, Debug)]
pub enum AfmError {
    /// I/O errors from the ingestion layer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source ran out before the requested elements were decoded
    #[error("Unexpected end of data: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// Number formats the reader knows about but cannot decode
    #[error("Reading {format} values is not implemented")]
    Unimplemented { format: &'static str },

    /// `from`/`to` outside `[0, count]` or `from > to`
    #[error("Invalid index range [{from}, {to}) for {count} items")]
    InvalidIndexRange { from: usize, to: usize, count: usize },

    /// Any other argument violating an operation's contract
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Nodes of an irregular axis must not decrease
    #[error("Axis nodes are not in non-decreasing order")]
    NotMonotonic,

    /// Interpolation could not be built for the data at hand
    #[error("Interpolation failed: {0}")]
    Interpolation(String),

    /// Fatal allocation failure; aborts a whole ingestion batch
    #[error("Out of memory while {context}")]
    OutOfMemory { context: String },
}

pub type Result<T> = std::result::Result<T, AfmError>;

/// Validate a half-open index window against an item count.
pub(crate) fn check_index_range(from: usize, to: usize, count: usize) -> Result<()> {
    if from > to || to > count {
        return Err(AfmError::InvalidIndexRange { from, to, count });
    }
    Ok(())
}
