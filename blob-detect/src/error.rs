use thiserror::Error;

use crate::algo::bounded_stack::StackError;

/// Errors produced by a single detection call.
///
/// Validation errors are raised before any computation starts. Allocation and
/// frontier errors abort the call; no partial blob list is ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Kernel is not square or its side is not a positive odd number.
    #[error("kernel must be square with odd side >= 1, got {rows}x{cols}")]
    InvalidKernel {
        /// Number of kernel rows.
        rows: usize,
        /// Number of kernel columns.
        cols: usize,
    },

    /// Filter mode integer does not name a preset kernel.
    #[error("unknown filter mode {0} (0 = none, 1 = box, 2 = sharpen)")]
    UnknownFilterMode(i64),

    /// Sample count does not match `width * height`.
    #[error("sample count mismatch: {width}x{height} grid needs {expected} samples, got {actual}")]
    SizeMismatch {
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
        /// Expected sample count.
        expected: usize,
        /// Samples actually supplied.
        actual: usize,
    },

    /// Grid has a zero dimension.
    #[error("grid must have at least one row and one column, got {width}x{height}")]
    EmptyGrid {
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// `width * height` does not fit in `usize`.
    #[error("frame dimensions {width}x{height} overflow the addressable pixel count")]
    FrameTooLarge {
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// Sample standard deviation needs at least two pixels.
    #[error("standard deviation needs at least 2 samples, got {count}")]
    DegenerateStatistics {
        /// Number of samples in the grid.
        count: usize,
    },

    /// Blob list capacity must be at least one.
    #[error("max_blobs must be at least 1, got {0}")]
    InvalidCapacity(usize),

    /// Host request could not be parsed or converted.
    #[error("invalid detection request: {0}")]
    InvalidRequest(String),

    /// Buffer reservation failed.
    #[error("failed to allocate {requested} elements for {buffer}")]
    Allocation {
        /// Which buffer was being reserved.
        buffer: &'static str,
        /// Number of elements requested.
        requested: usize,
    },

    /// Flood-fill frontier rejected a push or pop.
    #[error("flood-fill frontier failure: {0}")]
    Frontier(#[from] StackError),
}
