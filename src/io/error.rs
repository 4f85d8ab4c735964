//! Error types for cascade construction
//!
//! Only [`CascadeError`] ever reaches a caller. [`TileError`] and [`CellError`]
//! describe failures that are absorbed where they happen: a tile that fails is
//! left out of the catalog, a cell that fails contributes no weight.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for all cascade operations
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Reference image has no pixels
    #[error("Reference image is empty ({width}x{height})")]
    EmptyReference {
        /// Width of the rejected reference
        width: u32,
        /// Height of the rejected reference
        height: u32,
    },

    /// Reference bytes could not be decoded into an image
    #[error("Failed to decode reference image: {source}")]
    ReferenceDecode {
        /// Underlying codec error
        source: image::ImageError,
    },

    /// No usable tile remained after filtering the pool
    #[error("Tile pool is empty: {skipped} of {attempted} tiles could not be used")]
    EmptyTilePool {
        /// Number of tile identifiers offered
        attempted: usize,
        /// Number of tiles that failed to load
        skipped: usize,
    },

    /// Caller-supplied parameter failed validation
    #[error("Invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Reference dimensions disagree with the planned grid
    #[error(
        "Grid covers {grid_width}x{grid_height} but reference is {reference_width}x{reference_height}"
    )]
    GeometryMismatch {
        /// Width covered by the grid
        grid_width: usize,
        /// Height covered by the grid
        grid_height: usize,
        /// Width of the reference buffer
        reference_width: usize,
        /// Height of the reference buffer
        reference_height: usize,
    },

    /// Final buffer could not be encoded
    #[error("Failed to encode output as {format}: {source}")]
    Encode {
        /// Requested output format
        format: &'static str,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// General file system operation failure
    #[error("File system error during {operation} on '{}': {source}", .path.display())]
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Worker pool could not be created
    #[error("Failed to build worker pool: {source}")]
    ThreadPool {
        /// Underlying rayon error
        source: rayon::ThreadPoolBuildError,
    },

    /// Numerical or buffer computation produced an invalid result
    #[error("Computation error in {operation}: {reason}")]
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl CascadeError {
    /// Whether the error stems from caller input rather than processing
    ///
    /// Input errors are raised before any tile or cell work begins.
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyReference { .. }
                | Self::ReferenceDecode { .. }
                | Self::EmptyTilePool { .. }
                | Self::InvalidParameter { .. }
                | Self::GeometryMismatch { .. }
        )
    }
}

/// Convenience type alias for cascade results
pub type Result<T> = std::result::Result<T, CascadeError>;

/// Why a single candidate tile was left out of the catalog
#[derive(Debug, Error)]
pub enum TileError {
    /// Tile bytes could not be read from the source
    #[error("Tile '{id}' is unreadable: {source}")]
    Unreadable {
        /// Tile identifier
        id: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Tile bytes are not a decodable image
    #[error("Tile '{id}' failed to decode: {source}")]
    Decode {
        /// Tile identifier
        id: String,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// Tile would shrink to nothing inside the cell
    #[error("Tile '{id}' ({width}x{height}) collapses to zero size in a {cell_width}x{cell_height} cell")]
    Degenerate {
        /// Tile identifier
        id: String,
        /// Decoded tile width
        width: u32,
        /// Decoded tile height
        height: u32,
        /// Target cell width
        cell_width: u32,
        /// Target cell height
        cell_height: u32,
    },
}

/// Why a single grid cell made no contribution
#[derive(Debug, Error)]
pub enum CellError {
    /// The tile pool had no candidate to offer
    #[error("No candidate tile for cell ({column}, {row})")]
    NoCandidate {
        /// Column of the cell
        column: usize,
        /// Row of the cell
        row: usize,
    },

    /// Buffers for the cell disagree in shape
    #[error("Cell ({column}, {row}) expected {expected:?} but got {actual:?}")]
    ShapeMismatch {
        /// Column of the cell
        column: usize,
        /// Row of the cell
        row: usize,
        /// Expected (height, width)
        expected: (usize, usize),
        /// Actual (height, width)
        actual: (usize, usize),
    },

    /// Tile samples could not be viewed as a (height, width, channel) array
    #[error("Cell ({column}, {row}) tile buffer has an unexpected layout: {source}")]
    Layout {
        /// Column of the cell
        column: usize,
        /// Row of the cell
        row: usize,
        /// Underlying shape error
        source: ndarray::ShapeError,
    },
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> CascadeError {
    CascadeError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> CascadeError {
    CascadeError::Computation {
        operation,
        reason: reason.to_string(),
    }
}

impl From<rayon::ThreadPoolBuildError> for CascadeError {
    fn from(source: rayon::ThreadPoolBuildError) -> Self {
        Self::ThreadPool { source }
    }
}

