//! Error type for grid construction, partitioning and stitching.

use std::fmt;

/// Error type for tile grid operations.
///
/// Every variant is fatal for the operation that produced it: nothing is
/// partially tiled or partially stitched when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Tile size of zero was requested
    ZeroTileSize,
    /// Raster has no pixels along at least one axis
    EmptyRaster {
        /// Axis-0 extent of the raster
        height: usize,
        /// Axis-1 extent of the raster
        width: usize,
    },
    /// Raster is neither `(H, W)` nor `(1, H, W)`
    UnsupportedRasterShape {
        /// Shape that was supplied
        shape: Vec<usize>,
    },
    /// Channel index past the end of the mosaic
    ChannelOutOfRange {
        /// Requested channel
        index: usize,
        /// Channels available
        count: usize,
    },
    /// Number of masks does not match `rows * cols`
    MaskCountMismatch {
        /// `rows * cols` of the grid
        expected: usize,
        /// Number of masks supplied
        actual: usize,
    },
    /// A mask is not `tile_size x tile_size`
    MaskTileShape {
        /// Expected side length
        tile_size: usize,
        /// `(height, width)` of the supplied masks
        actual: (usize, usize),
    },
    /// A flat mask buffer cannot be reshaped into the grid's tiles
    MaskLengthMismatch {
        /// `rows * cols * tile_size * tile_size`
        expected: usize,
        /// Number of elements supplied
        actual: usize,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::ZeroTileSize => write!(f, "tile size must be greater than zero"),
            GridError::EmptyRaster { height, width } => {
                write!(f, "raster is empty ({}x{})", height, width)
            }
            GridError::UnsupportedRasterShape { shape } => {
                write!(
                    f,
                    "unsupported raster shape {:?} (expected (H, W) or (1, H, W))",
                    shape
                )
            }
            GridError::ChannelOutOfRange { index, count } => {
                write!(f, "channel {} out of range ({} channels)", index, count)
            }
            GridError::MaskCountMismatch { expected, actual } => {
                write!(
                    f,
                    "mask count mismatch: grid has {} tiles, got {} masks",
                    expected, actual
                )
            }
            GridError::MaskTileShape { tile_size, actual } => {
                write!(
                    f,
                    "mask tile shape mismatch: expected {}x{}, got {}x{}",
                    tile_size, tile_size, actual.0, actual.1
                )
            }
            GridError::MaskLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "cannot reshape {} mask values into grid tiles (expected {})",
                    actual, expected
                )
            }
        }
    }
}

impl std::error::Error for GridError {}
