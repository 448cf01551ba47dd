//! Grid shape computation.

use crate::error::GridError;
use crate::grid::GridIndexer;

/// Default tile side length in pixels.
///
/// 2048 is the largest tile the downstream segmentation model accepts.
pub const DEFAULT_TILE_SIZE: usize = 2048;

/// Start offsets `0, T, 2T, ...` strictly below `extent`.
///
/// This is the enumeration the grid is defined by: an extent that is an
/// exact multiple of `tile_size` gets no trailing empty tile, and any
/// remainder gets one clipped tile.
///
/// # Example
///
/// ```
/// use mosaic_grid::step_offsets;
///
/// assert_eq!(step_offsets(7290, 2048), vec![0, 2048, 4096, 6144]);
/// assert_eq!(step_offsets(4096, 2048), vec![0, 2048]);
/// ```
pub fn step_offsets(extent: usize, tile_size: usize) -> Vec<usize> {
    if tile_size == 0 {
        return Vec::new();
    }
    (0..extent).step_by(tile_size).collect()
}

/// Number of tile rows and columns covering one raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    rows: usize,
    cols: usize,
}

impl GridShape {
    /// Create a shape from explicit counts (e.g. read back from metadata).
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Shape of the grid covering a `height x width` raster.
    ///
    /// Rows follow axis 0 and columns follow axis 1.
    pub fn covering(height: usize, width: usize, tile_size: usize) -> Result<Self, GridError> {
        if tile_size == 0 {
            return Err(GridError::ZeroTileSize);
        }
        if height == 0 || width == 0 {
            return Err(GridError::EmptyRaster { height, width });
        }
        Ok(Self {
            rows: step_offsets(height, tile_size).len(),
            cols: step_offsets(width, tile_size).len(),
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of tiles, `rows * cols`.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indexer for this grid's row-major FOV numbering.
    pub fn indexer(&self) -> GridIndexer {
        GridIndexer::new(*self)
    }
}

impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} rows x {} cols", self.rows, self.cols)
    }
}
