//! A single tile and the source region it covers.

use ndarray::Array2;

use crate::grid::GridPosition;

/// Half-open source region `[row_start, row_end) x [col_start, col_end)`
/// copied into a tile before padding.
///
/// Displays as `x1,x2,y1,y2` (axis-0 bounds first), the layout of the
/// tile bounds record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileBounds {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl TileBounds {
    /// Rows actually covered by source pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Columns actually covered by source pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.col_end - self.col_start
    }

    /// Whether the tile needed zero padding.
    pub fn is_clipped(&self, tile_size: usize) -> bool {
        self.height() < tile_size || self.width() < tile_size
    }
}

impl std::fmt::Display for TileBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.row_start, self.row_end, self.col_start, self.col_end
        )
    }
}

/// One `tile_size x tile_size` tile of a raster.
///
/// The source window occupies the top-left corner of `data`; anything
/// beyond [`bounds`](Tile::bounds) is zero (`T::default()`).
#[derive(Debug, Clone)]
pub struct Tile<T> {
    pub fov: usize,
    pub position: GridPosition,
    pub bounds: TileBounds,
    pub data: Array2<T>,
}
