//! Tile partitioner.

use ndarray::{s, Array2, ArrayView2};

use crate::error::GridError;
use crate::grid::{step_offsets, GridShape, Positions};
use crate::partition::{Tile, TileBounds};

/// Splits a raster into a row-major grid of `tile_size x tile_size` tiles.
///
/// Interior tiles are exact sub-windows. The last tile along each axis is
/// clipped to the raster boundary and zero-padded on the bottom/right so
/// every tile has the same shape.
///
/// # Example
///
/// ```
/// use mosaic_grid::TilePartitioner;
/// use ndarray::Array2;
///
/// let raster = Array2::<u16>::ones((5, 3));
/// let partitioner = TilePartitioner::new(4).unwrap();
/// let partition = partitioner.partition(raster.view()).unwrap();
///
/// assert_eq!(partition.shape().rows(), 2);
/// assert_eq!(partition.shape().cols(), 1);
///
/// let tiles: Vec<_> = partition.collect();
/// assert_eq!(tiles[1].data.dim(), (4, 4));
/// assert_eq!(tiles[1].data[[0, 0]], 1);
/// assert_eq!(tiles[1].data[[1, 0]], 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePartitioner {
    tile_size: usize,
}

impl TilePartitioner {
    pub fn new(tile_size: usize) -> Result<Self, GridError> {
        if tile_size == 0 {
            return Err(GridError::ZeroTileSize);
        }
        Ok(Self { tile_size })
    }

    #[inline]
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Grid shape this partitioner produces for `raster`.
    pub fn grid_shape<T>(&self, raster: ArrayView2<'_, T>) -> Result<GridShape, GridError> {
        let (height, width) = raster.dim();
        GridShape::covering(height, width, self.tile_size)
    }

    /// Lazily partition `raster`.
    ///
    /// Tiles are allocated one at a time as the iterator advances; nothing
    /// is retained after a tile is handed out.
    pub fn partition<'a, T>(&self, raster: ArrayView2<'a, T>) -> Result<Partition<'a, T>, GridError>
    where
        T: Copy + Default,
    {
        let shape = self.grid_shape(raster)?;
        let (height, width) = raster.dim();
        tracing::debug!(
            height,
            width,
            tile_size = self.tile_size,
            rows = shape.rows(),
            cols = shape.cols(),
            "Partitioning raster"
        );
        Ok(Partition {
            raster,
            partitioner: *self,
            row_offsets: step_offsets(height, self.tile_size),
            col_offsets: step_offsets(width, self.tile_size),
            shape,
            positions: shape.indexer().positions(),
        })
    }

    /// Source-space bounds of the tile starting at `(x, y)`.
    fn covered(&self, x: usize, y: usize, height: usize, width: usize) -> TileBounds {
        let x_end = if height - x < self.tile_size {
            height
        } else {
            x + self.tile_size
        };
        let y_end = if width - y < self.tile_size {
            width
        } else {
            y + self.tile_size
        };
        TileBounds {
            row_start: x,
            row_end: x_end,
            col_start: y,
            col_end: y_end,
        }
    }
}

/// Iterator over the tiles of one raster, in FOV order.
pub struct Partition<'a, T> {
    raster: ArrayView2<'a, T>,
    partitioner: TilePartitioner,
    row_offsets: Vec<usize>,
    col_offsets: Vec<usize>,
    shape: GridShape,
    positions: Positions,
}

impl<T> Partition<'_, T> {
    /// Grid shape of the partition.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn tile_size(&self) -> usize {
        self.partitioner.tile_size
    }
}

impl<T> Iterator for Partition<'_, T>
where
    T: Copy + Default,
{
    type Item = Tile<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (fov, position) = self.positions.next()?;
        let (height, width) = self.raster.dim();
        let x = self.row_offsets[position.row];
        let y = self.col_offsets[position.col];

        let bounds = self.partitioner.covered(x, y, height, width);

        let tile_size = self.partitioner.tile_size;
        let mut data = Array2::from_elem((tile_size, tile_size), T::default());
        data.slice_mut(s![..bounds.height(), ..bounds.width()])
            .assign(&self.raster.slice(s![
                bounds.row_start..bounds.row_end,
                bounds.col_start..bounds.col_end
            ]));

        Some(Tile {
            fov,
            position,
            bounds,
            data,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.positions.size_hint()
    }
}

impl<T> ExactSizeIterator for Partition<'_, T> where T: Copy + Default {}
