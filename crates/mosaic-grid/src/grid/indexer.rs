//! Row-major FOV indexing.

use crate::grid::GridShape;

/// Position of a tile in the grid, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

impl GridPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Bijection between grid positions and FOV indices.
///
/// `fov = row * cols + col`, and back with `row = fov / cols`,
/// `col = fov % cols`. The partitioner numbers tiles with [`index`] and the
/// stitcher places masks with [`position`], so the two agree by
/// construction.
///
/// [`index`]: GridIndexer::index
/// [`position`]: GridIndexer::position
///
/// # Example
///
/// ```
/// use mosaic_grid::{GridPosition, GridShape};
///
/// let indexer = GridShape::new(4, 3).indexer();
/// assert_eq!(indexer.index(GridPosition::new(3, 2)), 11);
/// assert_eq!(indexer.position(7), GridPosition::new(2, 1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndexer {
    shape: GridShape,
}

impl GridIndexer {
    pub fn new(shape: GridShape) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// FOV index of a grid position.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that the position lies inside the grid.
    #[inline]
    pub fn index(&self, pos: GridPosition) -> usize {
        debug_assert!(
            pos.row < self.shape.rows() && pos.col < self.shape.cols(),
            "position {:?} outside {}",
            pos,
            self.shape
        );
        pos.row * self.shape.cols() + pos.col
    }

    /// Grid position of a FOV index.
    ///
    /// # Panics (debug only)
    ///
    /// Debug-asserts that `fov < rows * cols`.
    #[inline]
    pub fn position(&self, fov: usize) -> GridPosition {
        debug_assert!(fov < self.shape.len(), "fov {} outside {}", fov, self.shape);
        GridPosition {
            row: fov / self.shape.cols(),
            col: fov % self.shape.cols(),
        }
    }

    /// Bounds-checked [`position`](Self::position).
    pub fn try_position(&self, fov: usize) -> Option<GridPosition> {
        if fov < self.shape.len() {
            Some(self.position(fov))
        } else {
            None
        }
    }

    /// All positions in FOV order (row-major).
    pub fn positions(&self) -> Positions {
        Positions {
            indexer: *self,
            next: 0,
        }
    }
}

/// Iterator over `(fov, position)` pairs in ascending FOV order.
#[derive(Debug, Clone)]
pub struct Positions {
    indexer: GridIndexer,
    next: usize,
}

impl Iterator for Positions {
    type Item = (usize, GridPosition);

    fn next(&mut self) -> Option<Self::Item> {
        let fov = self.next;
        let pos = self.indexer.try_position(fov)?;
        self.next += 1;
        Some((fov, pos))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.indexer.shape.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Positions {}
