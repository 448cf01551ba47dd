//! Grid geometry shared by the partitioner and the stitcher.
//!
//! [`GridShape`] counts the tiles needed to cover a raster and
//! [`GridIndexer`] maps between `(row, col)` grid positions and the scalar
//! FOV index. Both sides of the tile/stitch round trip go through the same
//! indexer, so the row-major ordering lives in exactly one place.

mod indexer;
mod shape;

pub use indexer::{GridIndexer, GridPosition, Positions};
pub use shape::{step_offsets, GridShape, DEFAULT_TILE_SIZE};
