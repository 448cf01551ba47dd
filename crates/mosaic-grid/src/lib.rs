//! mosaic-grid: fixed-size tile grids over large 2D rasters
//!
//! This crate holds the geometry shared by two independently run steps:
//!
//! 1. **Partitioning** a channel raster into a row-major grid of
//!    `tile_size x tile_size` tiles, zero-padding the tiles on the bottom and
//!    right edges ([`TilePartitioner`]).
//! 2. **Stitching** one mask per tile back into a full-resolution mask
//!    with a derived alpha channel ([`MaskStitcher`], [`StitchedMask`]).
//!
//! The two steps only ever communicate through a [`GridShape`] that is
//! persisted between them, so both use the same [`GridIndexer`] to map a
//! tile's FOV index to its grid position.
//!
//! # Quick Start
//!
//! ```
//! use mosaic_grid::{MaskStitcher, TilePartitioner};
//! use ndarray::{Array2, Array3, Axis};
//!
//! let raster = Array2::from_shape_fn((5, 7), |(r, c)| ((r + c) % 2) as u16);
//!
//! let partition = TilePartitioner::new(4).unwrap().partition(raster.view()).unwrap();
//! let shape = partition.shape();
//!
//! // Use each tile as its own "segmentation" mask
//! let tiles: Vec<_> = partition.map(|t| t.data).collect();
//! let views: Vec<_> = tiles.iter().map(|t| t.view()).collect();
//! let masks: Array3<u16> = ndarray::stack(Axis(0), &views).unwrap();
//!
//! let stitched = MaskStitcher::new(shape, 4).unwrap().stitch(masks.view()).unwrap();
//! let cropped = stitched.crop(5, 7);
//! assert_eq!(cropped.pixels(), raster.mapv(|v| v as u8));
//! ```
//!
//! # Coordinates
//!
//! Rasters are indexed `[row, col]`. Axis 0 (`height`) is cut into grid
//! rows and axis 1 (`width`) into grid columns. A [`TileBounds`] displays
//! as `x1,x2,y1,y2` where `x` is the axis-0 range.

pub mod error;
pub mod grid;
pub mod partition;
pub mod source;
pub mod stitch;

#[cfg(test)]
mod domain_tests;

pub use error::GridError;
pub use grid::{step_offsets, GridIndexer, GridPosition, GridShape, DEFAULT_TILE_SIZE};
pub use partition::{Partition, Tile, TileBounds, TilePartitioner};
pub use source::{into_plane, InMemoryMosaic, MosaicSource};
pub use stitch::{binarize, MaskStitcher, StitchedMask, FOREGROUND};
