//! Raster partitioning into fixed-size, zero-padded tiles.

mod partitioner;
mod tile;

pub use partitioner::{Partition, TilePartitioner};
pub use tile::{Tile, TileBounds};
