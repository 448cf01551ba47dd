use mosaic_grid::{GridShape, DEFAULT_TILE_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid dimensions as recorded in the metadata file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

/// Extent of the original raster before padding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterExtent {
    pub height: usize,
    pub width: usize,
}

/// Persisted grid record for one source.
///
/// Files written by older tooling only carry `dims` and `filename`; the
/// remaining fields default on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridMetadata {
    pub dims: GridDims,
    pub filename: String,

    #[serde(default = "default_tile_size")]
    pub tile_size: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<RasterExtent>,
}

fn default_tile_size() -> usize {
    DEFAULT_TILE_SIZE
}

impl GridMetadata {
    pub fn new(
        shape: GridShape,
        filename: impl Into<String>,
        tile_size: usize,
        extent: Option<RasterExtent>,
    ) -> Self {
        Self {
            dims: GridDims {
                rows: shape.rows(),
                cols: shape.cols(),
            },
            filename: filename.into(),
            tile_size,
            extent,
        }
    }

    pub fn shape(&self) -> GridShape {
        GridShape::new(self.dims.rows, self.dims.cols)
    }

    /// Two records describe the same grid when dims and tile size agree.
    pub fn same_grid(&self, other: &GridMetadata) -> bool {
        self.dims == other.dims && self.tile_size == other.tile_size
    }
}

impl fmt::Display for GridMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tiles of {}px",
            self.shape(),
            self.tile_size
        )
    }
}
