//! Mask stitcher.

use ndarray::{s, Array2, ArrayView3, Axis, Zip};

use crate::error::GridError;
use crate::grid::GridShape;
use crate::stitch::StitchedMask;

/// Normalize a mask value to `1` (foreground, any value `> 0`) or `0`.
#[inline]
pub fn binarize<T>(value: T) -> u8
where
    T: PartialOrd + Default,
{
    u8::from(value > T::default())
}

/// Reassembles `rows * cols` tile masks into one raster.
///
/// Mask `fov` is placed at the grid position the shared
/// [`GridIndexer`](crate::GridIndexer) assigns to it, which is the same
/// position the [`TilePartitioner`](crate::TilePartitioner) cut it from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskStitcher {
    shape: GridShape,
    tile_size: usize,
}

impl MaskStitcher {
    pub fn new(shape: GridShape, tile_size: usize) -> Result<Self, GridError> {
        if tile_size == 0 {
            return Err(GridError::ZeroTileSize);
        }
        Ok(Self { shape, tile_size })
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of mask values a flat buffer must hold.
    pub fn expected_len(&self) -> usize {
        self.shape.len() * self.tile_size * self.tile_size
    }

    /// Stitch a `(rows * cols, tile_size, tile_size)` stack of masks.
    pub fn stitch<T>(&self, masks: ArrayView3<'_, T>) -> Result<StitchedMask, GridError>
    where
        T: Copy + PartialOrd + Default,
    {
        let (count, height, width) = masks.dim();
        if count != self.shape.len() {
            return Err(GridError::MaskCountMismatch {
                expected: self.shape.len(),
                actual: count,
            });
        }
        if height != self.tile_size || width != self.tile_size {
            return Err(GridError::MaskTileShape {
                tile_size: self.tile_size,
                actual: (height, width),
            });
        }

        let t = self.tile_size;
        let mut pixels = Array2::<u8>::zeros((self.shape.rows() * t, self.shape.cols() * t));

        for (fov, pos) in self.shape.indexer().positions() {
            let (r0, c0) = (pos.row * t, pos.col * t);
            tracing::debug!(fov, row = pos.row, col = pos.col, "Placing mask");
            let mut target = pixels.slice_mut(s![r0..r0 + t, c0..c0 + t]);
            Zip::from(&mut target)
                .and(&masks.index_axis(Axis(0), fov))
                .for_each(|out, &value| *out = binarize(value));
        }

        Ok(StitchedMask::from_binary(pixels))
    }

    /// Stitch a flat, C-ordered buffer of masks.
    ///
    /// The buffer must hold exactly [`expected_len`](Self::expected_len)
    /// values; anything else is a reshape failure and nothing is stitched.
    pub fn stitch_flat<T>(&self, values: &[T]) -> Result<StitchedMask, GridError>
    where
        T: Copy + PartialOrd + Default,
    {
        let expected = self.expected_len();
        if values.len() != expected {
            return Err(GridError::MaskLengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        let masks = ArrayView3::from_shape(
            (self.shape.len(), self.tile_size, self.tile_size),
            values,
        )
        .map_err(|_| GridError::MaskLengthMismatch {
            expected,
            actual: values.len(),
        })?;
        self.stitch(masks)
    }
}
