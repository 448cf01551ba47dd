//! The seam to mosaic decoders.
//!
//! A decoder only has to report how many channels a mosaic has and hand
//! back one channel at a time as a raster. Decoders may return either a
//! plain `(H, W)` array or a `(1, H, W)` stack; [`into_plane`] normalizes
//! both.

use ndarray::{Array2, ArrayD, Axis, Ix2};

use crate::error::GridError;

/// A decoded multi-channel mosaic image.
pub trait MosaicSource {
    /// Error produced by the decoder.
    type Error;

    /// Number of imaging channels in the mosaic.
    fn channel_count(&mut self) -> Result<usize, Self::Error>;

    /// `(height, width)` of one channel, without decoding its samples.
    fn channel_extent(&mut self, index: usize) -> Result<(usize, usize), Self::Error>;

    /// Decode one channel, shaped `(H, W)` or `(1, H, W)`.
    fn read_channel(&mut self, index: usize) -> Result<ArrayD<u16>, Self::Error>;
}

/// Reduce a decoded channel to a 2D raster.
pub fn into_plane<T>(raster: ArrayD<T>) -> Result<Array2<T>, GridError> {
    let shape = raster.shape().to_vec();
    let raster = match shape.as_slice() {
        [_, _] => raster,
        [1, _, _] => raster.index_axis_move(Axis(0), 0),
        _ => {
            return Err(GridError::UnsupportedRasterShape {
                shape: shape.clone(),
            })
        }
    };
    raster
        .into_dimensionality::<Ix2>()
        .map_err(|_| GridError::UnsupportedRasterShape { shape })
}

/// A mosaic held in memory, one raster per channel.
///
/// Useful for embedding and for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMosaic {
    channels: Vec<Array2<u16>>,
}

impl InMemoryMosaic {
    pub fn new(channels: Vec<Array2<u16>>) -> Self {
        Self { channels }
    }

    fn channel(&self, index: usize) -> Result<&Array2<u16>, GridError> {
        self.channels.get(index).ok_or(GridError::ChannelOutOfRange {
            index,
            count: self.channels.len(),
        })
    }
}

impl MosaicSource for InMemoryMosaic {
    type Error = GridError;

    fn channel_count(&mut self) -> Result<usize, Self::Error> {
        Ok(self.channels.len())
    }

    fn channel_extent(&mut self, index: usize) -> Result<(usize, usize), Self::Error> {
        self.channel(index).map(|c| c.dim())
    }

    fn read_channel(&mut self, index: usize) -> Result<ArrayD<u16>, Self::Error> {
        self.channel(index).map(|c| c.clone().into_dyn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, IxDyn};

    #[test]
    fn test_into_plane_accepts_2d() {
        let raster = ArrayD::<u16>::zeros(IxDyn(&[3, 5]));
        assert_eq!(into_plane(raster).unwrap().dim(), (3, 5));
    }

    #[test]
    fn test_into_plane_squeezes_leading_axis() {
        let mut stack = Array3::<u16>::zeros((1, 7290, 4));
        stack[[0, 7289, 3]] = 9;
        let plane = into_plane(stack.into_dyn()).unwrap();
        assert_eq!(plane.dim(), (7290, 4));
        assert_eq!(plane[[7289, 3]], 9);
    }

    #[test]
    fn test_into_plane_rejects_multi_plane_stack() {
        let raster = ArrayD::<u16>::zeros(IxDyn(&[2, 3, 3]));
        assert_eq!(
            into_plane(raster),
            Err(GridError::UnsupportedRasterShape {
                shape: vec![2, 3, 3]
            })
        );
    }

    #[test]
    fn test_in_memory_mosaic() {
        let mut mosaic = InMemoryMosaic::new(vec![Array2::zeros((2, 2)), Array2::ones((2, 2))]);
        assert_eq!(mosaic.channel_count().unwrap(), 2);
        assert_eq!(mosaic.channel_extent(0).unwrap(), (2, 2));
        let second = into_plane(mosaic.read_channel(1).unwrap()).unwrap();
        assert_eq!(second[[1, 1]], 1);
        assert_eq!(
            mosaic.read_channel(2).unwrap_err(),
            GridError::ChannelOutOfRange { index: 2, count: 2 }
        );
    }
}
