//! Stitched binary mask and its viewable renderings.

use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use crate::stitch::binarize;

/// Intensity of a foreground pixel in 8-bit renderings.
pub const FOREGROUND: u8 = u8::MAX;

/// A full-resolution binary mask, one `0`/`1` value per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchedMask {
    pixels: Array2<u8>,
}

impl StitchedMask {
    /// Build a mask from any 8-bit raster; non-zero values become `1`.
    pub fn new(pixels: Array2<u8>) -> Self {
        Self {
            pixels: pixels.mapv_into(binarize),
        }
    }

    /// Wrap a raster whose values are already `0` or `1`.
    pub(crate) fn from_binary(pixels: Array2<u8>) -> Self {
        Self { pixels }
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn pixels(&self) -> ArrayView2<'_, u8> {
        self.pixels.view()
    }

    pub fn foreground_count(&self) -> usize {
        self.pixels.iter().filter(|&&v| v == 1).count()
    }

    /// Drop the padding beyond `height x width` (e.g. the original raster
    /// extent). Extents larger than the mask are clamped.
    pub fn crop(&self, height: usize, width: usize) -> StitchedMask {
        let h = height.min(self.height());
        let w = width.min(self.width());
        StitchedMask {
            pixels: self.pixels.slice(s![..h, ..w]).to_owned(),
        }
    }

    /// 8-bit grayscale rendering: background 0, foreground 255.
    pub fn to_grayscale(&self) -> Array2<u8> {
        self.pixels.mapv(|v| v * FOREGROUND)
    }

    /// `H x W x 4` RGBA rendering with alpha equal to the gray value, so
    /// background pixels are fully transparent.
    pub fn to_rgba(&self) -> Array3<u8> {
        let gray = self.to_grayscale();
        let mut rgba = Array3::<u8>::zeros((self.height(), self.width(), 4));
        for mut channel in rgba.axis_iter_mut(Axis(2)) {
            channel.assign(&gray);
        }
        rgba
    }

    /// Row-major interleaved RGBA bytes, as expected by image encoders.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 4);
        for &v in self.pixels.iter() {
            let g = v * FOREGROUND;
            bytes.extend_from_slice(&[g, g, g, g]);
        }
        bytes
    }
}
