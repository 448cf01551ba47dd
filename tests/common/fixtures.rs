//! Test fixtures: synthetic mosaics and mask arrays.

use std::io::Cursor;
use std::path::Path;

use mosaic_tiler::services::mask_array::npy_header;
use ndarray::Array2;
use tiff::encoder::{colortype, TiffEncoder};

/// Channel names used by the small test mosaics
pub mod channels {
    pub const PAIR: &[&str] = &["DAPI", "CD8"];
    pub const TRIPLE: &[&str] = &["DAPI", "CD8", "CD4"];
}

pub fn names(channels: &[&str]) -> Vec<String> {
    channels.iter().map(|s| s.to_string()).collect()
}

/// Deterministic raster with roughly a third of the pixels zero
pub fn speckle(height: usize, width: usize, seed: u32) -> Array2<u16> {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    Array2::from_shape_fn((height, width), |_| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        if state % 3 == 0 {
            0
        } else {
            (state % 60_000) as u16 + 1
        }
    })
}

/// Write a multi-page 16-bit grayscale TIFF, one page per channel
pub fn write_mosaic(path: &Path, channels: &[Array2<u16>]) {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = TiffEncoder::new(&mut buf).unwrap();
        for channel in channels {
            let (height, width) = channel.dim();
            let samples: Vec<u16> = channel.iter().copied().collect();
            encoder
                .write_image::<colortype::Gray16>(width as u32, height as u32, &samples)
                .unwrap();
        }
    }
    std::fs::write(path, buf.into_inner()).unwrap();
}

/// Write a `.npy` file of unsigned 8-bit masks
pub fn write_u8_masks(path: &Path, shape: &[usize], values: &[u8]) {
    let mut bytes = npy_header("|u1", shape);
    bytes.extend_from_slice(values);
    std::fs::write(path, bytes).unwrap();
}

/// Write a `.npy` file of little-endian signed 32-bit labels
pub fn write_i32_masks(path: &Path, shape: &[usize], values: &[i32]) {
    let mut bytes = npy_header("<i4", shape);
    bytes.extend(values.iter().flat_map(|v| v.to_le_bytes()));
    std::fs::write(path, bytes).unwrap();
}
