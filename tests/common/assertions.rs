//! Assertion helpers for tests.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use ndarray::Array2;
use pretty_assertions::assert_eq;
use tiff::decoder::{Decoder, DecodingResult};

/// Read a tile written by the tiler
pub fn read_tile(path: &Path) -> Array2<u16> {
    let file = File::open(path).unwrap_or_else(|e| panic!("open {}: {e}", path.display()));
    let mut decoder = Decoder::new(BufReader::new(file)).unwrap();
    let (width, height) = decoder.dimensions().unwrap();
    match decoder.read_image().unwrap() {
        DecodingResult::U16(buf) => {
            Array2::from_shape_vec((height as usize, width as usize), buf).unwrap()
        }
        other => panic!("Expected 16-bit samples in {}, got {other:?}", path.display()),
    }
}

/// Assert a tile file exists and is `tile_size` square
pub fn assert_tile(path: &Path, tile_size: usize) -> Array2<u16> {
    assert!(path.is_file(), "Missing tile {}", path.display());
    let tile = read_tile(path);
    assert_eq!(
        tile.dim(),
        (tile_size, tile_size),
        "Tile {} has wrong shape",
        path.display()
    );
    tile
}

/// Decode a PNG file, asserting it is 8-bit RGBA
pub fn read_rgba_png(path: &Path) -> (u32, u32, Vec<u8>) {
    let bytes = std::fs::read(path).unwrap();
    assert!(
        bytes.starts_with(&[0x89, b'P', b'N', b'G']),
        "Expected PNG signature in {}",
        path.display()
    );
    let decoder = png::Decoder::new(Cursor::new(bytes));
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    assert_eq!(info.color_type, png::ColorType::Rgba);
    buf.truncate(info.buffer_size());
    (info.width, info.height, buf)
}

/// Alpha channel of RGBA pixel data as a `0/1` raster
pub fn alpha_mask(width: u32, height: u32, rgba: &[u8]) -> Array2<u8> {
    let alpha: Vec<u8> = rgba.chunks_exact(4).map(|px| u8::from(px[3] > 0)).collect();
    Array2::from_shape_vec((height as usize, width as usize), alpha).unwrap()
}
