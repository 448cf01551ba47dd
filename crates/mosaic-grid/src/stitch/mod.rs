//! Reassembly of per-tile masks into one full-resolution mask.

mod mask;
mod stitcher;

pub use mask::{StitchedMask, FOREGROUND};
pub use stitcher::{binarize, MaskStitcher};
