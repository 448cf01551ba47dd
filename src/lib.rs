//! mosaic-tiler - tile multiplexed mosaics for cell segmentation
//!
//! Cuts every channel of a large multi-channel mosaic into a grid of
//! fixed-size tiles laid out for the segmentation tool, records the grid,
//! and later stitches the per-tile segmentation masks back into one
//! transparent overlay image. The geometry lives in `mosaic-grid`; this
//! crate adds storage, configuration and the command line.

pub mod assets;
pub mod error;
pub mod models;
pub mod rendering;
pub mod services;
