use std::path::{Path, PathBuf};

use mosaic_grid::{MaskStitcher, StitchedMask};

use crate::error::TilerError;
use crate::models::{source_id_for_mask, GridMetadata};
use crate::rendering::MaskPngEncoder;
use crate::services::mask_array::read_mask_array;
use crate::services::metadata_store::GridMetadataStore;

/// Summary of one stitched mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StitchReport {
    pub source_id: String,
    pub output: PathBuf,
    pub height: usize,
    pub width: usize,
    pub foreground: usize,
    pub bytes: usize,
}

/// Reassembles per-tile segmentation masks into one overlay image.
pub struct StitchService {
    metadata: GridMetadataStore,
    crop: bool,
    encoder: MaskPngEncoder,
}

impl StitchService {
    pub fn new(metadata_dir: impl Into<PathBuf>) -> Self {
        Self {
            metadata: GridMetadataStore::new(metadata_dir),
            crop: false,
            encoder: MaskPngEncoder::new(),
        }
    }

    /// Crop the stitched mask to the recorded raster extent.
    pub fn crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    pub fn optimize(mut self, optimize: bool) -> Self {
        self.encoder = self.encoder.optimize(optimize);
        self
    }

    /// Load the mask array at `mask_path` and stitch it on the grid recorded
    /// for its source. Missing metadata is an error, never a default grid.
    pub fn stitch(&self, mask_path: &Path) -> Result<(GridMetadata, StitchedMask), TilerError> {
        let source_id = source_id_for_mask(mask_path)?;
        let metadata = self.metadata.get(&source_id)?;
        tracing::info!(
            source_id = %source_id,
            grid = %metadata.shape(),
            tile_size = metadata.tile_size,
            "Stitching mask"
        );

        let array = read_mask_array(mask_path)?;
        let stitcher = MaskStitcher::new(metadata.shape(), metadata.tile_size)?;
        let mut mask = array.data.stitch(&stitcher)?;

        if self.crop {
            match metadata.extent {
                Some(extent) => mask = mask.crop(extent.height, extent.width),
                None => tracing::warn!(
                    source_id = %source_id,
                    "No raster extent recorded, keeping padded mask"
                ),
            }
        }
        Ok((metadata, mask))
    }

    /// Stitch a mask file and write it as an RGBA PNG.
    pub fn stitch_to_png(&self, mask_path: &Path, output: &Path) -> Result<StitchReport, TilerError> {
        let (metadata, mask) = self.stitch(mask_path)?;
        let png_bytes = self.encoder.encode(&mask)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(TilerError::io(parent))?;
        }
        std::fs::write(output, &png_bytes).map_err(TilerError::io(output))?;

        let report = StitchReport {
            source_id: metadata.filename,
            output: output.to_path_buf(),
            height: mask.height(),
            width: mask.width(),
            foreground: mask.foreground_count(),
            bytes: png_bytes.len(),
        };
        tracing::info!(
            output = %output.display(),
            height = report.height,
            width = report.width,
            foreground = report.foreground,
            "Wrote stitched mask"
        );
        Ok(report)
    }
}
