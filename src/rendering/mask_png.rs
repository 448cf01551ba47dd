use std::io::Cursor;

use mosaic_grid::StitchedMask;

use crate::error::TilerError;

/// PNG encoding of stitched masks for overlay viewers.
///
/// Output is 8-bit RGBA with RGB and alpha both set to the mask's gray
/// value, so background is fully transparent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskPngEncoder {
    optimize: bool,
}

impl MaskPngEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompress with oxipng after encoding.
    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = optimize;
        self
    }

    pub fn encode(&self, mask: &StitchedMask) -> Result<Vec<u8>, TilerError> {
        let width = u32::try_from(mask.width())
            .map_err(|_| TilerError::PngEncode(format!("width {} too large", mask.width())))?;
        let height = u32::try_from(mask.height())
            .map_err(|_| TilerError::PngEncode(format!("height {} too large", mask.height())))?;

        let png_bytes = encode_png(width, height, &mask.to_rgba_bytes())?;
        if !self.optimize {
            return Ok(png_bytes);
        }

        let before = png_bytes.len();
        let optimized = oxipng::optimize_from_memory(
            &png_bytes,
            &oxipng::Options {
                strip: oxipng::StripChunks::Safe,
                optimize_alpha: false,
                ..Default::default()
            },
        )
        .unwrap_or_else(|e| {
            tracing::warn!(%e, "PNG optimization failed, keeping unoptimized output");
            png_bytes
        });
        tracing::debug!(before, after = optimized.len(), "Optimized PNG");
        Ok(optimized)
    }
}

fn encode_png(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>, TilerError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| TilerError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(rgba)
            .map_err(|e| TilerError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}
