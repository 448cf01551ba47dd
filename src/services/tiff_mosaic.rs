use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use mosaic_grid::MosaicSource;
use ndarray::{Array2, ArrayD};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::ColorType;

use crate::error::TilerError;

/// Multi-page TIFF mosaic, one page per channel.
///
/// Pages are decoded on demand. Reading a channel reopens the file and walks
/// to the requested page, so only one plane is held in memory at a time.
pub struct TiffMosaic {
    path: PathBuf,
    pages: Option<Vec<(usize, usize)>>,
}

impl TiffMosaic {
    /// Open a mosaic file. Fails if the file is missing or not a TIFF.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TilerError> {
        let path = path.as_ref().to_path_buf();
        // probe the header so a bad file fails before any output is written
        Self::decoder(&path)?;
        Ok(Self { path, pages: None })
    }

    fn decoder(path: &Path) -> Result<Decoder<BufReader<File>>, TilerError> {
        let file = File::open(path).map_err(TilerError::io(path))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(TilerError::tiff(path))?;
        Ok(decoder.with_limits(Limits::unlimited()))
    }

    /// `(height, width)` of every page, read from the page headers only.
    fn page_extents(&mut self) -> Result<&[(usize, usize)], TilerError> {
        if self.pages.is_none() {
            let mut decoder = Self::decoder(&self.path)?;
            let mut pages = Vec::new();
            loop {
                let (width, height) = decoder.dimensions().map_err(TilerError::tiff(&self.path))?;
                pages.push((height as usize, width as usize));
                if !decoder.more_images() {
                    break;
                }
                decoder.next_image().map_err(TilerError::tiff(&self.path))?;
            }
            self.pages = Some(pages);
        }
        Ok(self.pages.as_deref().unwrap_or_default())
    }

    fn unsupported(&self, format: impl Into<String>) -> TilerError {
        TilerError::UnsupportedSampleFormat {
            path: self.path.clone(),
            format: format.into(),
        }
    }
}

impl MosaicSource for TiffMosaic {
    type Error = TilerError;

    fn channel_count(&mut self) -> Result<usize, TilerError> {
        Ok(self.page_extents()?.len())
    }

    fn channel_extent(&mut self, index: usize) -> Result<(usize, usize), TilerError> {
        let pages = self.page_extents()?;
        pages.get(index).copied().ok_or_else(|| {
            mosaic_grid::GridError::ChannelOutOfRange {
                index,
                count: pages.len(),
            }
            .into()
        })
    }

    fn read_channel(&mut self, index: usize) -> Result<ArrayD<u16>, TilerError> {
        self.channel_extent(index)?;

        let mut decoder = Self::decoder(&self.path)?;
        for _ in 0..index {
            decoder.next_image().map_err(TilerError::tiff(&self.path))?;
        }

        match decoder.colortype().map_err(TilerError::tiff(&self.path))? {
            ColorType::Gray(8) | ColorType::Gray(16) => {}
            other => return Err(self.unsupported(format!("page {index}: {other:?}"))),
        }

        let (width, height) = decoder.dimensions().map_err(TilerError::tiff(&self.path))?;
        let shape = (height as usize, width as usize);

        let samples: Vec<u16> = match decoder.read_image().map_err(TilerError::tiff(&self.path))? {
            DecodingResult::U16(buf) => buf,
            DecodingResult::U8(buf) => buf.into_iter().map(u16::from).collect(),
            _ => return Err(self.unsupported(format!("page {index}: non-integer samples"))),
        };

        tracing::debug!(
            path = %self.path.display(),
            page = index,
            height = shape.0,
            width = shape.1,
            "Decoded channel"
        );

        let plane = Array2::from_shape_vec(shape, samples).map_err(|e| {
            self.unsupported(format!("page {index}: sample count does not match {shape:?}: {e}"))
        })?;
        Ok(plane.into_dyn())
    }
}
