use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use mosaic_grid::{GridShape, TileBounds};
use ndarray::Array2;
use regex::Regex;
use tiff::decoder::Decoder;
use tiff::encoder::{colortype, TiffEncoder};

use crate::error::TilerError;

/// Name of the per-source bounds file
pub const BOUNDS_FILE_NAME: &str = "tile_metadata.txt";

/// Header line of the bounds file
pub const BOUNDS_HEADER: &str = "fov,x1,x2,y1,y2";

fn fov_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^fov(\d+)$").expect("static pattern"))
}

/// Directory name of a tile: `fov<N>`.
pub fn fov_dir_name(fov: usize) -> String {
    format!("fov{fov}")
}

/// Parse a `fov<N>` directory name.
pub fn parse_fov_dir(name: &str) -> Option<usize> {
    fov_pattern()
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// On-disk layout of one source's tiles:
/// `<output_dir>/<source_id>_dir/fov<N>/<channel>.tiff`.
#[derive(Debug, Clone)]
pub struct TileStore {
    source_dir: PathBuf,
}

impl TileStore {
    pub fn new(output_dir: impl AsRef<Path>, source_id: &str) -> Self {
        Self {
            source_dir: output_dir.as_ref().join(format!("{source_id}_dir")),
        }
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn bounds_path(&self) -> PathBuf {
        self.source_dir.join(BOUNDS_FILE_NAME)
    }

    pub fn fov_dir(&self, fov: usize) -> PathBuf {
        self.source_dir.join(fov_dir_name(fov))
    }

    pub fn tile_path(&self, fov: usize, channel: &str) -> PathBuf {
        self.fov_dir(fov).join(format!("{channel}.tiff"))
    }

    /// Create the source directory. Returns `true` when it already existed.
    pub fn prepare(&self) -> Result<bool, TilerError> {
        let existed = self.source_dir.is_dir();
        if existed {
            tracing::warn!(
                dir = %self.source_dir.display(),
                "Output directory exists, adding tiles to it"
            );
        } else {
            std::fs::create_dir_all(&self.source_dir).map_err(TilerError::io(&self.source_dir))?;
        }
        Ok(existed)
    }

    /// Fov indices of the `fov<N>` directories already present, sorted.
    pub fn existing_fovs(&self) -> Result<Vec<usize>, TilerError> {
        if !self.source_dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.source_dir).map_err(TilerError::io(&self.source_dir))?;

        let mut fovs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(TilerError::io(&self.source_dir))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(fov) = entry.file_name().to_str().and_then(parse_fov_dir) {
                fovs.push(fov);
            }
        }
        fovs.sort_unstable();
        Ok(fovs)
    }

    /// Refuse to add tiles to a directory left by a run with another grid.
    ///
    /// Existing `fov<N>` directories must lie inside `shape` and their
    /// tiles must be `tile_size` square.
    pub fn ensure_compatible(&self, shape: GridShape, tile_size: usize) -> Result<(), TilerError> {
        for fov in self.existing_fovs()? {
            if fov >= shape.len() {
                return Err(TilerError::IncompatibleOutput {
                    dir: self.source_dir.clone(),
                    reason: format!(
                        "{} lies outside the {} grid",
                        fov_dir_name(fov),
                        shape
                    ),
                });
            }

            if let Some(tile) = first_tiff(&self.fov_dir(fov))? {
                let (width, height) = tile_dimensions(&tile)?;
                if width != tile_size || height != tile_size {
                    return Err(TilerError::IncompatibleOutput {
                        dir: self.source_dir.clone(),
                        reason: format!(
                            "{} is {width}x{height}, expected {tile_size}x{tile_size}",
                            tile.display()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Write one tile as a 16-bit grayscale TIFF.
    pub fn write_tile(
        &self,
        fov: usize,
        channel: &str,
        data: &Array2<u16>,
    ) -> Result<PathBuf, TilerError> {
        let dir = self.fov_dir(fov);
        std::fs::create_dir_all(&dir).map_err(TilerError::io(&dir))?;

        let path = self.tile_path(fov, channel);
        let file = File::create(&path).map_err(TilerError::io(&path))?;
        let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(TilerError::tiff(&path))?;

        let (height, width) = data.dim();
        let samples: Cow<[u16]> = match data.as_slice() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(data.iter().copied().collect()),
        };
        encoder
            .write_image::<colortype::Gray16>(width as u32, height as u32, &samples)
            .map_err(TilerError::tiff(&path))?;

        Ok(path)
    }

    /// Start a fresh bounds file, truncating any previous one.
    pub fn bounds_writer(&self) -> Result<BoundsWriter, TilerError> {
        let path = self.bounds_path();
        let file = File::create(&path).map_err(TilerError::io(&path))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{BOUNDS_HEADER}").map_err(TilerError::io(&path))?;
        Ok(BoundsWriter { writer, path })
    }
}

/// Appends `fov<N>,x1,x2,y1,y2` rows to the bounds file.
pub struct BoundsWriter {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl BoundsWriter {
    pub fn record(&mut self, fov: usize, bounds: &TileBounds) -> Result<(), TilerError> {
        writeln!(self.writer, "{},{}", fov_dir_name(fov), bounds).map_err(TilerError::io(&self.path))
    }

    pub fn finish(mut self) -> Result<(), TilerError> {
        self.writer.flush().map_err(TilerError::io(&self.path))
    }
}

fn is_tiff(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tif") | Some("tiff")
    )
}

fn first_tiff(dir: &Path) -> Result<Option<PathBuf>, TilerError> {
    let entries = std::fs::read_dir(dir).map_err(TilerError::io(dir))?;
    for entry in entries {
        let path = entry.map_err(TilerError::io(dir))?.path();
        if path.is_file() && is_tiff(&path) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn tile_dimensions(path: &Path) -> Result<(usize, usize), TilerError> {
    let file = File::open(path).map_err(TilerError::io(path))?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(TilerError::tiff(path))?;
    let (width, height) = decoder.dimensions().map_err(TilerError::tiff(path))?;
    Ok((width as usize, height as usize))
}
