//! Scratch workspace wrapping the tiler and stitcher.

use std::path::{Path, PathBuf};

use mosaic_tiler::error::TilerError;
use mosaic_tiler::services::{GridMetadataStore, StitchService, TileReport, Tiler};
use tempfile::TempDir;

/// A temporary directory with `input/`, `tiles/` and `final_data/`
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        for sub in ["input", "tiles", "final_data"] {
            std::fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn input(&self, name: &str) -> PathBuf {
        self.root().join("input").join(name)
    }

    pub fn tiles_dir(&self) -> PathBuf {
        self.root().join("tiles")
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.root().join("final_data")
    }

    pub fn source_dir(&self, source_id: &str) -> PathBuf {
        self.tiles_dir().join(format!("{source_id}_dir"))
    }

    pub fn tile_path(&self, source_id: &str, fov: usize, channel: &str) -> PathBuf {
        self.source_dir(source_id)
            .join(format!("fov{fov}"))
            .join(format!("{channel}.tiff"))
    }

    /// Tile one mosaic file with a fresh metadata store
    pub fn tile(
        &self,
        file: &Path,
        tile_size: usize,
        channels: Vec<String>,
    ) -> Result<TileReport, TilerError> {
        let tiler = Tiler::new(tile_size, self.tiles_dir(), channels)?;
        let mut store = GridMetadataStore::new(self.metadata_dir());
        tiler.tile_file(file, &mut store)
    }

    pub fn stitcher(&self) -> StitchService {
        StitchService::new(self.metadata_dir())
    }
}
