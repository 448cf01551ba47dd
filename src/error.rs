use std::path::{Path, PathBuf};

use mosaic_grid::GridError;
use thiserror::Error;

/// Errors from tiling, metadata persistence and stitching.
///
/// Every error is terminal for the file or source being processed. The
/// variants carry the source id, path or shape needed to diagnose the
/// failure without rerunning.
#[derive(Debug, Error)]
pub enum TilerError {
    #[error("{source_id}: mosaic has {actual} channels but {expected} channel names were given")]
    ChannelCountMismatch {
        source_id: String,
        expected: usize,
        actual: usize,
    },

    #[error("{source_id}: channel {channel} is {actual:?} but the first channel is {expected:?}")]
    ChannelShapeMismatch {
        source_id: String,
        channel: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(
        "No grid metadata for '{source_id}' (expected {}). Was the mosaic tiled with this metadata directory?",
        .path.display()
    )]
    MetadataNotFound { source_id: String, path: PathBuf },

    #[error(
        "Grid metadata for '{source_id}' already records {existing}, refusing to record {requested}"
    )]
    MetadataConflict {
        source_id: String,
        existing: String,
        requested: String,
    },

    #[error("Existing output in {} is incompatible: {reason}", .dir.display())]
    IncompatibleOutput { dir: PathBuf, reason: String },

    #[error("Cannot derive a source id from {}", .path.display())]
    InvalidSourceName { path: PathBuf },

    #[error("Unknown channel panel '{0}'")]
    UnknownPanel(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported sample format in {}: {format}", .path.display())]
    UnsupportedSampleFormat { path: PathBuf, format: String },

    #[error("Invalid mask file {}: {reason}", .path.display())]
    InvalidMaskFile { path: PathBuf, reason: String },

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("TIFF error in {}: {source}", .path.display())]
    Tiff {
        path: PathBuf,
        source: tiff::TiffError,
    },

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl TilerError {
    /// Adapter for `map_err` that attaches the path being accessed.
    pub fn io(path: impl AsRef<Path>) -> impl FnOnce(std::io::Error) -> TilerError {
        let path = path.as_ref().to_path_buf();
        move |source| TilerError::Io { path, source }
    }

    /// Adapter for `map_err` on TIFF decoder/encoder calls.
    pub fn tiff(path: impl AsRef<Path>) -> impl FnOnce(tiff::TiffError) -> TilerError {
        let path = path.as_ref().to_path_buf();
        move |source| TilerError::Tiff { path, source }
    }

    /// Adapter for `map_err` on JSON (de)serialization.
    pub fn json(path: impl AsRef<Path>) -> impl FnOnce(serde_json::Error) -> TilerError {
        let path = path.as_ref().to_path_buf();
        move |source| TilerError::Json { path, source }
    }

    /// Whether the error is a failed precondition (nothing was written).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TilerError::ChannelCountMismatch { .. }
                | TilerError::ChannelShapeMismatch { .. }
                | TilerError::MetadataNotFound { .. }
                | TilerError::MetadataConflict { .. }
                | TilerError::IncompatibleOutput { .. }
                | TilerError::InvalidSourceName { .. }
                | TilerError::UnknownPanel(_)
        )
    }
}
