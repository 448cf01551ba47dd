//! Source identifiers derived from file names.
//!
//! A mosaic `slide_7.tiff` gets the id `slide_7`. The segmentation step names
//! its outputs `<prefix>-<source_id>.npy`, so a mask's id is whatever follows
//! the last `-` of its stem.

use crate::error::TilerError;
use std::path::Path;

fn stem(path: &Path) -> Result<&str, TilerError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TilerError::InvalidSourceName {
            path: path.to_path_buf(),
        })
}

/// Id of a mosaic image: its file stem.
pub fn source_id_for_image(path: &Path) -> Result<String, TilerError> {
    stem(path).map(str::to_string)
}

/// Id of a mask file: the stem's text after the last `-`.
pub fn source_id_for_mask(path: &Path) -> Result<String, TilerError> {
    let stem = stem(path)?;
    let id = stem.rsplit('-').next().unwrap_or(stem);
    if id.is_empty() {
        return Err(TilerError::InvalidSourceName {
            path: path.to_path_buf(),
        });
    }
    Ok(id.to_string())
}
