use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::TilerError;
use crate::models::GridMetadata;

/// Result of [`GridMetadataStore::put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// A new record was written
    Written,
    /// An identical record already existed on disk
    Unchanged,
    /// A record with the same grid existed; its filename or extent was refreshed
    Updated,
    /// This store already recorded the source during this run
    AlreadyRecorded,
}

/// Grid records keyed by source id, one hidden JSON file per source:
/// `<metadata_dir>/.<source_id>_metadata.json`.
///
/// The tiler and the stitcher run as separate processes; this file is the
/// only thing they share.
#[derive(Debug)]
pub struct GridMetadataStore {
    dir: PathBuf,
    recorded: HashSet<String>,
}

impl GridMetadataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            recorded: HashSet::new(),
        }
    }

    pub fn path_for(&self, source_id: &str) -> PathBuf {
        self.dir.join(format!(".{source_id}_metadata.json"))
    }

    /// Record the grid of a source once.
    ///
    /// An existing file describing a different grid is a conflict: tiles on
    /// disk would no longer match what the stitcher reconstructs.
    pub fn put(&mut self, source_id: &str, metadata: &GridMetadata) -> Result<PutOutcome, TilerError> {
        if self.recorded.contains(source_id) {
            return Ok(PutOutcome::AlreadyRecorded);
        }

        let path = self.path_for(source_id);
        let outcome = if let Some(existing) = self.check(source_id, metadata)? {
            if existing == *metadata {
                PutOutcome::Unchanged
            } else {
                self.write(&path, metadata)?;
                PutOutcome::Updated
            }
        } else {
            std::fs::create_dir_all(&self.dir).map_err(TilerError::io(&self.dir))?;
            self.write(&path, metadata)?;
            PutOutcome::Written
        };

        tracing::info!(
            source_id,
            path = %path.display(),
            rows = metadata.dims.rows,
            cols = metadata.dims.cols,
            ?outcome,
            "Recorded grid metadata"
        );
        self.recorded.insert(source_id.to_string());
        Ok(outcome)
    }

    /// Fail with `MetadataConflict` if a record for `source_id` describes a
    /// different grid. Returns the existing record, if any.
    pub fn check(
        &self,
        source_id: &str,
        metadata: &GridMetadata,
    ) -> Result<Option<GridMetadata>, TilerError> {
        if !self.path_for(source_id).exists() {
            return Ok(None);
        }
        let existing = self.get(source_id)?;
        if !existing.same_grid(metadata) {
            return Err(TilerError::MetadataConflict {
                source_id: source_id.to_string(),
                existing: existing.to_string(),
                requested: metadata.to_string(),
            });
        }
        Ok(Some(existing))
    }

    /// Load the grid record of a source.
    pub fn get(&self, source_id: &str) -> Result<GridMetadata, TilerError> {
        let path = self.path_for(source_id);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TilerError::MetadataNotFound {
                    source_id: source_id.to_string(),
                    path,
                })
            }
            Err(e) => return Err(TilerError::io(&path)(e)),
        };
        serde_json::from_str(&content).map_err(TilerError::json(&path))
    }

    fn write(&self, path: &Path, metadata: &GridMetadata) -> Result<(), TilerError> {
        let json = serde_json::to_string(metadata).map_err(TilerError::json(path))?;
        std::fs::write(path, json).map_err(TilerError::io(path))
    }
}
