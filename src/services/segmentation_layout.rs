//! Re-layout of a tiled source directory for the segmentation tool.
//!
//! ```text
//! <source>_dir/
//!   deepcell_output/
//!   input_data/
//!     deepcell_input/
//!     mibitiff_inputs/
//!     single_channel_inputs/
//!       fov0/TIFs/<channel>.tiff
//! ```
//!
//! The conversion happens in place.

use std::path::{Path, PathBuf};

use crate::error::TilerError;
use crate::services::tile_store::parse_fov_dir;

pub const OUTPUT_DIR: &str = "deepcell_output";
pub const INPUT_DIR: &str = "input_data";
pub const SINGLE_CHANNEL_DIR: &str = "single_channel_inputs";
pub const MIBITIFF_DIR: &str = "mibitiff_inputs";
pub const DEEPCELL_INPUT_DIR: &str = "deepcell_input";
pub const TIFS_DIR: &str = "TIFs";

/// What [`format_directory`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutReport {
    /// Final location of the directory
    pub dir: PathBuf,
    pub fovs: usize,
    pub files_moved: usize,
    /// Whether the directory was moved into the target
    pub relocated: bool,
}

fn create_dir(path: &Path) -> Result<(), TilerError> {
    if path.is_dir() {
        let non_empty = std::fs::read_dir(path)
            .map_err(TilerError::io(path))?
            .next()
            .is_some();
        if non_empty {
            tracing::warn!(dir = %path.display(), "Directory exists and is not empty");
        }
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(TilerError::io(path))
}

fn fov_dirs(dir: &Path) -> Result<Vec<(usize, PathBuf)>, TilerError> {
    let mut fovs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(TilerError::io(dir))? {
        let path = entry.map_err(TilerError::io(dir))?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(fov) = path.file_name().and_then(|n| n.to_str()).and_then(parse_fov_dir) {
            fovs.push((fov, path));
        }
    }
    fovs.sort_by_key(|(fov, _)| *fov);
    Ok(fovs)
}

fn is_tiff(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".tif") || n.ends_with(".tiff"))
}

/// Convert one tiled directory in place and optionally move it into `target`.
///
/// A target that does not exist is reported and the directory stays where
/// it is.
pub fn format_directory(dir: &Path, target: Option<&Path>) -> Result<LayoutReport, TilerError> {
    if !dir.is_dir() {
        return Err(TilerError::io(dir)(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "not a directory",
        )));
    }

    let fovs = fov_dirs(dir)?;

    let input_dir = dir.join(INPUT_DIR);
    let single_channel = input_dir.join(SINGLE_CHANNEL_DIR);
    for path in [
        dir.join(OUTPUT_DIR),
        input_dir.clone(),
        single_channel.clone(),
        input_dir.join(MIBITIFF_DIR),
        input_dir.join(DEEPCELL_INPUT_DIR),
    ] {
        create_dir(&path)?;
        tracing::debug!(dir = %path.display(), "Created directory");
    }

    let mut files_moved = 0;
    for (_, fov_dir) in &fovs {
        let Some(name) = fov_dir.file_name() else {
            continue;
        };
        tracing::info!(dir = %fov_dir.display(), "Rearranging fov directory");

        let tifs = single_channel.join(name).join(TIFS_DIR);
        create_dir(&tifs)?;

        for entry in std::fs::read_dir(fov_dir).map_err(TilerError::io(fov_dir))? {
            let file = entry.map_err(TilerError::io(fov_dir))?.path();
            if !is_tiff(&file) {
                continue;
            }
            let Some(file_name) = file.file_name() else {
                continue;
            };
            let destination = tifs.join(file_name);
            tracing::debug!(from = %file.display(), to = %destination.display(), "Moving tile");
            std::fs::rename(&file, &destination).map_err(TilerError::io(&file))?;
            files_moved += 1;
        }

        // fails when something other than TIFFs was left behind
        std::fs::remove_dir(fov_dir).map_err(TilerError::io(fov_dir))?;
    }

    let mut report = LayoutReport {
        dir: dir.to_path_buf(),
        fovs: fovs.len(),
        files_moved,
        relocated: false,
    };

    if let Some(target) = target {
        if target.is_dir() {
            let Some(name) = dir.file_name() else {
                return Ok(report);
            };
            let destination = target.join(name);
            std::fs::rename(dir, &destination).map_err(TilerError::io(dir))?;
            tracing::info!(from = %dir.display(), to = %destination.display(), "Moved directory");
            report.dir = destination;
            report.relocated = true;
        } else {
            tracing::warn!(
                target = %target.display(),
                dir = %dir.display(),
                "Target is not a directory, leaving output in place"
            );
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tiled_dir(root: &Path, fovs: usize) -> PathBuf {
        let dir = root.join("slide_dir");
        for fov in 0..fovs {
            let fov_dir = dir.join(format!("fov{fov}"));
            std::fs::create_dir_all(&fov_dir).unwrap();
            std::fs::write(fov_dir.join("DAPI.tiff"), b"t").unwrap();
            std::fs::write(fov_dir.join("CD8.tif"), b"t").unwrap();
        }
        std::fs::write(dir.join("tile_metadata.txt"), "fov,x1,x2,y1,y2\n").unwrap();
        dir
    }

    #[test]
    fn test_moves_tiffs_into_tifs_dirs() {
        let root = TempDir::new().unwrap();
        let dir = tiled_dir(root.path(), 2);

        let report = format_directory(&dir, None).unwrap();

        assert_eq!(report.fovs, 2);
        assert_eq!(report.files_moved, 4);
        assert!(!report.relocated);
        assert!(dir.join("deepcell_output").is_dir());
        assert!(dir.join("input_data/mibitiff_inputs").is_dir());
        assert!(dir.join("input_data/deepcell_input").is_dir());
        assert!(dir
            .join("input_data/single_channel_inputs/fov1/TIFs/CD8.tif")
            .is_file());
        assert!(!dir.join("fov0").exists());
        assert!(dir.join("tile_metadata.txt").is_file());
    }

    #[test]
    fn test_relocates_into_existing_target() {
        let root = TempDir::new().unwrap();
        let dir = tiled_dir(root.path(), 1);
        let target = root.path().join("data");
        std::fs::create_dir(&target).unwrap();

        let report = format_directory(&dir, Some(&target)).unwrap();

        assert!(report.relocated);
        assert_eq!(report.dir, target.join("slide_dir"));
        assert!(target
            .join("slide_dir/input_data/single_channel_inputs/fov0/TIFs/DAPI.tiff")
            .is_file());
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_target_leaves_directory() {
        let root = TempDir::new().unwrap();
        let dir = tiled_dir(root.path(), 1);

        let report = format_directory(&dir, Some(&root.path().join("nope"))).unwrap();
        assert!(!report.relocated);
        assert!(dir.join("input_data").is_dir());
    }

    #[test]
    fn test_is_idempotent_on_formatted_directory() {
        let root = TempDir::new().unwrap();
        let dir = tiled_dir(root.path(), 1);
        format_directory(&dir, None).unwrap();

        let again = format_directory(&dir, None).unwrap();
        assert_eq!(again.fovs, 0);
        assert_eq!(again.files_moved, 0);
    }

    #[test]
    fn test_foreign_files_keep_fov_dir() {
        let root = TempDir::new().unwrap();
        let dir = tiled_dir(root.path(), 1);
        std::fs::write(dir.join("fov0/notes.txt"), "keep").unwrap();

        let err = format_directory(&dir, None).unwrap_err();
        assert!(matches!(err, TilerError::Io { .. }));
        assert!(dir.join("fov0/notes.txt").is_file());
    }
}
