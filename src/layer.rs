//! Loading unpacked layer directories.
//!
//! A layer is a directory holding the root filesystem of one image layer.
//! Only files some detector requires are read, keyed by their path
//! relative to the layer root.

use crate::detector::{LayerFiles, RequiredFiles};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    #[error("layer directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Reads every regular file under `root` whose relative path is required.
///
/// Directories no required pattern can reach are not descended into.
/// Symbolic links are not followed and files larger than `max_file_size`
/// bytes are skipped. Unreadable directory entries are logged and skipped;
/// only a missing root or an unreadable required file is an error.
pub fn load_layer(
    root: &Path,
    required: &RequiredFiles,
    max_file_size: u64,
) -> Result<LayerFiles, LayerError> {
    if !root.exists() {
        return Err(LayerError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(LayerError::NotADirectory(root.to_path_buf()));
    }

    let mut files = LayerFiles::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !entry.file_type().is_dir() || is_reachable(root, entry.path(), required)
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(layer = %root.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(relative) = relative_key(root, entry.path()) else {
            continue;
        };
        if !required.is_required(&relative) {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if size > max_file_size {
            warn!(
                path = %relative,
                size,
                max_file_size,
                "skipping oversized file"
            );
            continue;
        }

        let content = fs::read(entry.path()).map_err(|source| LayerError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;
        debug!(path = %relative, bytes = content.len(), "loaded required file");
        files.insert(relative, content);
    }

    Ok(files)
}

/// Whether the directory at `path` can hold a required file. The root
/// itself is always walked.
fn is_reachable(root: &Path, path: &Path, required: &RequiredFiles) -> bool {
    match relative_key(root, path) {
        Some(dir) => {
            let reachable = required.may_contain(&dir);
            if !reachable {
                trace!(dir = %dir, "pruning directory");
            }
            reachable
        }
        None => path == root,
    }
}

/// Converts `path` under `root` to a forward-slash key with no leading
/// slash. Returns `None` for the root itself or for non-UTF-8 paths.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Option<Vec<&str>> = relative.components().map(|c| c.as_os_str().to_str()).collect();
    let key = parts?.join("/");
    (!key.is_empty()).then_some(key)
}
