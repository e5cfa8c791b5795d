// Filesystem helpers shared by packaging and dependency collection.

use std::path::Path;

use crate::core::error::{DeployError, DeployResult};

/// What a path points at once symlinks are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Sockets, devices and dangling links.
    Other,
}

/// Classify `path`, following symlinks.
pub fn entry_kind(path: &Path) -> DeployResult<EntryKind> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(EntryKind::Dir),
        Ok(meta) if meta.is_file() => Ok(EntryKind::File),
        Ok(_) => Ok(EntryKind::Other),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EntryKind::Other),
        Err(e) => Err(DeployError::io(path, e)),
    }
}

/// Create `path` and any missing parents.
pub fn ensure_path(path: &Path) -> DeployResult<()> {
    std::fs::create_dir_all(path).map_err(|source| DeployError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove `path` if present and recreate it empty.
pub fn clean_path(path: &Path) -> DeployResult<()> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|source| DeployError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    ensure_path(path)
}

/// Copy `source` into `destination`, merging with whatever is already there.
/// Existing files are replaced.
pub fn copy_dir_recursive(source: &Path, destination: &Path) -> DeployResult<()> {
    ensure_path(destination)?;

    let entries = std::fs::read_dir(source).map_err(|e| DeployError::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DeployError::io(source, e))?;
        let src_path = entry.path();
        let dst_path = destination.join(entry.file_name());

        match entry_kind(&src_path)? {
            EntryKind::Dir => copy_dir_recursive(&src_path, &dst_path)?,
            EntryKind::File => {
                if dst_path.exists() {
                    std::fs::remove_file(&dst_path)
                        .map_err(|e| DeployError::io(&dst_path, e))?;
                }
                std::fs::copy(&src_path, &dst_path)
                    .map_err(|e| DeployError::io(&src_path, e))?;
            }
            EntryKind::Other => {}
        }
    }

    Ok(())
}

/// Copy `source` to a destination that must not exist yet.
pub fn copy_tree_new(source: &Path, destination: &Path) -> DeployResult<()> {
    if destination.exists() {
        return Err(DeployError::DestinationExists(destination.to_path_buf()));
    }
    copy_dir_recursive(source, destination)
}

/// Names of the immediate subdirectories of `path`, sorted.
pub fn subdirectories(path: &Path) -> DeployResult<Vec<String>> {
    let mut names = Vec::new();
    let entries = std::fs::read_dir(path).map_err(|e| DeployError::io(path, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DeployError::io(path, e))?;
        if entry_kind(&entry.path())? == EntryKind::Dir {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Final component of `path` as a string, or empty.
pub fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
