use std::fs::File;
use std::path::{Component, Path};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::{DeployError, DeployResult};
use crate::core::fsops::{ensure_path, entry_kind, EntryKind};

enum Entry {
    Dir(String),
    File { name: String, path: std::path::PathBuf },
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Write every file and directory under `source` into a new zip at
/// `archive_path`. Entry names are relative to `source` and use `/`.
///
/// Entries are written in sorted order so the same tree always produces the
/// same listing.
pub fn zip_directory(source: &Path, archive_path: &Path) -> DeployResult<()> {
    if let Some(parent) = archive_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_path(parent)?;
        }
    }

    let mut entries = Vec::new();
    collect_entries(source, source, &mut entries)?;

    let file = File::create(archive_path).map_err(|e| DeployError::io(archive_path, e))?;
    let mut writer = ZipWriter::new(file);

    for entry in entries {
        match entry {
            Entry::Dir(name) => writer.add_directory(name, entry_options())?,
            Entry::File { name, path } => {
                writer.start_file(name, entry_options())?;
                let mut input = File::open(&path).map_err(|e| DeployError::io(&path, e))?;
                std::io::copy(&mut input, &mut writer).map_err(|e| DeployError::io(&path, e))?;
            }
        }
    }

    writer.finish()?;
    debug!("Zipped {:?} -> {:?}", source, archive_path);
    Ok(())
}

fn collect_entries(root: &Path, dir: &Path, out: &mut Vec<Entry>) -> DeployResult<()> {
    let mut children = std::fs::read_dir(dir)
        .map_err(|e| DeployError::io(dir, e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DeployError::io(dir, e))?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let path = child.path();
        let name = entry_name(root, &path)?;

        match entry_kind(&path)? {
            EntryKind::Dir => {
                out.push(Entry::Dir(format!("{name}/")));
                collect_entries(root, &path, out)?;
            }
            EntryKind::File => out.push(Entry::File { name, path }),
            EntryKind::Other => {}
        }
    }

    Ok(())
}

fn entry_name(root: &Path, path: &Path) -> DeployResult<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| DeployError::Other(format!("{path:?} is outside {root:?}")))?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    Ok(parts.join("/"))
}
