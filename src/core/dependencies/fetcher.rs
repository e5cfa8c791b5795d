use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::core::error::{DeployError, DeployResult};
use crate::core::fsops::{clean_path, copy_dir_recursive, ensure_path};
use crate::core::metadata::DependencyDescriptor;
use crate::core::state::DeployConfig;

/// Fetches one dependency and places it into the build directory.
#[async_trait]
pub trait DependencyFetcher: Send + Sync {
    async fn fetch(
        &self,
        name: &str,
        descriptor: &DependencyDescriptor,
        temp_path: &Path,
        build_path: &Path,
        config: &DeployConfig,
    ) -> DeployResult<()>;
}

/// What [`HttpDependencyFetcher`] reads from a descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSource {
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    /// Sub-tree of the archive merged into the build directory.
    /// Defaults to the archive root.
    #[serde(default)]
    pub path: Option<String>,
}

/// Downloads a zip, checks it and merges (part of) it into the build tree.
pub struct HttpDependencyFetcher {
    client: Client,
}

impl HttpDependencyFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Download `url` to `dest`, optionally validating SHA-1.
    ///
    /// The file handle is dropped before returning, on every path.
    async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> DeployResult<()> {
        if let Some(parent) = dest.parent() {
            ensure_path(parent)?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeployError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        if let Some(expected) = sha1_expected {
            let mut hasher = Sha1::new();
            hasher.update(&bytes);
            let actual = hex::encode(hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(DeployError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| DeployError::io(dest, e))?;
            file.write_all(&bytes)
                .await
                .map_err(|e| DeployError::io(dest, e))?;
            file.flush().await.map_err(|e| DeployError::io(dest, e))?;
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}

#[async_trait]
impl DependencyFetcher for HttpDependencyFetcher {
    async fn fetch(
        &self,
        name: &str,
        descriptor: &DependencyDescriptor,
        temp_path: &Path,
        build_path: &Path,
        _config: &DeployConfig,
    ) -> DeployResult<()> {
        let source: ArchiveSource = descriptor.parse()?;
        info!("Fetching dependency {} from {}", name, source.url);

        let archive_path = temp_path.join(format!("{name}.zip"));
        self.download_file(&source.url, &archive_path, source.sha1.as_deref())
            .await?;

        let unpacked = temp_path.join(name);
        extract_zip_file(&archive_path, &unpacked)?;

        let selected = match source.path.as_deref() {
            Some(sub) => unpacked.join(relative_path(sub)?),
            None => unpacked,
        };
        if !selected.is_dir() {
            return Err(DeployError::Other(format!(
                "Dependency {name}: {selected:?} is not a directory in the downloaded archive"
            )));
        }

        copy_dir_recursive(&selected, build_path)?;
        info!("Installed dependency {} into {:?}", name, build_path);
        Ok(())
    }
}

/// Reject absolute paths and `..` in a descriptor-supplied sub-path.
fn relative_path(raw: &str) -> DeployResult<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return Err(DeployError::Other(format!("Invalid archive path {raw:?}"))),
        }
    }
    Ok(out)
}

/// Unpack `zip_path` into a fresh `dest`.
pub fn extract_zip_file(zip_path: &Path, dest: &Path) -> DeployResult<()> {
    let zip_file = std::fs::File::open(zip_path).map_err(|e| DeployError::io(zip_path, e))?;
    let mut archive = zip::ZipArchive::new(zip_file)?;

    clean_path(dest)?;

    for index in 0..archive.len() {
        let mut zipped = archive.by_index(index)?;
        let enclosed_name = zipped
            .enclosed_name()
            .ok_or_else(|| DeployError::Other("Invalid zip entry path".into()))?;

        let out_path = dest.join(enclosed_name);
        if zipped.is_dir() {
            ensure_path(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            ensure_path(parent)?;
        }

        let mut out =
            std::fs::File::create(&out_path).map_err(|e| DeployError::io(&out_path, e))?;
        std::io::copy(&mut zipped, &mut out).map_err(|e| DeployError::io(&out_path, e))?;
    }

    Ok(())
}
