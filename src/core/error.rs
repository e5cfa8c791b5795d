use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the deploy helper.
/// Every module returns `Result<T, DeployError>`.
///
/// HTTP status failures from the hosting APIs are *not* errors here: the
/// clients hand them back as [`ApiOutcome`](crate::core::outcome::ApiOutcome)
/// values. `Api` only appears once a caller opts into `into_result()`.
#[derive(Debug, Error)]
pub enum DeployError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Destination already exists: {0:?}")]
    DestinationExists(PathBuf),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}: {body}")]
    Api {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    // ── Mod hosting ─────────────────────────────────────
    #[error("Game version query to {url} failed: {body}")]
    VersionQuery { url: String, body: String },

    #[error("{url} returned no game versions")]
    NoGameVersions { url: String },

    // ── Release hosting ─────────────────────────────────
    #[error("Invalid repository slug {0:?}, expected owner/repo")]
    InvalidRepoSlug(String),

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Config ──────────────────────────────────────────
    #[error("Environment variable {0} is not set")]
    MissingEnv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type DeployResult<T> = Result<T, DeployError>;

impl From<std::io::Error> for DeployError {
    fn from(source: std::io::Error) -> Self {
        DeployError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl DeployError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeployError::Io {
            path: path.into(),
            source,
        }
    }
}
