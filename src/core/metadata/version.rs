// ─── Version Data ───
// The mod's `.version` descriptor (KSP-AVC layout). Only the fields the
// packager and publishers read are modelled; the rest is ignored.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{DeployError, DeployResult};

/// `{MAJOR, MINOR, PATCH}`. All three are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTriple {
    #[serde(rename = "MAJOR")]
    pub major: u32,
    #[serde(rename = "MINOR")]
    pub minor: u32,
    #[serde(rename = "PATCH")]
    pub patch: u32,
}

impl fmt::Display for VersionTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionData {
    #[serde(rename = "NAME", default)]
    pub name: Option<String>,
    #[serde(rename = "VERSION")]
    pub version: VersionTriple,
    /// Game version the release targets.
    #[serde(rename = "KSP_VERSION", default)]
    pub game_version: Option<VersionTriple>,
}

impl VersionData {
    pub fn load(path: &Path) -> DeployResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// `MAJOR_MINOR_PATCH`, the suffix every archive name ends with.
    pub fn archive_suffix(&self) -> String {
        let v = &self.version;
        format!("{}_{}_{}", v.major, v.minor, v.patch)
    }

    /// `MAJOR.MINOR.PATCH`, used as the release tag.
    pub fn version_string(&self) -> String {
        self.version.to_string()
    }

    pub fn game_version_string(&self) -> Option<String> {
        self.game_version.map(|v| v.to_string())
    }
}
