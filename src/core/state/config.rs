use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::curseforge::DEFAULT_BASE_URL as CURSEFORGE_BASE_URL;
use crate::core::error::{DeployError, DeployResult};
use crate::core::github::{
    RepoSlug, DEFAULT_API_BASE as GITHUB_API_BASE, DEFAULT_TARGET_BRANCH,
    DEFAULT_UPLOAD_BASE as GITHUB_UPLOAD_BASE,
};

pub const DEFAULT_CONFIG_FILE: &str = "deploy.json";

const CURSEFORGE_TOKEN_ENV: &str = "CURSEFORGE_OAUTH_TOKEN";
const GITHUB_TOKEN_ENV: &str = "GITHUB_OAUTH_TOKEN";
const GITHUB_USERNAME_ENV: &str = "GITHUB_USERNAME";

/// Where things live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Tree staged into `build` before packaging, if any.
    pub source: Option<PathBuf>,
    pub build: PathBuf,
    pub deploy: PathBuf,
    pub temp: PathBuf,
    pub extras: Option<PathBuf>,
    pub mod_data: PathBuf,
    pub version_file: Option<PathBuf>,
    pub changelog: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            source: None,
            build: PathBuf::from("build"),
            deploy: PathBuf::from("deploy"),
            temp: PathBuf::from("tmp"),
            extras: None,
            mod_data: PathBuf::from(".mod_data.json"),
            version_file: None,
            changelog: PathBuf::from("CHANGELOG.md"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurseForgeSettings {
    pub base_url: String,
    pub token: Option<String>,
    /// Overrides the game version read from the `.version` file.
    pub game_version: Option<String>,
}

impl Default for CurseForgeSettings {
    fn default() -> Self {
        Self {
            base_url: CURSEFORGE_BASE_URL.to_string(),
            token: None,
            game_version: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub api_base: String,
    pub upload_base: String,
    pub username: Option<String>,
    pub token: Option<String>,
    pub repo_slug: Option<String>,
    pub target_branch: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            upload_base: GITHUB_UPLOAD_BASE.to_string(),
            username: None,
            token: None,
            repo_slug: None,
            target_branch: DEFAULT_TARGET_BRANCH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// `false` accepts invalid TLS certificates.
    pub enable_ssl: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            connect_timeout_secs: 30,
            enable_ssl: true,
        }
    }
}

/// Everything the driver needs, read from `deploy.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub paths: PathSettings,
    pub curseforge: CurseForgeSettings,
    pub github: GitHubSettings,
    pub http: HttpSettings,
}

impl DeployConfig {
    /// Read the config file, falling back to defaults when it does not exist,
    /// then apply secrets from the process environment.
    pub fn load(path: &Path) -> DeployResult<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
            serde_json::from_str::<DeployConfig>(&raw)?
        } else {
            debug!("No config at {:?}, using defaults", path);
            DeployConfig::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Secrets from the environment win over the file.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(token) = non_empty(CURSEFORGE_TOKEN_ENV) {
            self.curseforge.token = Some(token);
        }
        if let Some(token) = non_empty(GITHUB_TOKEN_ENV) {
            self.github.token = Some(token);
        }
        if let Some(username) = non_empty(GITHUB_USERNAME_ENV) {
            self.github.username = Some(username);
        }
    }

    pub fn curseforge_token(&self) -> DeployResult<&str> {
        self.curseforge.token.as_deref().ok_or_else(|| {
            DeployError::Config(format!(
                "curseforge.token is not set (or export {CURSEFORGE_TOKEN_ENV})"
            ))
        })
    }

    pub fn github_credentials(&self) -> DeployResult<(&str, &str)> {
        let username = self.github.username.as_deref().ok_or_else(|| {
            DeployError::Config(format!(
                "github.username is not set (or export {GITHUB_USERNAME_ENV})"
            ))
        })?;
        let token = self.github.token.as_deref().ok_or_else(|| {
            DeployError::Config(format!(
                "github.token is not set (or export {GITHUB_TOKEN_ENV})"
            ))
        })?;
        Ok((username, token))
    }

    pub fn github_repo_slug(&self) -> DeployResult<RepoSlug> {
        let raw = self
            .github
            .repo_slug
            .as_deref()
            .ok_or_else(|| DeployError::Config("github.repo_slug is not set".into()))?;
        raw.parse()
    }

    pub fn version_file(&self) -> DeployResult<&Path> {
        self.paths
            .version_file
            .as_deref()
            .ok_or_else(|| DeployError::Config("paths.version_file is not set".into()))
    }
}
