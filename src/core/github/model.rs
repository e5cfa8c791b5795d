use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::core::error::{DeployError, DeployResult};

/// Environment variable naming the repository CI is building.
pub const REPO_SLUG_ENV: &str = "TRAVIS_REPO_SLUG";

/// `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    /// Read the slug from [`REPO_SLUG_ENV`].
    pub fn from_env() -> DeployResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DeployResult<Self> {
        lookup(REPO_SLUG_ENV)
            .ok_or_else(|| DeployError::MissingEnv(REPO_SLUG_ENV.to_string()))?
            .parse()
    }
}

impl FromStr for RepoSlug {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(DeployError::InvalidRepoSlug(s.to_string())),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Body of `POST repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Serialize)]
pub struct ReleasePayload<'a> {
    pub tag_name: &'a str,
    pub name: String,
    pub body: &'a str,
    pub target_commitish: &'a str,
    pub draft: bool,
    pub prerelease: bool,
}

/// The `id` of a release object, if it has one.
pub fn release_id(release: &Value) -> Option<u64> {
    release.get("id").and_then(Value::as_u64)
}
