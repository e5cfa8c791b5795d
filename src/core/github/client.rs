use std::path::Path;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info, info_span, Instrument, Span};

use super::model::{ReleasePayload, RepoSlug};
use crate::core::error::{DeployError, DeployResult};
use crate::core::fsops::file_name_string;
use crate::core::outcome::ApiOutcome;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_UPLOAD_BASE: &str = "https://uploads.github.com";
pub const DEFAULT_TARGET_BRANCH: &str = "master";

/// Client for the release-hosting REST API.
///
/// Every request carries basic auth. As with the mod-hosting client, non-2xx
/// responses and undecodable bodies are returned as [`ApiOutcome`] values.
pub struct GitHubReleasesClient {
    http: Client,
    username: String,
    token: String,
    slug: RepoSlug,
    api_base: String,
    upload_base: String,
    target_branch: String,
    span: Span,
}

impl GitHubReleasesClient {
    pub fn new(
        username: impl Into<String>,
        token: impl Into<String>,
        slug: RepoSlug,
        http: Client,
    ) -> Self {
        Self {
            http,
            username: username.into(),
            token: token.into(),
            slug,
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            target_branch: DEFAULT_TARGET_BRANCH.to_string(),
            span: info_span!("github"),
        }
    }

    pub fn with_api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_upload_base(mut self, url: impl Into<String>) -> Self {
        self.upload_base = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Branch new release tags are cut from.
    pub fn with_target_branch(mut self, branch: impl Into<String>) -> Self {
        self.target_branch = branch.into();
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn slug(&self) -> &RepoSlug {
        &self.slug
    }

    fn repo_url(&self, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.slug.owner, self.slug.repo, rest
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.token))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> DeployResult<ApiOutcome<T>> {
        async {
            info!("GET {}", url);
            let resp = self.authed(self.http.get(&url)).send().await?;
            ApiOutcome::from_json(resp).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// The most recent published release.
    pub async fn get_latest_release(&self) -> DeployResult<ApiOutcome<Value>> {
        self.get_json(self.repo_url("releases/latest")).await
    }

    pub async fn list_release_assets(&self, release_id: u64) -> DeployResult<ApiOutcome<Vec<Value>>> {
        self.get_json(self.repo_url(&format!("releases/{release_id}/assets")))
            .await
    }

    /// Tag `version` on the target branch and publish it with `changelog` as body.
    pub async fn create_release(
        &self,
        version: &str,
        changelog: &str,
    ) -> DeployResult<ApiOutcome<Value>> {
        let url = self.repo_url("releases");
        let payload = ReleasePayload {
            tag_name: version,
            name: format!("{} {}", self.slug.repo, version),
            body: changelog,
            target_commitish: &self.target_branch,
            draft: false,
            prerelease: false,
        };

        async {
            info!("Posting {} to {}", serde_json::to_string(&payload)?, url);
            let resp = self
                .authed(self.http.post(&url))
                .json(&payload)
                .send()
                .await?;
            ApiOutcome::from_json(resp).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Attach `file_path` to release `release_id`.
    ///
    /// The upload goes to `target`, which defaults to the slug in
    /// `TRAVIS_REPO_SLUG` rather than the slug this client was built with.
    /// A missing or malformed variable is an error.
    pub async fn upload_asset(
        &self,
        release_id: u64,
        file_path: &Path,
        target: Option<&RepoSlug>,
    ) -> DeployResult<ApiOutcome<Value>> {
        let target = match target {
            Some(slug) => slug.clone(),
            None => RepoSlug::from_env()?,
        };
        let file_name = file_name_string(file_path);
        let url = format!(
            "{}/repos/{}/{}/releases/{}/assets",
            self.upload_base, target.owner, target.repo, release_id
        );

        async {
            info!("> Posting {:?} to {}?name={}", file_path, url, file_name);
            if target != self.slug {
                debug!("Upload target {} differs from configured {}", target, self.slug);
            }

            let bytes = tokio::fs::read(file_path)
                .await
                .map_err(|e| DeployError::io(file_path, e))?;
            let resp = self
                .authed(self.http.post(&url))
                .query(&[("name", file_name.as_str())])
                .header(CONTENT_TYPE, "application/zip")
                .body(bytes)
                .send()
                .await?;
            ApiOutcome::from_json(resp).await
        }
        .instrument(self.span.clone())
        .await
    }
}
