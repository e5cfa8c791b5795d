use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{debug, info, info_span, warn, Instrument, Span};

use super::model::{match_version_id, GameVersionRecord, ReleaseType, UploadMetadata};
use crate::core::error::{DeployError, DeployResult};
use crate::core::fsops::file_name_string;
use crate::core::outcome::ApiOutcome;

pub const DEFAULT_BASE_URL: &str = "https://kerbal.curseforge.com";

const VERSIONS_PATH: &str = "api/game/versions";
const TOKEN_HEADER: &str = "X-Api-Token";

/// Client for the mod-hosting project API.
///
/// Authenticates every request with a static token header. HTTP failures come
/// back as [`ApiOutcome`] values; only transport and filesystem errors are `Err`.
pub struct CurseForgeClient {
    http: Client,
    token: String,
    base_url: String,
    span: Span,
}

impl CurseForgeClient {
    pub fn new(token: impl Into<String>, http: Client) -> Self {
        Self {
            http,
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            span: info_span!("curseforge"),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Span every log line of this client is emitted under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// List the game versions the platform knows about.
    pub async fn query_versions(&self) -> DeployResult<ApiOutcome<Vec<GameVersionRecord>>> {
        let url = self.url(VERSIONS_PATH);
        async {
            debug!("GET {}", url);
            let resp = self
                .http
                .get(&url)
                .header(TOKEN_HEADER, &self.token)
                .send()
                .await?;
            ApiOutcome::from_json(resp).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Map a human game version (e.g. `"1.12.5"`) to the platform's version id.
    ///
    /// When several records share the name the last one wins. When none
    /// matches, the last record is taken as the latest version and the
    /// fallback is reported on stdout; this never fails for a missing match.
    pub async fn resolve_version_id(&self, game_version: &str) -> DeployResult<i64> {
        let outcome = self.query_versions().await?;

        async {
            let versions = match outcome {
                ApiOutcome::Parsed(versions) => versions,
                ApiOutcome::HttpError { url, body, .. }
                | ApiOutcome::Undecodable { url, body, .. } => {
                    return Err(DeployError::VersionQuery { url, body });
                }
            };

            if let Some(id) = match_version_id(&versions, game_version) {
                info!(
                    "Found curse version {} from string version {}",
                    id, game_version
                );
                return Ok(id);
            }

            let latest = versions.last().ok_or_else(|| DeployError::NoGameVersions {
                url: self.url(VERSIONS_PATH),
            })?;
            println!(
                "Couldn't determine curse version from game version {}, using latest version {}",
                game_version, latest.id
            );
            warn!(
                "No game version named {}, falling back to latest {} ({})",
                game_version, latest.id, latest.name
            );
            Ok(latest.id)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Upload `file_path` as a new file of project `mod_id`.
    ///
    /// Returns the server's response text either way; inspect the variant to
    /// tell success from failure.
    pub async fn publish_release(
        &self,
        mod_id: u64,
        changelog: &str,
        game_version: &str,
        release_type: ReleaseType,
        file_path: &Path,
    ) -> DeployResult<ApiOutcome<String>> {
        let game_version_id = self.resolve_version_id(game_version).await?;
        let url = self.url(&format!("api/projects/{mod_id}/upload-file"));
        let metadata = UploadMetadata::markdown(changelog, game_version_id, release_type);
        let metadata_json = serde_json::to_string(&metadata)?;

        async {
            info!("File metadata {}, zip {:?}", metadata_json, file_path);

            // Read up front: no handle is held while the request is in flight.
            let bytes = tokio::fs::read(file_path)
                .await
                .map_err(|e| DeployError::io(file_path, e))?;
            let part = Part::bytes(bytes)
                .file_name(file_name_string(file_path))
                .mime_str("application/zip")?;
            let form = Form::new()
                .part("file", part)
                .text("metadata", metadata_json.clone());

            info!("Posting {} to {}", metadata_json, url);
            let resp = self
                .http
                .post(&url)
                .header(TOKEN_HEADER, &self.token)
                .multipart(form)
                .send()
                .await?;
            ApiOutcome::from_text(resp).await
        }
        .instrument(self.span.clone())
        .await
    }
}
