use std::path::PathBuf;
use std::str::FromStr;

use reqwest::Client;
use tracing::{info, warn};

use crate::core::curseforge::CurseForgeClient;
use crate::core::dependencies::{collect_dependencies, HttpDependencyFetcher};
use crate::core::error::{DeployError, DeployResult};
use crate::core::fsops::{clean_path, copy_dir_recursive, ensure_path, subdirectories};
use crate::core::github::{release_id, GitHubReleasesClient, RepoSlug};
use crate::core::http::build_http_client;
use crate::core::metadata::{ModData, VersionData};
use crate::core::packaging::{
    build_core_release, build_extras, build_full_release, core_archive_name, extra_archive_name,
    full_archive_name,
};
use crate::core::state::{DeployConfig, DEFAULT_CONFIG_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishTarget {
    CurseForge,
    GitHub,
    All,
}

impl PublishTarget {
    fn curseforge(self) -> bool {
        matches!(self, PublishTarget::CurseForge | PublishTarget::All)
    }

    fn github(self) -> bool {
        matches!(self, PublishTarget::GitHub | PublishTarget::All)
    }
}

impl FromStr for PublishTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "curseforge" | "curse" => Ok(PublishTarget::CurseForge),
            "github" | "gh" => Ok(PublishTarget::GitHub),
            "all" => Ok(PublishTarget::All),
            other => Err(format!("unknown publish target {other:?}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Package,
    Publish(PublishTarget),
    Deploy(PublishTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub config_path: PathBuf,
}

impl Invocation {
    /// Parse `<command> [target] [--config <path>]`.
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let mut config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        let mut positional = Vec::new();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let value = iter.next().ok_or("--config needs a path")?;
                    config_path = PathBuf::from(value);
                }
                other => positional.push(other),
            }
        }

        let target = |index: usize| -> Result<PublishTarget, String> {
            positional
                .get(index)
                .map_or(Ok(PublishTarget::All), |raw| raw.parse())
        };

        let command = match positional.first().copied() {
            None | Some("help" | "--help" | "-h") => Command::Help,
            Some("package") => Command::Package,
            Some("publish") => Command::Publish(target(1)?),
            Some("deploy") => Command::Deploy(target(1)?),
            Some(other) => return Err(format!("unknown command {other:?}")),
        };

        Ok(Self {
            command,
            config_path,
        })
    }
}

pub fn usage() -> &'static str {
    "usage: mod-deploy <command> [target] [--config <path>]\n\
     \n\
     commands:\n\
     \x20   package             build core, full and extra archives\n\
     \x20   publish [target]    upload archives (target: curseforge, github, all)\n\
     \x20   deploy [target]     package, then publish\n\
     \x20   help                show this help\n"
}

pub async fn execute(invocation: Invocation) -> DeployResult<()> {
    if invocation.command == Command::Help {
        print!("{}", usage());
        return Ok(());
    }

    let config = DeployConfig::load(&invocation.config_path)?;
    match invocation.command {
        Command::Help => Ok(()),
        Command::Package => package(&config).await.map(|_| ()),
        Command::Publish(target) => publish(&config, target).await,
        Command::Deploy(target) => {
            package(&config).await?;
            publish(&config, target).await
        }
    }
}

/// Archives written by [`package`].
#[derive(Debug, Clone)]
pub struct PackageReport {
    pub core: PathBuf,
    pub full: PathBuf,
    pub extras: Vec<PathBuf>,
}

/// Stage the build tree, build extras, then the core archive, pull in
/// dependencies, and finally the full archive.
pub async fn package(config: &DeployConfig) -> DeployResult<PackageReport> {
    let version = VersionData::load(config.version_file()?)?;
    let mod_data = ModData::load(&config.paths.mod_data)?;
    let paths = &config.paths;

    match &paths.source {
        Some(source) => {
            info!("Staging {:?} into {:?}", source, paths.build);
            clean_path(&paths.build)?;
            copy_dir_recursive(source, &paths.build)?;
        }
        None => ensure_path(&paths.build)?,
    }
    ensure_path(&paths.deploy)?;

    let extras = match &paths.extras {
        Some(extras_path) => build_extras(
            &version,
            &paths.build,
            &paths.deploy,
            extras_path,
            mod_data.extras_filter(),
            mod_data.package.build_extra_packages,
        )?,
        None => Vec::new(),
    };

    let core = build_core_release(&version, &mod_data, &paths.build, &paths.deploy)?;

    let fetcher = HttpDependencyFetcher::new(build_http_client(&config.http)?);
    collect_dependencies(&mod_data, &paths.build, &paths.temp, config, &fetcher).await?;

    let full = build_full_release(&version, &mod_data, &paths.build, &paths.deploy)?;

    info!(
        "Packaged {} {} ({} extra archives)",
        mod_data.mod_name,
        version.version_string(),
        extras.len()
    );
    Ok(PackageReport { core, full, extras })
}

/// Publish the current version's archives to the selected platforms.
pub async fn publish(config: &DeployConfig, target: PublishTarget) -> DeployResult<()> {
    let version = VersionData::load(config.version_file()?)?;
    let mod_data = ModData::load(&config.paths.mod_data)?;
    let changelog = std::fs::read_to_string(&config.paths.changelog)
        .map_err(|e| DeployError::io(&config.paths.changelog, e))?;
    let http = build_http_client(&config.http)?;

    if target.curseforge() {
        publish_curseforge(config, &version, &mod_data, &changelog, http.clone()).await?;
    }
    if target.github() {
        publish_github(config, &version, &mod_data, &changelog, http, |key| {
            std::env::var(key).ok()
        })
        .await?;
    }
    Ok(())
}

async fn publish_curseforge(
    config: &DeployConfig,
    version: &VersionData,
    mod_data: &ModData,
    changelog: &str,
    http: Client,
) -> DeployResult<()> {
    let mod_id = mod_data
        .curseforge_id
        .ok_or_else(|| DeployError::Config("curseforge-id is missing from mod data".into()))?;
    let game_version = config
        .curseforge
        .game_version
        .clone()
        .or_else(|| version.game_version_string())
        .ok_or_else(|| {
            DeployError::Config(
                "no game version: set curseforge.game_version or KSP_VERSION in the .version file"
                    .into(),
            )
        })?;

    let client = CurseForgeClient::new(config.curseforge_token()?, http)
        .with_base_url(config.curseforge.base_url.as_str());
    let archive = config
        .paths
        .deploy
        .join(full_archive_name(&mod_data.mod_name, version));

    let response = client
        .publish_release(
            mod_id,
            changelog,
            &game_version,
            mod_data.release_type,
            &archive,
        )
        .await?
        .into_result()?;
    info!("CurseForge accepted {:?}: {}", archive, response);
    Ok(())
}

async fn publish_github(
    config: &DeployConfig,
    version: &VersionData,
    mod_data: &ModData,
    changelog: &str,
    http: Client,
    env: impl Fn(&str) -> Option<String>,
) -> DeployResult<()> {
    let (username, token) = config.github_credentials()?;
    let configured = config.github_repo_slug()?;

    // Uploads normally target the CI repository; outside CI use the configured one.
    let upload_target = match RepoSlug::from_lookup(env) {
        Ok(slug) => slug,
        Err(DeployError::MissingEnv(name)) => {
            warn!("{} is not set, uploading to {}", name, configured);
            configured.clone()
        }
        Err(err) => return Err(err),
    };

    let client = GitHubReleasesClient::new(username, token, configured, http)
        .with_api_base(config.github.api_base.as_str())
        .with_upload_base(config.github.upload_base.as_str())
        .with_target_branch(config.github.target_branch.as_str());

    let release = client
        .create_release(&version.version_string(), changelog)
        .await?
        .into_result()?;
    let id = release_id(&release)
        .ok_or_else(|| DeployError::Other(format!("release response has no id: {release}")))?;

    for archive in release_archives(config, version, mod_data)? {
        client
            .upload_asset(id, &archive, Some(&upload_target))
            .await?
            .into_result()?;
        info!("Uploaded {:?} to release {}", archive, id);
    }
    Ok(())
}

/// Archives of this version that exist in the deploy directory, full release first.
pub fn release_archives(
    config: &DeployConfig,
    version: &VersionData,
    mod_data: &ModData,
) -> DeployResult<Vec<PathBuf>> {
    let mut names = vec![
        full_archive_name(&mod_data.mod_name, version),
        core_archive_name(&mod_data.mod_name, version),
    ];

    if let Some(extras_path) = &config.paths.extras {
        if extras_path.is_dir() {
            for extra in subdirectories(extras_path)? {
                names.push(extra_archive_name(&extra, version));
            }
        }
    }

    Ok(names
        .into_iter()
        .map(|name| config.paths.deploy.join(name))
        .filter(|path| path.is_file())
        .collect())
}
