mod config;

pub use config::{
    CurseForgeSettings, DeployConfig, GitHubSettings, HttpSettings, PathSettings,
    DEFAULT_CONFIG_FILE,
};
