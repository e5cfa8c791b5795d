use std::fmt;

use serde::{Deserialize, Serialize};

/// One entry of `api/game/versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameVersionRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Alpha,
    Beta,
    #[default]
    Release,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseType::Alpha => write!(f, "alpha"),
            ReleaseType::Beta => write!(f, "beta"),
            ReleaseType::Release => write!(f, "release"),
        }
    }
}

/// The `metadata` part of an upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata<'a> {
    pub changelog: &'a str,
    pub changelog_type: &'static str,
    pub game_versions: Vec<i64>,
    pub release_type: ReleaseType,
}

impl<'a> UploadMetadata<'a> {
    pub fn markdown(changelog: &'a str, game_version_id: i64, release_type: ReleaseType) -> Self {
        Self {
            changelog,
            changelog_type: "markdown",
            game_versions: vec![game_version_id],
            release_type,
        }
    }
}

/// Pick the record whose name matches `wanted`.
///
/// Every match overwrites the previous one, so the last duplicate wins.
/// `None` when nothing matches.
pub fn match_version_id(versions: &[GameVersionRecord], wanted: &str) -> Option<i64> {
    let mut found = None;
    for version in versions {
        if version.name == wanted {
            found = Some(version.id);
        }
    }
    found
}
