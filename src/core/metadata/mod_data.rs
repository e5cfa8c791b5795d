use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::curseforge::ReleaseType;
use crate::core::error::{DeployError, DeployResult};

/// Dependency entry as written in the mod data file.
///
/// Opaque to the collector; only the fetcher knows its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyDescriptor(pub serde_json::Value);

impl DependencyDescriptor {
    /// Decode the descriptor into the shape a fetcher expects.
    pub fn parse<T: DeserializeOwned>(&self) -> DeployResult<T> {
        Ok(T::deserialize(&self.0)?)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PackageData {
    /// Top-level build files that survive cleanup.
    pub included_support: Vec<String>,
    /// Extras to build. `None` or empty means every extra.
    pub extras: Option<Vec<String>>,
    pub build_extra_packages: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ModData {
    pub mod_name: String,
    /// Iterated in file order.
    #[serde(default)]
    pub dependencies: IndexMap<String, DependencyDescriptor>,
    #[serde(default)]
    pub package: PackageData,
    #[serde(default)]
    pub curseforge_id: Option<u64>,
    #[serde(default)]
    pub release_type: ReleaseType,
}

impl ModData {
    pub fn load(path: &Path) -> DeployResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| DeployError::io(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn extras_filter(&self) -> Option<&[String]> {
        self.package.extras.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_keep_file_order() {
        let data: ModData = serde_json::from_str(
            r#"{
                "mod-name": "Foo",
                "dependencies": {
                    "Zeta": { "url": "https://example.com/z.zip" },
                    "Alpha": { "url": "https://example.com/a.zip" },
                    "Mid": { "url": "https://example.com/m.zip" }
                },
                "package": { "included-support": ["readme.txt"] },
                "curseforge-id": 220462,
                "release-type": "beta"
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = data.dependencies.keys().map(String::as_str).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
        assert_eq!(data.package.included_support, ["readme.txt"]);
        assert_eq!(data.curseforge_id, Some(220462));
        assert_eq!(data.release_type, ReleaseType::Beta);
        assert!(!data.package.build_extra_packages);
    }

    #[test]
    fn minimal_mod_data_defaults() {
        let data: ModData = serde_json::from_str(r#"{"mod-name": "Foo"}"#).unwrap();
        assert!(data.dependencies.is_empty());
        assert!(data.package.included_support.is_empty());
        assert_eq!(data.extras_filter(), None);
        assert_eq!(data.release_type, ReleaseType::Release);
    }

    #[test]
    fn descriptor_parses_into_fetcher_shape() {
        #[derive(Deserialize)]
        struct Shape {
            url: String,
        }

        let descriptor = DependencyDescriptor(serde_json::json!({"url": "https://x/y.zip"}));
        let shape: Shape = descriptor.parse().unwrap();
        assert_eq!(shape.url, "https://x/y.zip");
    }
}
