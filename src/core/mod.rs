// ─── mod-deploy Core ───
// Packaging and release publishing for game mods.
//
// Architecture:
//   core/
//     metadata/     — .version file + mod data descriptor
//     packaging/    — Core, full and extra zip archives, build cleanup
//     dependencies/ — Dependency fetching into the build tree
//     curseforge/   — Game version lookup + file upload
//     github/       — Releases + asset upload
//     state/        — Deploy configuration

pub mod curseforge;
pub mod dependencies;
pub mod error;
pub mod fsops;
pub mod github;
pub mod http;
pub mod metadata;
pub mod outcome;
pub mod packaging;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
