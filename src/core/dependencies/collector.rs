use std::path::Path;

use tracing::info;

use super::fetcher::DependencyFetcher;
use crate::core::error::DeployResult;
use crate::core::fsops::clean_path;
use crate::core::metadata::ModData;
use crate::core::packaging::cleanup;
use crate::core::state::DeployConfig;

/// Fetch every dependency of `mod_data` into `build_path`, then prune the
/// build root down to the mod's `included-support` files.
///
/// `temp_path` is wiped first. Dependencies are fetched in declaration order
/// and the first failure aborts the run; nothing already placed is rolled back.
pub async fn collect_dependencies(
    mod_data: &ModData,
    build_path: &Path,
    temp_path: &Path,
    config: &DeployConfig,
    fetcher: &dyn DependencyFetcher,
) -> DeployResult<()> {
    clean_path(temp_path)?;

    for (name, descriptor) in &mod_data.dependencies {
        fetcher
            .fetch(name, descriptor, temp_path, build_path, config)
            .await?;
    }

    let removed = cleanup(&mod_data.package.included_support, build_path)?;
    info!(
        "Collected {} dependencies, removed {} stray files from {:?}",
        mod_data.dependencies.len(),
        removed.len(),
        build_path
    );
    Ok(())
}
