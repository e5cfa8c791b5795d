use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::archive::zip_directory;
use crate::core::error::{DeployError, DeployResult};
use crate::core::fsops::{copy_tree_new, ensure_path, entry_kind, subdirectories, EntryKind};
use crate::core::metadata::{ModData, VersionData};

pub const EXTRAS_DIR: &str = "Extras";

/// `{mod}_Core_{MAJOR}_{MINOR}_{PATCH}.zip`
pub fn core_archive_name(mod_name: &str, version: &VersionData) -> String {
    format!("{}_Core_{}.zip", mod_name, version.archive_suffix())
}

/// `{mod}_{MAJOR}_{MINOR}_{PATCH}.zip`
pub fn full_archive_name(mod_name: &str, version: &VersionData) -> String {
    format!("{}_{}.zip", mod_name, version.archive_suffix())
}

/// `{extra}{MAJOR}_{MINOR}_{PATCH}.zip`, no separator after the name.
pub fn extra_archive_name(extra: &str, version: &VersionData) -> String {
    format!("{}{}.zip", extra, version.archive_suffix())
}

/// Zip the build directory as it stands, before dependencies are collected.
pub fn build_core_release(
    version: &VersionData,
    mod_data: &ModData,
    build_path: &Path,
    deploy_path: &Path,
) -> DeployResult<PathBuf> {
    let archive = deploy_path.join(core_archive_name(&mod_data.mod_name, version));
    zip_directory(build_path, &archive)?;
    info!("Packaged {:?} -> {:?}", build_path, archive);
    Ok(archive)
}

/// Zip the build directory including every collected dependency.
pub fn build_full_release(
    version: &VersionData,
    mod_data: &ModData,
    build_path: &Path,
    deploy_path: &Path,
) -> DeployResult<PathBuf> {
    let archive = deploy_path.join(full_archive_name(&mod_data.mod_name, version));
    zip_directory(build_path, &archive)?;
    info!("Packaged {:?} -> {:?}", build_path, archive);
    Ok(archive)
}

/// Copy each extra under `extras_path` into `build_path/Extras/` and, when
/// `build_packages` is set, zip it on its own into `deploy_path`.
///
/// A non-empty `extras_filter` limits which extras are built. Returns the
/// archives written.
pub fn build_extras(
    version: &VersionData,
    build_path: &Path,
    deploy_path: &Path,
    extras_path: &Path,
    extras_filter: Option<&[String]>,
    build_packages: bool,
) -> DeployResult<Vec<PathBuf>> {
    let filter = extras_filter.filter(|names| !names.is_empty());
    let mut archives = Vec::new();

    for name in subdirectories(extras_path)? {
        if let Some(names) = filter {
            if !names.contains(&name) {
                debug!("Skipping Extra {} (not selected)", name);
                continue;
            }
        }

        if let Some(archive) = build_extra(
            &name,
            version,
            build_packages,
            extras_path,
            build_path,
            deploy_path,
        )? {
            archives.push(archive);
        }
    }

    Ok(archives)
}

fn build_extra(
    name: &str,
    version: &VersionData,
    build_package: bool,
    extras_path: &Path,
    build_path: &Path,
    deploy_path: &Path,
) -> DeployResult<Option<PathBuf>> {
    info!("Packaging Extra {}", name);
    let extras_root = build_path.join(EXTRAS_DIR);
    ensure_path(&extras_root)?;

    let staged = extras_root.join(name);
    copy_tree_new(&extras_path.join(name), &staged)?;

    if !build_package {
        return Ok(None);
    }

    let archive = deploy_path.join(extra_archive_name(name, version));
    zip_directory(&staged, &archive)?;
    info!("Packaged {:?}", archive);
    Ok(Some(archive))
}

/// Delete every regular file at the top level of `build_path` whose name is
/// not in `kept_files`. Subdirectories and their contents are left alone.
///
/// Returns the removed paths.
pub fn cleanup(kept_files: &[String], build_path: &Path) -> DeployResult<Vec<PathBuf>> {
    let mut removed = Vec::new();
    let entries = std::fs::read_dir(build_path).map_err(|e| DeployError::io(build_path, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| DeployError::io(build_path, e))?;
        let path = entry.path();
        if entry_kind(&path)? != EntryKind::File {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        if kept_files.iter().any(|kept| *kept == name) {
            continue;
        }

        std::fs::remove_file(&path).map_err(|e| DeployError::io(&path, e))?;
        debug!("Removed {:?}", path);
        removed.push(path);
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::VersionTriple;
    use std::fs::File;

    fn version(major: u32, minor: u32, patch: u32) -> VersionData {
        VersionData {
            name: None,
            version: VersionTriple {
                major,
                minor,
                patch,
            },
            game_version: None,
        }
    }

    fn mod_data(name: &str) -> ModData {
        serde_json::from_value(serde_json::json!({ "mod-name": name })).unwrap()
    }

    fn listing(root: &Path) -> Vec<String> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
            for entry in std::fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                let rel = path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/");
                if path.is_dir() {
                    out.push(format!("{rel}/"));
                    walk(root, &path, out);
                } else {
                    out.push(rel);
                }
            }
        }
        let mut out = Vec::new();
        walk(root, root, &mut out);
        out.sort();
        out
    }

    fn archive_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    fn sample_build(root: &Path) -> PathBuf {
        let build = root.join("build");
        std::fs::create_dir_all(build.join("GameData/Foo/Parts")).unwrap();
        std::fs::write(build.join("GameData/Foo/Parts/tank.cfg"), b"PART {}").unwrap();
        std::fs::write(build.join("readme.txt"), b"read me").unwrap();
        build
    }

    #[test]
    fn archive_names_follow_convention() {
        let v = version(1, 2, 3);
        assert_eq!(core_archive_name("Foo", &v), "Foo_Core_1_2_3.zip");
        assert_eq!(full_archive_name("Foo", &v), "Foo_1_2_3.zip");
        assert_eq!(extra_archive_name("FooExtra", &v), "FooExtra1_2_3.zip");
    }

    #[test]
    fn core_release_contains_whole_build_tree() {
        let dir = tempfile::tempdir().unwrap();
        let build = sample_build(dir.path());
        let deploy = dir.path().join("deploy");

        let archive =
            build_core_release(&version(1, 2, 3), &mod_data("Foo"), &build, &deploy).unwrap();

        assert_eq!(archive, deploy.join("Foo_Core_1_2_3.zip"));
        assert!(archive.is_file());
        assert_eq!(archive_names(&archive), listing(&build));
    }

    #[test]
    fn full_release_has_no_core_infix() {
        let dir = tempfile::tempdir().unwrap();
        let build = sample_build(dir.path());
        let deploy = dir.path().join("deploy");

        let archive =
            build_full_release(&version(0, 4, 10), &mod_data("Foo"), &build, &deploy).unwrap();

        assert_eq!(archive, deploy.join("Foo_0_4_10.zip"));
        assert_eq!(archive_names(&archive), listing(&build));
    }

    fn sample_extras(root: &Path) -> PathBuf {
        let extras = root.join("extras");
        for name in ["A", "B"] {
            std::fs::create_dir_all(extras.join(name).join("Patches")).unwrap();
            std::fs::write(extras.join(name).join("Patches/patch.cfg"), name).unwrap();
        }
        std::fs::write(extras.join("README.md"), b"not an extra").unwrap();
        extras
    }

    #[test]
    fn extras_filter_limits_copies() {
        let dir = tempfile::tempdir().unwrap();
        let build = sample_build(dir.path());
        let extras = sample_extras(dir.path());
        let deploy = dir.path().join("deploy");
        let filter = vec!["A".to_string()];

        let archives = build_extras(
            &version(1, 2, 3),
            &build,
            &deploy,
            &extras,
            Some(filter.as_slice()),
            false,
        )
        .unwrap();

        assert!(archives.is_empty());
        assert_eq!(
            std::fs::read_to_string(build.join("Extras/A/Patches/patch.cfg")).unwrap(),
            "A"
        );
        assert!(!build.join("Extras/B").exists());
        assert!(extras.join("B/Patches/patch.cfg").exists());
        assert!(!deploy.exists());
    }

    #[test]
    fn extras_without_filter_build_packages() {
        let dir = tempfile::tempdir().unwrap();
        let build = sample_build(dir.path());
        let extras = sample_extras(dir.path());
        let deploy = dir.path().join("deploy");

        let archives =
            build_extras(&version(1, 2, 3), &build, &deploy, &extras, Some(&[][..]), true).unwrap();

        assert_eq!(archives, [deploy.join("A1_2_3.zip"), deploy.join("B1_2_3.zip")]);
        assert_eq!(
            archive_names(&deploy.join("B1_2_3.zip")),
            ["Patches/", "Patches/patch.cfg"]
        );
        assert!(build.join("Extras/A").is_dir());
        assert!(build.join("Extras/B").is_dir());
    }

    #[test]
    fn extras_fail_when_already_staged() {
        let dir = tempfile::tempdir().unwrap();
        let build = sample_build(dir.path());
        let extras = sample_extras(dir.path());
        std::fs::create_dir_all(build.join("Extras/A")).unwrap();

        let err = build_extras(
            &version(1, 2, 3),
            &build,
            &dir.path().join("deploy"),
            &extras,
            None,
            false,
        )
        .unwrap_err();

        assert!(matches!(err, DeployError::DestinationExists(p) if p == build.join("Extras/A")));
    }

    #[test]
    fn cleanup_keeps_listed_files_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path();
        std::fs::write(build.join("keep.txt"), b"keep").unwrap();
        std::fs::write(build.join("drop.txt"), b"drop").unwrap();
        std::fs::create_dir_all(build.join("sub")).unwrap();
        std::fs::write(build.join("sub/extra.txt"), b"extra").unwrap();

        let removed = cleanup(&["keep.txt".to_string()], build).unwrap();

        assert_eq!(removed, [build.join("drop.txt")]);
        assert_eq!(listing(build), ["keep.txt", "sub/", "sub/extra.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn cleanup_removes_symlinked_files_not_kept() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside.txt");
        std::fs::write(&outside, b"outside").unwrap();
        let build = dir.path().join("build");
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join("real.txt"), b"real").unwrap();
        symlink(&outside, build.join("linked.txt")).unwrap();
        symlink(&outside, build.join("kept-link.txt")).unwrap();

        let mut removed = cleanup(&["kept-link.txt".to_string()], &build).unwrap();
        removed.sort();

        assert_eq!(removed, [build.join("linked.txt"), build.join("real.txt")]);
        assert!(std::fs::symlink_metadata(build.join("linked.txt")).is_err());
        assert!(build.join("kept-link.txt").exists());
        assert!(outside.exists());
    }

    #[test]
    fn cleanup_with_empty_list_removes_all_top_level_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"").unwrap();

        let removed = cleanup(&[], dir.path()).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(listing(dir.path()).is_empty());
    }
}
