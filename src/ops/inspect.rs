//! Implementation of `xzpack info`: describe an existing package directory.

use std::path::Path;

use crate::builder::collect::{library_rules, ArtifactKind};
use crate::core::errors::PackagingError;
use crate::core::layout::{ArtifactSet, PackageLayout};
use crate::core::package_info::PackageInfo;
use crate::core::settings::BuildConfiguration;
use crate::util::fs::find_matching;

/// Rebuild the artifact set of a package produced for `config`.
///
/// Unlike collection, nothing is required to be present besides the
/// package root itself; an empty `lib/` just yields no libraries.
pub fn scan_package(
    layout: &PackageLayout,
    config: &BuildConfiguration,
) -> Result<ArtifactSet, PackagingError> {
    if !layout.root().is_dir() {
        return Err(PackagingError::MissingDirectory {
            what: "package",
            path: layout.root().to_path_buf(),
        });
    }

    let mut artifacts = ArtifactSet::default();
    artifacts.headers = scan(&layout.include_dir(), "*.h")?.into_iter().collect();

    for rule in library_rules(config) {
        let (dir, bucket) = match rule.kind {
            ArtifactKind::StaticLibrary => (layout.lib_dir(), &mut artifacts.static_libraries),
            ArtifactKind::SharedLibrary => (layout.lib_dir(), &mut artifacts.shared_libraries),
            ArtifactKind::Binary => (layout.bin_dir(), &mut artifacts.binaries),
        };
        for path in scan(&dir, rule.pattern)? {
            if let Some(name) = path.file_name() {
                bucket.insert(name.to_string_lossy().into_owned());
            }
        }
    }

    Ok(artifacts)
}

/// Describe the package at `package_dir`.
pub fn inspect(
    package_dir: &Path,
    config: &BuildConfiguration,
) -> Result<PackageInfo, PackagingError> {
    let layout = PackageLayout::new(package_dir);
    let artifacts = scan_package(&layout, config)?;
    if artifacts.libraries().next().is_none() {
        tracing::warn!("no libraries found in {}", layout.lib_dir().display());
    }
    Ok(PackageInfo::emit(config, &artifacts))
}

fn scan(dir: &Path, pattern: &str) -> Result<Vec<std::path::PathBuf>, PackagingError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    find_matching(dir, pattern).map_err(|source| PackagingError::Read {
        path: dir.to_path_buf(),
        source,
    })
}
