//! Collect toolchain output into the package layout.
//!
//! Headers keep their directory structure (`lzma/base.h` must stay under
//! `lzma/`). Libraries are flattened: only the file name survives.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::builder::strategy::OutputDirs;
use crate::core::errors::PackagingError;
use crate::core::layout::{ArtifactSet, PackageLayout};
use crate::core::settings::{BuildConfiguration, Linkage, Os};
use crate::util::fs::{copy_file, find_matching};

const HEADER_PATTERN: &str = "*.h";

/// Where a matched library file is recorded and copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    StaticLibrary,
    SharedLibrary,
    Binary,
}

/// One row of the collection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryRule {
    pub pattern: &'static str,
    pub kind: ArtifactKind,
}

/// Library rules for a configuration. Every rule must match at least once.
pub fn library_rules(config: &BuildConfiguration) -> Vec<LibraryRule> {
    use ArtifactKind::*;

    fn rule(pattern: &'static str, kind: ArtifactKind) -> LibraryRule {
        LibraryRule { pattern, kind }
    }

    match (config.os(), config.linkage()) {
        (Os::Windows, Linkage::Static) => vec![rule("*.lib", StaticLibrary)],
        // The .lib next to a DLL is its import library.
        (Os::Windows, Linkage::Shared) => {
            vec![rule("*.lib", SharedLibrary), rule("*.dll", Binary)]
        }
        (os, Linkage::Shared) if os.is_apple() => vec![rule("*.dylib*", SharedLibrary)],
        (_, Linkage::Shared) => vec![rule("*.so*", SharedLibrary)],
        (_, Linkage::Static) => vec![rule("*.a", StaticLibrary)],
    }
}

/// Copies headers and libraries from the toolchain output into a package.
pub struct ArtifactCollector<'a> {
    config: &'a BuildConfiguration,
    layout: &'a PackageLayout,
}

impl<'a> ArtifactCollector<'a> {
    pub fn new(config: &'a BuildConfiguration, layout: &'a PackageLayout) -> Self {
        ArtifactCollector { config, layout }
    }

    /// Collect everything. Fails if any required class is missing.
    pub fn collect(&self, dirs: &OutputDirs) -> Result<ArtifactSet, PackagingError> {
        let mut artifacts = ArtifactSet::default();

        require_dir("header", &dirs.header_root)?;
        require_dir("library", &dirs.library_root)?;

        artifacts.headers = self.collect_headers(&dirs.header_root)?;

        for rule in library_rules(self.config) {
            let dest_dir = match rule.kind {
                ArtifactKind::Binary => self.layout.bin_dir(),
                _ => self.layout.lib_dir(),
            };
            let names = copy_flat(&dirs.library_root, rule.pattern, &dest_dir)?;
            let bucket = match rule.kind {
                ArtifactKind::StaticLibrary => &mut artifacts.static_libraries,
                ArtifactKind::SharedLibrary => &mut artifacts.shared_libraries,
                ArtifactKind::Binary => &mut artifacts.binaries,
            };
            bucket.extend(names);
        }

        tracing::info!(
            "Collected {} header(s), {} librar(ies), {} binar(ies)",
            artifacts.headers.len(),
            artifacts.static_libraries.len() + artifacts.shared_libraries.len(),
            artifacts.binaries.len()
        );

        Ok(artifacts)
    }

    fn collect_headers(&self, header_root: &Path) -> Result<BTreeSet<PathBuf>, PackagingError> {
        let headers = find(header_root, HEADER_PATTERN)?;
        let include_dir = self.layout.include_dir();

        for relative in &headers {
            copy(&header_root.join(relative), &include_dir.join(relative))?;
        }

        Ok(headers.into_iter().collect())
    }

    /// Copy the license file to `license/`. Absence is not an error.
    pub fn copy_license(&self, license: &Path) -> Result<bool, PackagingError> {
        let Some(name) = license.file_name() else {
            return Ok(false);
        };
        if !license.is_file() {
            tracing::warn!("License file not found: {}", license.display());
            return Ok(false);
        }
        copy(license, &self.layout.license_dir().join(name))?;
        Ok(true)
    }
}

fn require_dir(what: &'static str, path: &Path) -> Result<(), PackagingError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PackagingError::MissingDirectory {
            what,
            path: path.to_path_buf(),
        })
    }
}

/// Find matching files; no match is an error.
fn find(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, PackagingError> {
    let found = find_matching(base, pattern).map_err(|source| PackagingError::Read {
        path: base.to_path_buf(),
        source,
    })?;
    if found.is_empty() {
        return Err(PackagingError::NoArtifacts {
            pattern: pattern.to_string(),
            dir: base.to_path_buf(),
        });
    }
    Ok(found)
}

/// Copy matches into `dest_dir` by file name only.
///
/// When two matches share a file name the first one (in sorted path order,
/// so the shallower one) wins and the clash is logged.
fn copy_flat(base: &Path, pattern: &str, dest_dir: &Path) -> Result<Vec<String>, PackagingError> {
    let mut copied: BTreeMap<String, PathBuf> = BTreeMap::new();
    for relative in find(base, pattern)? {
        let Some(name) = relative.file_name() else {
            continue;
        };
        let name = name.to_string_lossy().into_owned();
        if let Some(first) = copied.get(&name) {
            tracing::warn!(
                "{} and {} both flatten to {}, keeping {}",
                first.display(),
                relative.display(),
                name,
                first.display()
            );
            continue;
        }
        copy(&base.join(&relative), &dest_dir.join(&name))?;
        copied.insert(name, relative);
    }
    Ok(copied.into_keys().collect())
}

fn copy(from: &Path, to: &Path) -> Result<(), PackagingError> {
    tracing::debug!("copy {} -> {}", from.display(), to.display());
    copy_file(from, to).map_err(|source| PackagingError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}
