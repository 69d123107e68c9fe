//! Source-tree and package-tree layouts.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigurationError;

/// Where things live inside the unpacked XZ Utils source tree.
///
/// Defaults match the xz-5.2.3 release archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    /// Name of the unpacked source directory inside the working directory.
    pub root: String,
    /// Directory holding the Visual Studio solution, relative to `root`.
    pub windows_dir: String,
    /// Solution file name inside `windows_dir`.
    pub solution: String,
    /// Public API headers, relative to `root`.
    pub api_headers: String,
    /// License file, relative to `root`.
    pub license: String,
    /// Installation directory for configure/make, relative to the working directory.
    pub install_dir: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        SourceLayout {
            root: "xz-5.2.3".to_string(),
            windows_dir: "windows".to_string(),
            solution: "xz_win.sln".to_string(),
            api_headers: "src/liblzma/api".to_string(),
            license: "COPYING".to_string(),
            install_dir: "lzma-install".to_string(),
        }
    }
}

impl SourceLayout {
    /// Reject an install directory that is not a plain subdirectory of the
    /// working directory. It is wiped before every configure run.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let install = Path::new(&self.install_dir);
        let plain = install.components().next().is_some()
            && install
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if plain {
            Ok(())
        } else {
            Err(ConfigurationError::Path {
                field: "source.install_dir".to_string(),
                path: install.to_path_buf(),
                reason: "must be a relative path below the working directory".to_string(),
            })
        }
    }
}

/// The normalized package: `include/`, `lib/`, `bin/` (and `license/`).
///
/// Identical no matter which strategy produced the artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub const INCLUDE: &'static str = "include";
    pub const LIB: &'static str = "lib";
    pub const BIN: &'static str = "bin";
    pub const LICENSE: &'static str = "license";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join(Self::INCLUDE)
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join(Self::LIB)
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(Self::BIN)
    }

    pub fn license_dir(&self) -> PathBuf {
        self.root.join(Self::LICENSE)
    }
}

/// Files collected into a package.
///
/// Headers keep their path relative to the include root; libraries and
/// binaries are bare file names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    pub headers: BTreeSet<PathBuf>,
    pub static_libraries: BTreeSet<String>,
    pub shared_libraries: BTreeSet<String>,
    pub binaries: BTreeSet<String>,
}

impl ArtifactSet {
    /// All library file names, static first.
    pub fn libraries(&self) -> impl Iterator<Item = &str> {
        self.static_libraries
            .iter()
            .chain(self.shared_libraries.iter())
            .map(String::as_str)
    }
}
