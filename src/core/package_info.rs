//! Consumer-facing link metadata for a built package.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::builder::util::extract_lib_name;
use crate::core::layout::{ArtifactSet, PackageLayout};
use crate::core::settings::{BuildConfiguration, Linkage};

pub const PACKAGE_NAME: &str = "lzma";
pub const PACKAGE_VERSION: &str = "5.2.3";
pub const PACKAGE_LICENSE: &str = "Public Domain";

/// liblzma's headers switch their export annotations on this define.
pub const STATIC_DEFINE: &str = "LZMA_API_STATIC";

/// What a downstream compiler/linker invocation needs to use the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    pub name: String,
    pub version: String,
    pub license: String,
    /// Link names, e.g. `lzma` or `liblzma`.
    pub libs: Vec<String>,
    /// Preprocessor defines required by consumers.
    pub defines: Vec<String>,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub bin_dirs: Vec<String>,
}

impl PackageInfo {
    /// Derive metadata from the final configuration and the collected artifacts.
    pub fn emit(config: &BuildConfiguration, artifacts: &ArtifactSet) -> Self {
        let defines = match config.linkage() {
            Linkage::Static => vec![STATIC_DEFINE.to_string()],
            Linkage::Shared => Vec::new(),
        };

        let libs: BTreeSet<String> = artifacts
            .libraries()
            .filter_map(|file| extract_lib_name(Path::new(file)))
            .collect();

        PackageInfo {
            name: PACKAGE_NAME.to_string(),
            version: PACKAGE_VERSION.to_string(),
            license: PACKAGE_LICENSE.to_string(),
            libs: libs.into_iter().collect(),
            defines,
            include_dirs: vec![PackageLayout::INCLUDE.to_string()],
            lib_dirs: vec![PackageLayout::LIB.to_string()],
            bin_dirs: vec![PackageLayout::BIN.to_string()],
        }
    }
}
