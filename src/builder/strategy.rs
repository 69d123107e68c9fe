//! Build strategies and the selector that picks one.
//!
//! There are exactly two ways to build liblzma: the Visual Studio solution
//! shipped in `windows/` and the autotools configure script. The choice is
//! made once per configuration by [`BuildStrategy::select`]; everything
//! downstream asks the selected [`Strategy`] instead of re-deriving it.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::builder::command::Phase;
use crate::builder::configure_make::ConfigureMakeStrategy;
use crate::builder::context::BuildContext;
use crate::builder::project_file::ProjectFileStrategy;
use crate::core::errors::{BuildFailure, ConfigurationError};
use crate::core::settings::{BuildConfiguration, CompilerFamily};

/// Which toolchain drives the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStrategy {
    /// MSBuild on the shipped Visual Studio solution
    ProjectFile,
    /// `configure && make && make install`
    ConfigureMake,
}

impl BuildStrategy {
    /// Pick the strategy for a configuration. Total over compiler families.
    pub fn select(config: &BuildConfiguration) -> Self {
        match config.compiler_family() {
            CompilerFamily::Msvc => BuildStrategy::ProjectFile,
            CompilerFamily::Other(_) => BuildStrategy::ConfigureMake,
        }
    }

    /// The implementation for this variant.
    pub fn implementation(&self) -> &'static dyn Strategy {
        match self {
            BuildStrategy::ProjectFile => &ProjectFileStrategy,
            BuildStrategy::ConfigureMake => &ConfigureMakeStrategy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStrategy::ProjectFile => "project-file",
            BuildStrategy::ConfigureMake => "configure-make",
        }
    }
}

impl fmt::Display for BuildStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a strategy leaves its output for the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDirs {
    /// Root of the public headers; paths below it are preserved
    pub header_root: PathBuf,
    /// Directory searched (recursively) for libraries and DLLs
    pub library_root: PathBuf,
}

/// One way of building the library.
///
/// Implementations are stateless: everything comes in through the context
/// and the configuration.
pub trait Strategy: Send + Sync {
    /// The variant this implements.
    fn kind(&self) -> BuildStrategy;

    /// Toolchain phases to run, in order. Pure.
    fn phases(
        &self,
        ctx: &BuildContext,
        config: &BuildConfiguration,
    ) -> Result<Vec<Phase>, ConfigurationError>;

    /// Where the toolchain output ends up. Pure.
    fn output_dirs(
        &self,
        ctx: &BuildContext,
        config: &BuildConfiguration,
    ) -> Result<OutputDirs, ConfigurationError>;

    /// Patch the source tree before the toolchain runs.
    fn prepare(&self, _ctx: &BuildContext, _config: &BuildConfiguration) -> Result<(), BuildFailure> {
        Ok(())
    }
}
