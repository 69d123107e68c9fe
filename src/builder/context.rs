//! Build context - directories, tools and limits for one packaging run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::layout::SourceLayout;
use crate::util::config::{Config, ToolchainSettings};
use crate::util::process::{find_make, find_msbuild};

/// Everything a strategy needs besides the configuration itself.
///
/// The working and installation directories belong to exactly one run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Working directory holding the unpacked source tree (absolute)
    pub work_dir: PathBuf,

    /// Where things live inside the source tree
    pub source: SourceLayout,

    /// Toolchain overrides
    pub toolchain: ToolchainSettings,

    /// Parallel job count
    pub jobs: Option<usize>,

    /// Per-process timeout, None waits forever
    pub timeout: Option<Duration>,
}

impl BuildContext {
    /// Create a build context with default layout and tools.
    pub fn new(work_dir: impl AsRef<Path>) -> Result<Self> {
        let work_dir = work_dir.as_ref();
        let work_dir = std::path::absolute(work_dir).with_context(|| {
            format!("failed to resolve working directory: {}", work_dir.display())
        })?;

        Ok(BuildContext {
            work_dir,
            source: SourceLayout::default(),
            toolchain: ToolchainSettings::default(),
            jobs: None,
            timeout: None,
        })
    }

    /// Apply tool configuration.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.source = config.source_layout();
        self.toolchain = config.toolchain.clone();
        self.jobs = config.build.jobs;
        self.timeout = config.timeout();
        self
    }

    /// Set job count.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        if jobs.is_some() {
            self.jobs = jobs;
        }
        self
    }

    /// Set process timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        if timeout.is_some() {
            self.timeout = timeout;
        }
        self
    }

    /// Root of the unpacked source tree.
    pub fn source_root(&self) -> PathBuf {
        self.work_dir.join(&self.source.root)
    }

    /// Directory holding the Visual Studio solution.
    pub fn windows_dir(&self) -> PathBuf {
        self.source_root().join(&self.source.windows_dir)
    }

    /// Installation prefix for configure/make.
    pub fn install_dir(&self) -> PathBuf {
        self.work_dir.join(&self.source.install_dir)
    }

    /// License file inside the source tree.
    pub fn license_file(&self) -> PathBuf {
        self.source_root().join(&self.source.license)
    }

    /// MSBuild: configured path, then PATH, then the bare name.
    pub fn msbuild(&self) -> PathBuf {
        self.toolchain
            .msbuild
            .clone()
            .or_else(find_msbuild)
            .unwrap_or_else(|| PathBuf::from("msbuild"))
    }

    /// make: configured path, then PATH, then the bare name.
    pub fn make(&self) -> PathBuf {
        self.toolchain
            .make
            .clone()
            .or_else(find_make)
            .unwrap_or_else(|| PathBuf::from("make"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new(tmp.path()).unwrap();

        assert!(ctx.work_dir.is_absolute());
        assert_eq!(ctx.source_root(), ctx.work_dir.join("xz-5.2.3"));
        assert_eq!(ctx.windows_dir(), ctx.work_dir.join("xz-5.2.3/windows"));
        assert_eq!(ctx.install_dir(), ctx.work_dir.join("lzma-install"));
        assert_eq!(ctx.license_file(), ctx.work_dir.join("xz-5.2.3/COPYING"));
    }

    #[test]
    fn test_relative_work_dir_becomes_absolute() {
        let ctx = BuildContext::new("some/relative/dir").unwrap();
        assert!(ctx.work_dir.is_absolute());
        assert!(ctx.install_dir().is_absolute());
    }

    #[test]
    fn test_config_and_cli_overrides() {
        let mut config = Config::default();
        config.build.jobs = Some(2);
        config.build.timeout_secs = Some(60);
        config.toolchain.make = Some(PathBuf::from("/opt/bin/gmake"));

        let ctx = BuildContext::new("/work")
            .unwrap()
            .with_config(&config)
            .with_jobs(Some(8))
            .with_timeout(None);

        assert_eq!(ctx.jobs, Some(8));
        assert_eq!(ctx.timeout, Some(Duration::from_secs(60)));
        assert_eq!(ctx.make(), PathBuf::from("/opt/bin/gmake"));
    }
}
