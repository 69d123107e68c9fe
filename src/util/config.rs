//! Configuration file support for xzpack.
//!
//! Two tool-configuration locations are read:
//! - Global: `~/.xzpack/config.toml` - User-wide defaults
//! - Project: `.xzpack/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.
//!
//! The settings matrix itself (os, arch, compiler, ...) lives in a separate
//! profile file passed with `--profile`, see [`load_profile`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::layout::SourceLayout;
use crate::core::settings::RawSettings;

/// xzpack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Toolchain overrides
    pub toolchain: ToolchainSettings,

    /// Source tree layout; a `[source]` table replaces the defaults as a whole
    pub source: Option<SourceLayout>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Parallel jobs passed to make / msbuild (None = tool default)
    pub jobs: Option<usize>,

    /// Kill a toolchain process after this many seconds (None = never)
    pub timeout_secs: Option<u64>,
}

/// Toolchain settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Path to msbuild (default: found in PATH)
    pub msbuild: Option<PathBuf>,

    /// Path to make (default: found in PATH)
    pub make: Option<PathBuf>,

    /// C compiler exported as CC to configure
    pub cc: Option<PathBuf>,

    /// Archiver exported as AR to configure
    pub ar: Option<PathBuf>,

    /// Additional C compiler flags
    #[serde(default)]
    pub cflags: Vec<String>,

    /// Additional linker flags
    #[serde(default)]
    pub ldflags: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Build settings
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.timeout_secs.is_some() {
            self.build.timeout_secs = other.build.timeout_secs;
        }

        // Toolchain settings
        let tc = other.toolchain;
        if tc.msbuild.is_some() {
            self.toolchain.msbuild = tc.msbuild;
        }
        if tc.make.is_some() {
            self.toolchain.make = tc.make;
        }
        if tc.cc.is_some() {
            self.toolchain.cc = tc.cc;
        }
        if tc.ar.is_some() {
            self.toolchain.ar = tc.ar;
        }
        if !tc.cflags.is_empty() {
            self.toolchain.cflags = tc.cflags;
        }
        if !tc.ldflags.is_empty() {
            self.toolchain.ldflags = tc.ldflags;
        }

        if other.source.is_some() {
            self.source = other.source;
        }
    }

    /// Toolchain process timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.build.timeout_secs.map(Duration::from_secs)
    }

    /// Effective source layout.
    pub fn source_layout(&self) -> SourceLayout {
        self.source.clone().unwrap_or_default()
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.xzpack/config.toml)
/// 2. Global config (~/.xzpack/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    // Project config overrides global
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global xzpack config directory (~/.xzpack).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".xzpack"))
}

/// Get the global config path (~/.xzpack/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.xzpack/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".xzpack").join("config.toml")
}

/// Load a settings profile (`[settings]` and `[options]` tables).
///
/// Unlike tool configuration, a broken profile is an error: it decides
/// what gets built.
pub fn load_profile(path: &Path) -> Result<RawSettings> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;

    toml::from_str(&contents)
        .with_context(|| format!("failed to parse profile: {}", path.display()))
}
