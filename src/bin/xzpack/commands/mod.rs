//! Command implementations

pub mod build;
pub mod completions;
pub mod info;
pub mod plan;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::cli::SettingsArgs;
use xzpack::builder::BuildContext;
use xzpack::core::settings::{BuildConfiguration, RawSettings};
use xzpack::util::config::{global_config_path, load_config, load_profile, project_config_path};
use xzpack::PackageError;

/// Flags shared by every command.
pub struct GlobalArgs {
    pub verbose: bool,
    pub no_color: bool,
}

/// Resolve the build configuration: profile first, flags on top.
///
/// With neither a profile nor flags this fails on the first required field.
pub fn resolve_configuration(args: &SettingsArgs) -> Result<BuildConfiguration> {
    if args.is_empty() {
        tracing::debug!("no profile or settings flags given");
    }

    let mut raw = match args.profile {
        Some(ref path) => load_profile(path)?,
        None => RawSettings::default(),
    };
    raw.merge(args.flags());

    let config = BuildConfiguration::from_raw(&raw).map_err(PackageError::from)?;
    tracing::debug!("configuration: {}", config);
    Ok(config)
}

/// Build context for `work_dir`, with global and project tool config applied.
pub fn build_context(
    work_dir: &Path,
    jobs: Option<usize>,
    timeout_secs: Option<u64>,
) -> Result<BuildContext> {
    let global = global_config_path();
    let config = load_config(global.as_deref(), &project_config_path(work_dir));

    Ok(BuildContext::new(work_dir)?
        .with_config(&config)
        .with_jobs(jobs)
        .with_timeout(timeout_secs.map(Duration::from_secs)))
}
