//! Implementation of `xzpack build`.
//!
//! One run: plan, patch the source tree, drive the toolchain, collect the
//! output into a fresh package directory, then describe it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::{ArtifactCollector, BuildContext, BuildExecutor, BuildPlan, ProcessRunner};
use crate::core::errors::{ConfigurationError, PackageError, PackagingError};
use crate::core::layout::{ArtifactSet, PackageLayout};
use crate::core::package_info::PackageInfo;
use crate::core::settings::BuildConfiguration;
use crate::util::fs::{is_inside, normalize_path};

/// Options for a packaging run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Package root to (re)create
    pub package_dir: PathBuf,

    /// Stream toolchain output instead of showing a progress bar
    pub verbose: bool,
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub plan: BuildPlan,
    pub layout: PackageLayout,
    pub artifacts: ArtifactSet,
    pub info: PackageInfo,
    /// Whether the license file was found and copied
    pub license_copied: bool,
}

/// Build and package liblzma for one configuration.
///
/// Fails at the first error. After a packaging error the package directory
/// is removed, so a partially filled package is never left behind.
pub fn package(
    ctx: &BuildContext,
    config: &BuildConfiguration,
    runner: &dyn ProcessRunner,
    opts: &PackageOptions,
) -> Result<PackageOutcome, PackageError> {
    tracing::info!("Packaging liblzma for {}", config);

    let plan = BuildPlan::new(ctx, config)?;
    check_package_dir(ctx, &opts.package_dir)?;
    tracing::info!("Using {} strategy", plan.strategy);

    plan.implementation().prepare(ctx, config)?;

    BuildExecutor::new(runner)
        .timeout(ctx.timeout)
        .verbose(opts.verbose)
        .execute(&plan.phases)?;

    let layout = PackageLayout::new(&opts.package_dir);
    reset(&layout)?;

    let collector = ArtifactCollector::new(config, &layout);
    let collected = collector
        .collect(&plan.output_dirs)
        .and_then(|artifacts| {
            let license_copied = collector.copy_license(&ctx.license_file())?;
            Ok((artifacts, license_copied))
        });

    let (artifacts, license_copied) = match collected {
        Ok(result) => result,
        Err(err) => {
            if let Err(e) = fs::remove_dir_all(layout.root()) {
                tracing::debug!("failed to clean {}: {}", layout.root().display(), e);
            }
            return Err(err.into());
        }
    };

    let info = PackageInfo::emit(config, &artifacts);
    tracing::info!(
        "Packaged {} into {}",
        info.libs.join(", "),
        layout.root().display()
    );

    Ok(PackageOutcome {
        plan,
        layout,
        artifacts,
        info,
        license_copied,
    })
}

/// The package directory is deleted before collection, so it must not be or
/// contain anything the run reads from.
fn check_package_dir(ctx: &BuildContext, package_dir: &Path) -> Result<(), ConfigurationError> {
    let package = normalize_path(package_dir);
    let protected = [
        ("working directory", ctx.work_dir.clone()),
        ("source tree", ctx.source_root()),
        ("install prefix", ctx.install_dir()),
    ];

    for (what, dir) in protected {
        if is_inside(&normalize_path(&dir), &package) {
            return Err(ConfigurationError::Path {
                field: "package_dir".to_string(),
                path: package_dir.to_path_buf(),
                reason: format!("would delete the {} {}", what, dir.display()),
            });
        }
    }
    Ok(())
}

/// Start from an empty package directory.
fn reset(layout: &PackageLayout) -> Result<(), PackagingError> {
    let root = layout.root();
    if root.exists() {
        fs::remove_dir_all(root).map_err(|source| PackagingError::Remove {
            path: root.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
