//! `xzpack build` command

use anyhow::Result;

use super::{build_context, resolve_configuration, GlobalArgs};
use crate::cli::BuildArgs;
use xzpack::builder::SystemRunner;
use xzpack::ops::{package, PackageOptions};
use xzpack::util::diagnostic::suggestions;
use xzpack::util::{Diagnostic, Shell, Status};

pub fn execute(args: BuildArgs, global: &GlobalArgs) -> Result<()> {
    let shell = Shell::from_flags(global.verbose, global.no_color, args.json);

    let config = resolve_configuration(&args.settings)?;
    let ctx = build_context(&args.dirs.work_dir, args.jobs, args.timeout)?;
    let package_dir = args
        .dirs
        .package_dir
        .unwrap_or_else(|| ctx.work_dir.join("package"));

    shell.status(Status::Building, format!("liblzma 5.2.3 ({})", config));

    let opts = PackageOptions {
        package_dir,
        verbose: global.verbose,
    };
    let outcome = package(&ctx, &config, &SystemRunner, &opts)?;

    if !outcome.license_copied {
        shell.diagnostic(
            &Diagnostic::warning("license file not found, package has no license/")
                .with_location(ctx.license_file())
                .with_suggestion(suggestions::CHECK_SOURCE_LAYOUT),
        );
    }
    shell.status(
        Status::Packaged,
        format!(
            "{} header(s), {} librar(ies) into {}",
            outcome.artifacts.headers.len(),
            outcome.artifacts.libraries().count(),
            outcome.layout.root().display()
        ),
    );

    if shell.is_json() {
        shell.json(&outcome.info)?;
    } else {
        shell.status(Status::Finished, format!("libs: {}", outcome.info.libs.join(" ")));
        if !outcome.info.defines.is_empty() {
            shell.note(format!("defines: {}", outcome.info.defines.join(" ")));
        }
    }

    Ok(())
}
