//! `xzpack plan` command

use anyhow::Result;

use super::{build_context, resolve_configuration, GlobalArgs};
use crate::cli::PlanArgs;
use xzpack::builder::BuildPlan;
use xzpack::util::Shell;
use xzpack::PackageError;

pub fn execute(args: PlanArgs, global: &GlobalArgs) -> Result<()> {
    let shell = Shell::from_flags(global.verbose, global.no_color, true);

    let config = resolve_configuration(&args.settings)?;
    let ctx = build_context(&args.work_dir, args.jobs, None)?;
    let plan = BuildPlan::new(&ctx, &config).map_err(PackageError::from)?;

    shell.json(&plan)
}
