//! `xzpack info` command

use anyhow::Result;

use super::{resolve_configuration, GlobalArgs};
use crate::cli::InfoArgs;
use xzpack::ops::inspect;
use xzpack::util::Shell;
use xzpack::PackageError;

pub fn execute(args: InfoArgs, global: &GlobalArgs) -> Result<()> {
    let shell = Shell::from_flags(global.verbose, global.no_color, true);

    let config = resolve_configuration(&args.settings)?;
    let info = inspect(&args.package_dir, &config).map_err(PackageError::from)?;

    shell.json(&info)
}
