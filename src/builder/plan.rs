//! Build plan generation.
//!
//! A BuildPlan describes everything that will happen for one configuration:
//! the selected strategy, the toolchain phases in execution order, and where
//! the collector will look for output. Planning never touches the filesystem
//! or spawns a process, so a plan can be printed with `xzpack plan`.

use serde::Serialize;

use crate::builder::command::Phase;
use crate::builder::context::BuildContext;
use crate::builder::strategy::{BuildStrategy, OutputDirs, Strategy};
use crate::core::errors::ConfigurationError;
use crate::core::settings::{BuildConfiguration, RawSettings};

/// A complete build plan.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Strategy that produced the phases
    pub strategy: BuildStrategy,

    /// Normalized configuration, in profile form
    pub configuration: RawSettings,

    /// Toolchain phases in execution order
    pub phases: Vec<Phase>,

    /// Where output is collected from
    pub output_dirs: OutputDirs,
}

impl BuildPlan {
    /// Plan a build of `config` in `ctx`.
    pub fn new(ctx: &BuildContext, config: &BuildConfiguration) -> Result<Self, ConfigurationError> {
        ctx.source.validate()?;

        let strategy = BuildStrategy::select(config);
        let imp = strategy.implementation();

        let plan = BuildPlan {
            strategy,
            configuration: config.to_raw(),
            phases: imp.phases(ctx, config)?,
            output_dirs: imp.output_dirs(ctx, config)?,
        };

        tracing::debug!(
            "planned {} build with {} phase(s)",
            plan.strategy,
            plan.phases.len()
        );
        Ok(plan)
    }

    /// The strategy implementation behind this plan.
    pub fn implementation(&self) -> &'static dyn Strategy {
        self.strategy.implementation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{linux_static_release, windows_shared_debug, SourceTreeFixture};

    #[test]
    fn test_plan_rejects_install_dir_outside_work_dir() {
        let fixture = SourceTreeFixture::new();
        let mut ctx = fixture.context();
        ctx.source.install_dir = String::new();

        let err = BuildPlan::new(&ctx, &linux_static_release()).unwrap_err();
        assert!(matches!(err, ConfigurationError::Path { .. }));
        assert_eq!(err.field(), "source.install_dir");
    }

    #[test]
    fn test_plan_linux() {
        let fixture = SourceTreeFixture::new();
        let plan = BuildPlan::new(&fixture.context(), &linux_static_release()).unwrap();

        assert_eq!(plan.strategy, BuildStrategy::ConfigureMake);
        assert_eq!(plan.phases.len(), 3);
        assert_eq!(plan.configuration.options.fpic, Some(true));
    }

    #[test]
    fn test_plan_windows() {
        let fixture = SourceTreeFixture::new();
        let plan = BuildPlan::new(&fixture.context(), &windows_shared_debug()).unwrap();

        assert_eq!(plan.strategy, BuildStrategy::ProjectFile);
        assert_eq!(plan.phases.len(), 1);
        assert_eq!(plan.configuration.options.fpic, None);
    }

    #[test]
    fn test_plan_serializes() {
        let fixture = SourceTreeFixture::new();
        let plan = BuildPlan::new(&fixture.context(), &windows_shared_debug()).unwrap();

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["strategy"], "project-file");
        assert_eq!(json["phases"][0]["name"], "build");
        assert_eq!(json["configuration"]["settings"]["compiler.runtime"], "MDd");
    }
}
