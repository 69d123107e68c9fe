//! Visual Studio solution strategy (Windows / MSVC).
//!
//! The source tree ships `windows/xz_win.sln` with two projects:
//! `liblzma` (static library) and `liblzma_dll` (DLL plus import library).
//! MSBuild writes each to `windows/<Configuration>/<Platform>/<project>`.

use crate::builder::command::{CommandSpec, Phase};
use crate::builder::context::BuildContext;
use crate::builder::strategy::{BuildStrategy, OutputDirs, Strategy};
use crate::core::errors::{BuildFailure, ConfigurationError};
use crate::core::settings::{Arch, BuildConfiguration, Linkage};
use crate::util::fs::replace_in_file;

const STATIC_TARGET: &str = "liblzma";
const SHARED_TARGET: &str = "liblzma_dll";

/// Dynamic CRT tokens and their static equivalents, debug first.
///
/// The solution only exposes the runtime through the project descriptor,
/// so it is patched textually.
const RUNTIME_REWRITES: [(&str, &str); 2] = [
    (
        "<RuntimeLibrary>MultiThreadedDebugDLL</RuntimeLibrary>",
        "<RuntimeLibrary>MultiThreadedDebug</RuntimeLibrary>",
    ),
    (
        "<RuntimeLibrary>MultiThreadedDLL</RuntimeLibrary>",
        "<RuntimeLibrary>MultiThreaded</RuntimeLibrary>",
    ),
];

/// Project name for a linkage.
pub fn target_name(linkage: Linkage) -> &'static str {
    match linkage {
        Linkage::Static => STATIC_TARGET,
        Linkage::Shared => SHARED_TARGET,
    }
}

/// Map an architecture to the solution's platform identifier.
///
/// The solution says `Win32`, not `x86`, so the canonical name never works.
pub fn platform_token(arch: &Arch) -> Result<&'static str, ConfigurationError> {
    match arch {
        Arch::X86 => Ok("Win32"),
        Arch::X86_64 => Ok("x64"),
        Arch::Other(name) => Err(ConfigurationError::Unsupported {
            field: "arch".to_string(),
            reason: format!(
                "the Visual Studio solution has no platform for `{}` (supported: x86, x86_64)",
                name
            ),
        }),
    }
}

/// MSBuild on `xz_win.sln`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFileStrategy;

impl ProjectFileStrategy {
    /// Build the MSBuild invocation.
    pub fn build_command(
        &self,
        ctx: &BuildContext,
        config: &BuildConfiguration,
    ) -> Result<CommandSpec, ConfigurationError> {
        let platform = platform_token(config.arch())?;
        let target = target_name(config.linkage());

        let mut cmd = CommandSpec::new(ctx.msbuild())
            .arg(&ctx.source.solution)
            .arg("/nologo")
            .arg(format!("/target:{}", target))
            .arg(format!("/p:Configuration={}", config.build_type()))
            .arg(format!("/p:Platform={}", platform))
            .cwd(ctx.windows_dir());

        cmd = match ctx.jobs {
            Some(jobs) => cmd.arg(format!("/m:{}", jobs)),
            None => cmd.arg("/m"),
        };

        Ok(cmd)
    }
}

impl Strategy for ProjectFileStrategy {
    fn kind(&self) -> BuildStrategy {
        BuildStrategy::ProjectFile
    }

    fn phases(
        &self,
        ctx: &BuildContext,
        config: &BuildConfiguration,
    ) -> Result<Vec<Phase>, ConfigurationError> {
        Ok(vec![Phase::new("build", self.build_command(ctx, config)?)])
    }

    fn output_dirs(
        &self,
        ctx: &BuildContext,
        config: &BuildConfiguration,
    ) -> Result<OutputDirs, ConfigurationError> {
        let platform = platform_token(config.arch())?;
        Ok(OutputDirs {
            header_root: ctx.source_root().join(&ctx.source.api_headers),
            library_root: ctx
                .windows_dir()
                .join(config.build_type().as_str())
                .join(platform)
                .join(target_name(config.linkage())),
        })
    }

    /// Force the static CRT into the selected project when a runtime is configured.
    fn prepare(&self, ctx: &BuildContext, config: &BuildConfiguration) -> Result<(), BuildFailure> {
        let Some(runtime) = config.compiler_runtime() else {
            return Ok(());
        };

        let project = ctx
            .windows_dir()
            .join(format!("{}.vcxproj", target_name(config.linkage())));
        if runtime.is_dynamic() {
            tracing::warn!(
                "runtime {} requested, {} is built against the static CRT",
                runtime,
                target_name(config.linkage())
            );
        }
        tracing::info!("Patching {}", project.display());

        for (from, to) in RUNTIME_REWRITES {
            let replaced = replace_in_file(&project, from, to).map_err(|e| BuildFailure {
                command: format!("patch {}", project.display()),
                status: None,
                detail: format!("{:#}", e),
            })?;
            if !replaced {
                tracing::warn!("{} not found in {}", from, project.display());
            }
        }

        Ok(())
    }
}
