//! Autotools strategy: `configure && make && make install`.

use std::path::Path;

use crate::builder::command::{CommandSpec, Phase};
use crate::builder::context::BuildContext;
use crate::builder::strategy::{BuildStrategy, OutputDirs, Strategy};
use crate::builder::util::gnu_triplet;
use crate::core::errors::{BuildFailure, ConfigurationError};
use crate::core::settings::{Arch, BuildConfiguration, Linkage};
use crate::util::fs::remove_dir_all_if_exists;

/// Components of XZ Utils that are never packaged.
const DISABLED_COMPONENTS: &[&str] = &[
    "--disable-xz",
    "--disable-xzdec",
    "--disable-lzmadec",
    "--disable-lzmainfo",
    "--disable-scripts",
    "--disable-doc",
];

/// Whether configure may be told about build and host machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostDetection {
    Auto,
    /// Apple targets: `--build`/`--host`/`--target` are never passed.
    Suppressed,
}

impl HostDetection {
    pub fn for_config(config: &BuildConfiguration) -> Self {
        if config.os().is_apple() {
            HostDetection::Suppressed
        } else {
            HostDetection::Auto
        }
    }
}

/// Triplet of the machine running the build, if it is one we can name.
pub fn build_machine_triplet() -> Option<String> {
    let os = match std::env::consts::OS {
        "linux" => "Linux",
        "android" => "Android",
        "macos" => "Macos",
        "freebsd" => "FreeBSD",
        _ => return None,
    };
    gnu_triplet(os, std::env::consts::ARCH)
}

/// Arguments for `configure`, in order.
///
/// `build_triplet` describes the machine running the build; `--build` and
/// `--host` are only added when the target differs from it.
pub fn configure_args(
    config: &BuildConfiguration,
    install_dir: &Path,
    build_triplet: Option<&str>,
) -> Vec<String> {
    let mut args: Vec<String> = DISABLED_COMPONENTS.iter().map(|s| s.to_string()).collect();
    args.push(format!("--prefix={}", install_dir.display()));

    if config.position_independent_code() == Some(true) {
        args.push("--with-pic".to_string());
    }

    match config.linkage() {
        Linkage::Shared => {
            args.push("--disable-static".to_string());
            args.push("--enable-shared".to_string());
        }
        Linkage::Static => {
            args.push("--enable-static".to_string());
            args.push("--disable-shared".to_string());
        }
    }

    if config.build_type().is_debug() {
        args.push("--enable-debug".to_string());
    }

    if HostDetection::for_config(config) == HostDetection::Auto {
        let host = gnu_triplet(config.os().as_str(), config.arch().as_str());
        if let (Some(build), Some(host)) = (build_triplet, host) {
            if build != host {
                args.push(format!("--build={}", build));
                args.push(format!("--host={}", host));
            }
        }
    }

    args
}

/// `-m32`/`-m64` for non-Apple x86 targets.
fn arch_flag(config: &BuildConfiguration) -> Option<&'static str> {
    if config.os().is_apple() {
        return None;
    }
    match config.arch() {
        Arch::X86 => Some("-m32"),
        Arch::X86_64 => Some("-m64"),
        Arch::Other(_) => None,
    }
}

/// Compiler flags selected by the build type.
///
/// An exported `CFLAGS` replaces autoconf's default `-g -O2`, so the
/// optimization level has to be set here.
fn build_type_flags(config: &BuildConfiguration) -> Vec<&'static str> {
    if config.build_type().is_debug() {
        return vec!["-g"];
    }

    let mut flags = vec!["-O3"];
    if config.compiler_family().as_str().eq_ignore_ascii_case("gcc") {
        flags.push("-s");
    }
    flags.push("-DNDEBUG");
    flags
}

/// Environment shared by every phase.
pub fn build_env(ctx: &BuildContext, config: &BuildConfiguration) -> Vec<(String, String)> {
    let mut env = Vec::new();
    if let Some(ref cc) = ctx.toolchain.cc {
        env.push(("CC".to_string(), cc.display().to_string()));
    }
    if let Some(ref ar) = ctx.toolchain.ar {
        env.push(("AR".to_string(), ar.display().to_string()));
    }

    let arch = arch_flag(config);

    let mut cflags: Vec<String> = arch
        .iter()
        .copied()
        .chain(build_type_flags(config))
        .map(str::to_string)
        .collect();
    cflags.extend(ctx.toolchain.cflags.iter().cloned());
    env.push(("CFLAGS".to_string(), cflags.join(" ")));

    let mut ldflags: Vec<String> = arch.iter().map(|f| f.to_string()).collect();
    ldflags.extend(ctx.toolchain.ldflags.iter().cloned());
    if !ldflags.is_empty() {
        env.push(("LDFLAGS".to_string(), ldflags.join(" ")));
    }

    env
}

/// configure/make on the unpacked source tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigureMakeStrategy;

impl Strategy for ConfigureMakeStrategy {
    fn kind(&self) -> BuildStrategy {
        BuildStrategy::ConfigureMake
    }

    fn phases(
        &self,
        ctx: &BuildContext,
        config: &BuildConfiguration,
    ) -> Result<Vec<Phase>, ConfigurationError> {
        let source_root = ctx.source_root();
        let env = build_env(ctx, config);
        let make = ctx.make();
        let build_triplet = build_machine_triplet();

        let configure = CommandSpec::new(source_root.join("configure"))
            .args(configure_args(config, &ctx.install_dir(), build_triplet.as_deref()))
            .envs(env.clone())
            .cwd(&source_root);

        let mut build = CommandSpec::new(&make).envs(env.clone()).cwd(&source_root);
        if let Some(jobs) = ctx.jobs {
            build = build.arg(format!("-j{}", jobs));
        }

        let install = CommandSpec::new(&make)
            .arg("install")
            .envs(env)
            .cwd(&source_root);

        Ok(vec![
            Phase::new("configure", configure),
            Phase::new("build", build),
            Phase::new("install", install),
        ])
    }

    fn output_dirs(
        &self,
        ctx: &BuildContext,
        _config: &BuildConfiguration,
    ) -> Result<OutputDirs, ConfigurationError> {
        let install = ctx.install_dir();
        Ok(OutputDirs {
            header_root: install.join("include"),
            library_root: install.join("lib"),
        })
    }

    /// Clear the install prefix so a previous configuration cannot leak in.
    fn prepare(&self, ctx: &BuildContext, _config: &BuildConfiguration) -> Result<(), BuildFailure> {
        let install = ctx.install_dir();
        if let Err(err) = ctx.source.validate() {
            return Err(BuildFailure {
                command: format!("clean {}", install.display()),
                status: None,
                detail: err.to_string(),
            });
        }
        remove_dir_all_if_exists(&install).map_err(|e| BuildFailure {
            command: format!("clean {}", install.display()),
            status: None,
            detail: format!("{:#}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{configuration, linux_static_release, SourceTreeFixture};
    use std::path::PathBuf;

    fn env_value<'a>(env: &'a [(String, String)], key: &str) -> Option<&'a str> {
        env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_static_linux_release_args() {
        let args = configure_args(
            &linux_static_release(),
            Path::new("/work/lzma-install"),
            Some("x86_64-linux-gnu"),
        );

        assert_eq!(
            args,
            vec![
                "--disable-xz",
                "--disable-xzdec",
                "--disable-lzmadec",
                "--disable-lzmainfo",
                "--disable-scripts",
                "--disable-doc",
                "--prefix=/work/lzma-install",
                "--with-pic",
                "--enable-static",
                "--disable-shared",
            ]
        );
    }

    #[test]
    fn test_linkage_flags_are_disjoint() {
        for shared in [false, true] {
            let config = configuration(&format!(
                r#"
[settings]
os = "Linux"
arch = "x86_64"
compiler = "gcc"
build_type = "Release"

[options]
shared = {}
"#,
                shared
            ));
            let args = configure_args(&config, Path::new("/p"), None);

            let enabled = ["--enable-static", "--enable-shared"]
                .iter()
                .filter(|f| args.contains(&f.to_string()))
                .count();
            assert_eq!(enabled, 1);

            if shared {
                assert!(args.contains(&"--disable-static".to_string()));
                assert!(!args.contains(&"--disable-shared".to_string()));
            } else {
                assert!(args.contains(&"--disable-shared".to_string()));
                assert!(!args.contains(&"--disable-static".to_string()));
            }
        }
    }

    #[test]
    fn test_debug_and_no_pic() {
        let config = configuration(
            r#"
[settings]
os = "Linux"
arch = "x86_64"
compiler = "clang"
build_type = "Debug"

[options]
fPIC = false
"#,
        );
        let args = configure_args(&config, Path::new("/p"), None);
        assert!(args.contains(&"--enable-debug".to_string()));
        assert!(!args.contains(&"--with-pic".to_string()));
    }

    #[test]
    fn test_cross_build_adds_build_and_host() {
        let config = configuration(
            r#"
[settings]
os = "Linux"
arch = "x86"
compiler = "gcc"
build_type = "Release"
"#,
        );
        let args = configure_args(&config, Path::new("/p"), Some("x86_64-linux-gnu"));
        assert!(args.contains(&"--build=x86_64-linux-gnu".to_string()));
        assert!(args.contains(&"--host=i686-linux-gnu".to_string()));
    }

    #[test]
    fn test_lowercase_os_still_gets_host_triplet() {
        let config = configuration(
            r#"
[settings]
os = "freebsd"
arch = "x86_64"
compiler = "clang"
build_type = "Release"
"#,
        );
        let args = configure_args(&config, Path::new("/p"), Some("x86_64-linux-gnu"));
        assert!(args.contains(&"--host=x86_64-unknown-freebsd".to_string()));
    }

    #[test]
    fn test_apple_never_passes_host_flags() {
        for os in ["Macos", "iOS", "watchOS", "tvOS"] {
            let config = configuration(&format!(
                r#"
[settings]
os = "{}"
arch = "x86"
compiler = "apple-clang"
build_type = "Release"
"#,
                os
            ));
            assert_eq!(
                HostDetection::for_config(&config),
                HostDetection::Suppressed,
                "{}",
                os
            );

            let args = configure_args(&config, Path::new("/p"), Some("x86_64-linux-gnu"));
            assert!(
                !args.iter().any(|a| a.starts_with("--build")
                    || a.starts_with("--host")
                    || a.starts_with("--target")),
                "{}: {:?}",
                os,
                args
            );
        }
    }

    #[test]
    fn test_phases_share_cwd_and_env() {
        let fixture = SourceTreeFixture::new();
        let mut ctx = fixture.context();
        ctx.jobs = Some(3);
        ctx.toolchain.make = Some(PathBuf::from("make"));
        ctx.toolchain.cc = Some(PathBuf::from("gcc-12"));

        let phases = ConfigureMakeStrategy
            .phases(&ctx, &linux_static_release())
            .unwrap();
        let names: Vec<_> = phases.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["configure", "build", "install"]);

        assert_eq!(
            phases[0].command.program,
            fixture.source_root().join("configure")
        );
        assert_eq!(phases[1].command.args, vec!["-j3"]);
        assert_eq!(phases[2].command.args, vec!["install"]);

        for phase in &phases {
            assert_eq!(phase.command.cwd, Some(fixture.source_root()));
            assert_eq!(env_value(&phase.command.env, "CC"), Some("gcc-12"));
            assert_eq!(env_value(&phase.command.env, "CFLAGS"), Some("-m64 -O3 -s -DNDEBUG"));
            assert_eq!(env_value(&phase.command.env, "LDFLAGS"), Some("-m64"));
        }
    }

    #[test]
    fn test_apple_env_has_no_arch_flag() {
        let fixture = SourceTreeFixture::new();
        let mut ctx = fixture.context();
        ctx.toolchain.cflags = vec!["-mmacosx-version-min=10.9".to_string()];
        let config = configuration(
            r#"
[settings]
os = "Macos"
arch = "x86_64"
compiler = "apple-clang"
build_type = "Debug"
"#,
        );

        let env = build_env(&ctx, &config);
        assert_eq!(
            env_value(&env, "CFLAGS"),
            Some("-g -mmacosx-version-min=10.9")
        );
        assert_eq!(env_value(&env, "LDFLAGS"), None);
    }

    #[test]
    fn test_release_env_sets_optimization_level() {
        let fixture = SourceTreeFixture::new();
        let config = configuration(
            r#"
[settings]
os = "Linux"
arch = "x86"
compiler = "clang"
build_type = "Release"
"#,
        );

        let env = build_env(&fixture.context(), &config);
        assert_eq!(env_value(&env, "CFLAGS"), Some("-m32 -O3 -DNDEBUG"));
    }

    #[test]
    fn test_prepare_clears_stale_install() {
        let fixture = SourceTreeFixture::new();
        fixture.install_output(&["liblzma.so"]);

        ConfigureMakeStrategy
            .prepare(&fixture.context(), &linux_static_release())
            .unwrap();
        assert!(!fixture.path().join("lzma-install").exists());
    }

    #[test]
    fn test_prepare_refuses_to_clear_work_dir() {
        let fixture = SourceTreeFixture::new();
        let mut ctx = fixture.context();
        ctx.source.install_dir = String::new();

        let failure = ConfigureMakeStrategy
            .prepare(&ctx, &linux_static_release())
            .unwrap_err();
        assert_eq!(failure.status, None);
        assert!(failure.detail.contains("source.install_dir"));
        assert!(fixture.source_root().join("COPYING").exists());
    }

    #[test]
    fn test_output_dirs_under_install_prefix() {
        let fixture = SourceTreeFixture::new();
        let dirs = ConfigureMakeStrategy
            .output_dirs(&fixture.context(), &linux_static_release())
            .unwrap();
        assert_eq!(dirs.header_root, fixture.path().join("lzma-install/include"));
        assert_eq!(dirs.library_root, fixture.path().join("lzma-install/lib"));
    }
}
