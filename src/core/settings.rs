//! The settings matrix and its normalized form.
//!
//! `RawSettings` is what a caller hands in: loosely typed, every field
//! optional, spelled the way a build profile spells it. `BuildConfiguration`
//! is the validated, immutable value every other component works from.
//! All cross-field rules live in [`BuildConfiguration::from_raw`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigurationError;

/// Target operating system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Windows,
    Linux,
    Macos,
    Ios,
    WatchOs,
    TvOs,
    Android,
    Other(String),
}

impl Os {
    /// Get the OS name as spelled in a profile.
    pub fn as_str(&self) -> &str {
        match self {
            Os::Windows => "Windows",
            Os::Linux => "Linux",
            Os::Macos => "Macos",
            Os::Ios => "iOS",
            Os::WatchOs => "watchOS",
            Os::TvOs => "tvOS",
            Os::Android => "Android",
            Os::Other(name) => name,
        }
    }

    /// Check if this is one of Apple's operating systems.
    pub fn is_apple(&self) -> bool {
        matches!(self, Os::Macos | Os::Ios | Os::WatchOs | Os::TvOs)
    }
}

impl FromStr for Os {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "windows" => Os::Windows,
            "linux" => Os::Linux,
            "macos" => Os::Macos,
            "ios" => Os::Ios,
            "watchos" => Os::WatchOs,
            "tvos" => Os::TvOs,
            "android" => Os::Android,
            _ => Os::Other(s.to_string()),
        })
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Other(String),
}

impl Arch {
    pub fn as_str(&self) -> &str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Other(name) => name,
        }
    }
}

impl FromStr for Arch {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "x86" | "i386" | "i686" => Arch::X86,
            "x86_64" | "amd64" | "x64" => Arch::X86_64,
            _ => Arch::Other(s.to_string()),
        })
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler family. Only MSVC changes how the library is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompilerFamily {
    Msvc,
    /// Any gcc-compatible compiler (gcc, clang, apple-clang, ...).
    Other(String),
}

impl CompilerFamily {
    pub fn as_str(&self) -> &str {
        match self {
            CompilerFamily::Msvc => "Visual Studio",
            CompilerFamily::Other(name) => name,
        }
    }

    pub fn is_msvc(&self) -> bool {
        matches!(self, CompilerFamily::Msvc)
    }
}

impl FromStr for CompilerFamily {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "visual studio" | "msvc" => CompilerFamily::Msvc,
            _ => CompilerFamily::Other(s.to_string()),
        })
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MSVC C runtime library selection (/MT, /MTd, /MD, /MDd).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsvcRuntime {
    MultiThreaded,
    MultiThreadedDebug,
    MultiThreadedDll,
    MultiThreadedDebugDll,
}

impl MsvcRuntime {
    /// Values accepted by [`FromStr`], for error messages.
    pub const EXPECTED: &'static str =
        "MT, MTd, MD, MDd, MultiThreaded, MultiThreadedDebug, MultiThreadedDLL, MultiThreadedDebugDLL";

    /// Short spelling used in profiles.
    pub fn as_str(&self) -> &'static str {
        match self {
            MsvcRuntime::MultiThreaded => "MT",
            MsvcRuntime::MultiThreadedDebug => "MTd",
            MsvcRuntime::MultiThreadedDll => "MD",
            MsvcRuntime::MultiThreadedDebugDll => "MDd",
        }
    }

    /// Check if this runtime links the CRT dynamically.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            MsvcRuntime::MultiThreadedDll | MsvcRuntime::MultiThreadedDebugDll
        )
    }
}

impl FromStr for MsvcRuntime {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MT" | "MultiThreaded" => Ok(MsvcRuntime::MultiThreaded),
            "MTd" | "MultiThreadedDebug" => Ok(MsvcRuntime::MultiThreadedDebug),
            "MD" | "MultiThreadedDLL" => Ok(MsvcRuntime::MultiThreadedDll),
            "MDd" | "MultiThreadedDebugDLL" => Ok(MsvcRuntime::MultiThreadedDebugDll),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MsvcRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optimization/debug mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }

    pub fn is_debug(&self) -> bool {
        matches!(self, BuildType::Debug)
    }
}

impl FromStr for BuildType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            _ => Err(()),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the library is built as a static archive or a shared library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Linkage {
    Static,
    Shared,
}

impl Linkage {
    pub fn from_shared(shared: bool) -> Self {
        if shared {
            Linkage::Shared
        } else {
            Linkage::Static
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Linkage::Shared)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Linkage::Static => "static",
            Linkage::Shared => "shared",
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings as supplied by a profile file or the command line.
///
/// ```toml
/// [settings]
/// os = "Linux"
/// arch = "x86_64"
/// compiler = "gcc"
/// build_type = "Release"
///
/// [options]
/// shared = false
/// fPIC = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub settings: RawSettingsTable,
    pub options: RawOptions,
}

/// The `[settings]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSettingsTable {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub compiler: Option<String>,
    #[serde(rename = "compiler.runtime", skip_serializing_if = "Option::is_none")]
    pub compiler_runtime: Option<String>,
    /// Accepted for profile compatibility; has no effect on a C library.
    #[serde(rename = "compiler.libcxx", skip_serializing_if = "Option::is_none")]
    pub compiler_libcxx: Option<String>,
    pub build_type: Option<String>,
}

/// The `[options]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    pub shared: Option<bool>,
    #[serde(rename = "fPIC", skip_serializing_if = "Option::is_none")]
    pub fpic: Option<bool>,
}

impl RawSettings {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: RawSettings) {
        let s = other.settings;
        if s.os.is_some() {
            self.settings.os = s.os;
        }
        if s.arch.is_some() {
            self.settings.arch = s.arch;
        }
        if s.compiler.is_some() {
            self.settings.compiler = s.compiler;
        }
        if s.compiler_runtime.is_some() {
            self.settings.compiler_runtime = s.compiler_runtime;
        }
        if s.compiler_libcxx.is_some() {
            self.settings.compiler_libcxx = s.compiler_libcxx;
        }
        if s.build_type.is_some() {
            self.settings.build_type = s.build_type;
        }
        if other.options.shared.is_some() {
            self.options.shared = other.options.shared;
        }
        if other.options.fpic.is_some() {
            self.options.fpic = other.options.fpic;
        }
    }
}

const DEFAULT_SHARED: bool = false;
const DEFAULT_FPIC: bool = true;

/// A validated build configuration.
///
/// Construct with [`BuildConfiguration::from_raw`]. Fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildConfiguration {
    os: Os,
    arch: Arch,
    compiler_family: CompilerFamily,
    compiler_runtime: Option<MsvcRuntime>,
    build_type: BuildType,
    linkage: Linkage,
    position_independent_code: Option<bool>,
}

impl BuildConfiguration {
    /// Validate and normalize raw settings.
    pub fn from_raw(raw: &RawSettings) -> Result<Self, ConfigurationError> {
        let s = &raw.settings;

        let os: Os = parse_infallible(required("os", &s.os)?);
        let arch: Arch = parse_infallible(required("arch", &s.arch)?);
        let compiler_family: CompilerFamily =
            parse_infallible(required("compiler", &s.compiler)?);

        let build_type_str = required("build_type", &s.build_type)?;
        let build_type =
            build_type_str
                .parse::<BuildType>()
                .map_err(|_| ConfigurationError::Invalid {
                    field: "build_type".to_string(),
                    value: build_type_str.to_string(),
                    expected: "Debug, Release".to_string(),
                })?;

        if s.compiler_libcxx.is_some() {
            tracing::debug!("ignoring compiler.libcxx, liblzma is a C library");
        }

        match (&compiler_family, &os) {
            (CompilerFamily::Msvc, Os::Windows) => {}
            (CompilerFamily::Msvc, other) => {
                return Err(ConfigurationError::Unsupported {
                    field: "compiler".to_string(),
                    reason: format!("Visual Studio cannot target {}", other),
                });
            }
            (CompilerFamily::Other(name), Os::Windows) => {
                return Err(ConfigurationError::Unsupported {
                    field: "compiler".to_string(),
                    reason: format!("{} is not supported on Windows, use Visual Studio", name),
                });
            }
            _ => {}
        }

        let compiler_runtime = if compiler_family.is_msvc() {
            s.compiler_runtime
                .as_deref()
                .map(|value| {
                    value
                        .parse::<MsvcRuntime>()
                        .map_err(|_| ConfigurationError::Invalid {
                            field: "compiler.runtime".to_string(),
                            value: value.to_string(),
                            expected: MsvcRuntime::EXPECTED.to_string(),
                        })
                })
                .transpose()?
        } else {
            if s.compiler_runtime.is_some() {
                tracing::debug!("ignoring compiler.runtime for non-MSVC compiler");
            }
            None
        };

        // fPIC has no MSVC equivalent: drop it entirely rather than defaulting.
        let position_independent_code = if compiler_family.is_msvc() {
            None
        } else {
            Some(raw.options.fpic.unwrap_or(DEFAULT_FPIC))
        };

        Ok(BuildConfiguration {
            os,
            arch,
            compiler_family,
            compiler_runtime,
            build_type,
            linkage: Linkage::from_shared(raw.options.shared.unwrap_or(DEFAULT_SHARED)),
            position_independent_code,
        })
    }

    /// Render back to raw settings. `from_raw(&c.to_raw())` yields `c`.
    pub fn to_raw(&self) -> RawSettings {
        RawSettings {
            settings: RawSettingsTable {
                os: Some(self.os.to_string()),
                arch: Some(self.arch.to_string()),
                compiler: Some(self.compiler_family.to_string()),
                compiler_runtime: self.compiler_runtime.map(|r| r.to_string()),
                compiler_libcxx: None,
                build_type: Some(self.build_type.to_string()),
            },
            options: RawOptions {
                shared: Some(self.linkage.is_shared()),
                fpic: self.position_independent_code,
            },
        }
    }

    pub fn os(&self) -> &Os {
        &self.os
    }

    pub fn arch(&self) -> &Arch {
        &self.arch
    }

    pub fn compiler_family(&self) -> &CompilerFamily {
        &self.compiler_family
    }

    /// MSVC runtime, always `None` for other compilers.
    pub fn compiler_runtime(&self) -> Option<MsvcRuntime> {
        self.compiler_runtime
    }

    pub fn build_type(&self) -> BuildType {
        self.build_type
    }

    pub fn linkage(&self) -> Linkage {
        self.linkage
    }

    /// `None` under MSVC, where the option does not exist.
    pub fn position_independent_code(&self) -> Option<bool> {
        self.position_independent_code
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.os, self.arch, self.compiler_family, self.build_type, self.linkage
        )?;
        if let Some(runtime) = self.compiler_runtime {
            write!(f, " runtime={}", runtime)?;
        }
        if let Some(pic) = self.position_independent_code {
            write!(f, " fPIC={}", pic)?;
        }
        Ok(())
    }
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, ConfigurationError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigurationError::Missing {
            field: field.to_string(),
        }),
    }
}

fn parse_infallible<T: FromStr<Err = std::convert::Infallible>>(s: &str) -> T {
    match s.parse() {
        Ok(v) => v,
        Err(never) => match never {},
    }
}
