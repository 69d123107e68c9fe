//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use xzpack::core::settings::{RawOptions, RawSettings, RawSettingsTable};

/// xzpack - build and package liblzma from the XZ Utils sources
#[derive(Parser)]
#[command(name = "xzpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build liblzma and collect it into a package
    Build(BuildArgs),

    /// Print the build plan as JSON without running anything
    Plan(PlanArgs),

    /// Print the metadata of an existing package
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// The settings matrix, from a profile file and/or flags.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Profile file with [settings] and [options] tables
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Target operating system (Windows, Linux, Macos, iOS, Android, ...)
    #[arg(long)]
    pub os: Option<String>,

    /// Target architecture (x86, x86_64)
    #[arg(long)]
    pub arch: Option<String>,

    /// Compiler ("Visual Studio", gcc, clang, apple-clang)
    #[arg(long)]
    pub compiler: Option<String>,

    /// MSVC runtime (MT, MTd, MD, MDd)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Build type (Debug, Release)
    #[arg(long)]
    pub build_type: Option<String>,

    /// Build a shared library
    #[arg(long, conflicts_with = "static_")]
    pub shared: bool,

    /// Build a static library
    #[arg(long = "static", id = "static_")]
    pub static_: bool,

    /// Build position-independent code
    #[arg(long, conflicts_with = "no_fpic")]
    pub fpic: bool,

    /// Do not build position-independent code
    #[arg(long)]
    pub no_fpic: bool,
}

impl SettingsArgs {
    /// Whether anything at all was given.
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.flags().settings == RawSettingsTable::default()
    }

    /// Settings given as flags. Unset flags stay `None`.
    pub fn flags(&self) -> RawSettings {
        RawSettings {
            settings: RawSettingsTable {
                os: self.os.clone(),
                arch: self.arch.clone(),
                compiler: self.compiler.clone(),
                compiler_runtime: self.runtime.clone(),
                compiler_libcxx: None,
                build_type: self.build_type.clone(),
            },
            options: RawOptions {
                shared: flag_pair(self.shared, self.static_),
                fpic: flag_pair(self.fpic, self.no_fpic),
            },
        }
    }
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Where the sources live and where the package goes.
#[derive(Args, Debug)]
pub struct DirArgs {
    /// Working directory containing the unpacked xz-5.2.3 tree
    #[arg(long, short = 'C', default_value = ".")]
    pub work_dir: PathBuf,

    /// Package output directory (defaults to <work-dir>/package)
    #[arg(long, short = 'o')]
    pub package_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(flatten)]
    pub dirs: DirArgs,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Kill a toolchain process after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print package metadata as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Working directory containing the unpacked xz-5.2.3 tree
    #[arg(long, short = 'C', default_value = ".")]
    pub work_dir: PathBuf,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Package directory to describe
    #[arg(default_value = "package")]
    pub package_dir: PathBuf,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
