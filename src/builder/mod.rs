//! Toolchain drivers for liblzma.
//!
//! Strategy selection, command planning, process execution and collection
//! of the toolchain output into a package.

pub mod collect;
pub mod command;
pub mod configure_make;
pub mod context;
pub mod executor;
pub mod plan;
pub mod project_file;
pub mod strategy;
pub mod util;

pub use collect::ArtifactCollector;
pub use command::{CommandSpec, Phase};
pub use context::BuildContext;
pub use executor::{BuildExecutor, ProcessRunner, SystemRunner};
pub use plan::BuildPlan;
pub use strategy::{BuildStrategy, OutputDirs, Strategy};
