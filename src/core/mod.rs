//! Core data model: settings, layouts, package metadata and errors.

pub mod errors;
pub mod layout;
pub mod package_info;
pub mod settings;

pub use errors::{BuildFailure, ConfigurationError, PackageError, PackagingError};
pub use layout::{ArtifactSet, PackageLayout, SourceLayout};
pub use package_info::PackageInfo;
pub use settings::{
    Arch, BuildConfiguration, BuildType, CompilerFamily, Linkage, MsvcRuntime, Os, RawSettings,
};
