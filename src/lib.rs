//! xzpack - builds and packages liblzma (XZ Utils 5.2.3)
//!
//! This crate turns a build configuration (os, arch, compiler, runtime,
//! build type, linkage) into a normalized package: headers, libraries,
//! binaries and the metadata a consumer needs to link against them.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for xzpack unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock process runner and fake source trees.
#[cfg(test)]
pub mod test_support;

pub use core::{
    BuildConfiguration, BuildFailure, ConfigurationError, PackageError, PackageInfo,
    PackagingError, RawSettings,
};
pub use util::config::Config;
