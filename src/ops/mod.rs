//! High-level operations.
//!
//! This module contains the implementation of xzpack commands.

pub mod inspect;
pub mod package;

pub use inspect::{inspect, scan_package};
pub use package::{package, PackageOptions, PackageOutcome};
