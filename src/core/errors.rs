//! Error types for configuration, toolchain and packaging failures.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// The settings matrix is invalid or describes an unsupported combination.
///
/// Always raised before any toolchain is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ConfigurationError {
    #[error("missing required setting `{field}`")]
    #[diagnostic(code(xzpack::config::missing))]
    Missing { field: String },

    #[error("invalid value `{value}` for setting `{field}`, expected one of: {expected}")]
    #[diagnostic(code(xzpack::config::invalid))]
    Invalid {
        field: String,
        value: String,
        expected: String,
    },

    #[error("unsupported setting `{field}`: {reason}")]
    #[diagnostic(code(xzpack::config::unsupported))]
    Unsupported { field: String, reason: String },

    #[error("unusable path for `{field}`: {}: {reason}", .path.display())]
    #[diagnostic(code(xzpack::config::path))]
    Path {
        field: String,
        path: PathBuf,
        reason: String,
    },
}

impl ConfigurationError {
    /// Name of the offending setting.
    pub fn field(&self) -> &str {
        match self {
            ConfigurationError::Missing { field }
            | ConfigurationError::Invalid { field, .. }
            | ConfigurationError::Unsupported { field, .. }
            | ConfigurationError::Path { field, .. } => field,
        }
    }
}

/// An external toolchain invocation did not succeed.
#[derive(Debug, Clone, Error, MietteDiagnostic)]
#[error("`{command}` {}", describe_status(.status))]
#[diagnostic(
    code(xzpack::build::failed),
    help("Run with --verbose to see the toolchain output")
)]
pub struct BuildFailure {
    /// The command line as it was run.
    pub command: String,
    /// Exit code, `None` when the process was killed or never started.
    pub status: Option<i32>,
    /// Tail of the captured stderr, or the reason the process did not run.
    pub detail: String,
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("failed with exit code {}", code),
        None => "did not exit normally".to_string(),
    }
}

/// The toolchain succeeded but its output does not match what the collector expects.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PackagingError {
    #[error("expected {what} directory not found: {}", .path.display())]
    #[diagnostic(code(xzpack::package::missing_dir))]
    MissingDirectory { what: &'static str, path: PathBuf },

    #[error("no files matching `{pattern}` under {}", .dir.display())]
    #[diagnostic(
        code(xzpack::package::no_artifacts),
        help("The build strategy and the collector disagree about the output layout")
    )]
    NoArtifacts { pattern: String, dir: PathBuf },

    #[error("failed to copy {} to {}", .from.display(), .to.display())]
    #[diagnostic(code(xzpack::package::io))]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {}", .path.display())]
    #[diagnostic(code(xzpack::package::io))]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(xzpack::package::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any failure of a packaging run.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PackageError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Build(#[from] BuildFailure),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Packaging(#[from] PackagingError),
}

impl PackageError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PackageError::Configuration(err) => {
                let mut diag = Diagnostic::error(err.to_string())
                    .with_context(format!("offending setting: {}", err.field()));
                diag = match err {
                    ConfigurationError::Missing { field } => diag
                        .with_suggestion(format!(
                            "Set `{}` in the profile's [settings] table or pass it on the command line",
                            field
                        ))
                        .with_suggestion(suggestions::NO_SETTINGS),
                    ConfigurationError::Invalid { expected, .. } => {
                        diag.with_suggestion(format!("Use one of: {}", expected))
                    }
                    ConfigurationError::Unsupported { .. } => diag.with_suggestion(
                        "Use the MSVC compiler on Windows and a gcc/clang compiler elsewhere",
                    ),
                    ConfigurationError::Path { .. } => {
                        diag.with_suggestion(suggestions::SEPARATE_PACKAGE_DIR)
                    }
                };
                diag
            }

            PackageError::Build(failure) => {
                let mut diag = Diagnostic::error("toolchain invocation failed")
                    .with_context(format!("command: {}", failure.command))
                    .with_context(describe_status(&failure.status));
                if !failure.detail.is_empty() {
                    diag = diag.with_context(failure.detail.clone());
                }
                if failure.status.is_none() && failure.detail.contains("failed to spawn") {
                    diag = diag.with_suggestion(suggestions::TOOL_NOT_FOUND);
                }
                diag.with_suggestion(suggestions::BUILD_FAILED)
            }

            PackageError::Packaging(err) => Diagnostic::error(err.to_string())
                .with_context("the toolchain reported success but produced unexpected output")
                .with_suggestion(suggestions::CHECK_SOURCE_LAYOUT),
        }
    }
}
