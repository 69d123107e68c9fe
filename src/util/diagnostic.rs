//! User-facing diagnostics.
//!
//! A diagnostic is one headline plus optional detail: the file it concerns,
//! context lines (command, exit status, captured stderr) and numbered
//! suggestions. Errors from [`crate::PackageError::to_diagnostic`] and
//! non-fatal packaging warnings both render through here.

use std::fmt::Write as _;
use std::path::PathBuf;

/// Suggestions shared between error kinds.
pub mod suggestions {
    pub const BUILD_FAILED: &str = "Run `xzpack build --verbose` to see the full toolchain output";

    pub const CHECK_SOURCE_LAYOUT: &str =
        "Check the [source] table in .xzpack/config.toml against the unpacked source tree";

    pub const NO_SETTINGS: &str =
        "Pass `--profile <file>` or the individual --os/--arch/--compiler/--build-type flags";

    pub const TOOL_NOT_FOUND: &str =
        "Install the tool or point [toolchain] in .xzpack/config.toml at it";

    pub const SEPARATE_PACKAGE_DIR: &str =
        "Pick a package directory (-o) and [source] install_dir that do not overlap the source tree";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, false) => "error",
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Warning, false) => "warning",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// File the diagnostic is about
    pub location: Option<PathBuf>,
    pub context: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            location: None,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, message)
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render for a terminal; `color` adds ANSI escapes to the labels.
    pub fn format(&self, color: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.severity.label(color), self.message);

        if let Some(ref path) = self.location {
            let _ = writeln!(out, "  --> {}", path.display());
        }
        for line in &self.context {
            let _ = writeln!(out, "  → {}", line);
        }

        if !self.suggestions.is_empty() {
            let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            let _ = writeln!(out, "\n{}: consider:", help);
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, suggestion);
            }
        }

        out
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
