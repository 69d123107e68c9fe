//! Centralized shell output.
//!
//! Status lines go to stderr as `{status:>12} {message}`; machine-readable
//! results go to stdout as JSON. The two never mix: in JSON mode status lines
//! are dropped. Diagnostics always go to stderr.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use serde::Serialize;

use crate::util::diagnostic::Diagnostic;

/// Shell output mode - Human and Json are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    /// Human-readable output with optional colors.
    Human { verbose: bool, color: ColorChoice },
    /// Machine-readable JSON output only.
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbose: false,
            color: ColorChoice::Auto,
        }
    }
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    Never,
}

/// Status word at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Building,
    Packaged,
    Finished,
    Info,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Building => "Building",
            Status::Packaged => "Packaged",
            Status::Finished => "Finished",
            Status::Info => "Info",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Building => "\x1b[1;36m",
            Status::Packaged | Status::Finished => "\x1b[1;32m",
            Status::Info => "\x1b[1;34m",
        }
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
}

impl Shell {
    /// Create a new shell with the given mode.
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Never => false,
            },
        };

        Shell { mode, use_color }
    }

    /// Create a shell from CLI flags. JSON takes precedence over verbose.
    pub fn from_flags(verbose: bool, no_color: bool, json: bool) -> Self {
        let mode = if json {
            ShellMode::Json
        } else {
            let color = if no_color {
                ColorChoice::Never
            } else {
                ColorChoice::Auto
            };
            ShellMode::Human { verbose, color }
        };
        Shell::new(mode)
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self.mode, ShellMode::Human { verbose: true, .. })
    }

    pub fn is_json(&self) -> bool {
        matches!(self.mode, ShellMode::Json)
    }

    /// Check if colors are enabled.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message to stderr. Ignored in JSON mode.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_json() {
            return;
        }
        eprintln!("{} {}", self.format_status(status), msg);
    }

    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a diagnostic to stderr, in every mode.
    pub fn diagnostic(&self, diagnostic: &Diagnostic) {
        eprint!("{}", diagnostic.format(self.use_color));
    }

    /// Print a value as pretty JSON on stdout.
    pub fn json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout)?;
        Ok(())
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        if self.use_color {
            format!(
                "{}{:>width$}\x1b[0m",
                status.color_code(),
                text,
                width = STATUS_WIDTH
            )
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}
