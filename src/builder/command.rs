//! Toolchain command descriptions.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::util::process::ProcessBuilder;

/// A command to execute, with program, arguments, environment and working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// The program to run (e.g., "make", "msbuild")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
    /// Working directory
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add multiple environment variables.
    pub fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Program and arguments joined for display.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Convert into a runnable process.
    pub fn to_process(&self, timeout: Option<Duration>) -> ProcessBuilder {
        let mut pb = ProcessBuilder::new(&self.program)
            .args(&self.args)
            .timeout(timeout);
        for (key, value) in &self.env {
            pb = pb.env(key, value);
        }
        if let Some(ref cwd) = self.cwd {
            pb = pb.cwd(cwd);
        }
        pb
    }
}

/// One step of a toolchain run: configure, build or install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub name: &'static str,
    pub command: CommandSpec,
}

impl Phase {
    pub fn new(name: &'static str, command: CommandSpec) -> Self {
        Phase { name, command }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let cmd = CommandSpec::new("make")
            .args(["-j4", "install"])
            .envs([("CC".to_string(), "gcc".to_string())]);
        assert_eq!(cmd.display(), "make -j4 install");
    }

    #[test]
    fn test_to_process_keeps_args() {
        let cmd = CommandSpec::new("msbuild")
            .arg("xz_win.sln")
            .arg("/p:Platform=x64")
            .cwd("windows");
        let pb = cmd.to_process(None);
        assert_eq!(pb.get_program(), std::path::Path::new("msbuild"));
        assert_eq!(pb.get_args(), &["xz_win.sln", "/p:Platform=x64"]);
    }
}
