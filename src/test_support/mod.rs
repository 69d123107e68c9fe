//! Test utilities and mocks for xzpack unit tests.
//!
//! Provides a mock implementation of [`ProcessRunner`] so strategies can be
//! driven without a real toolchain, plus fixtures that lay out fake source
//! trees and toolchain output on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use xzpack::test_support::{MockExecutor, MockProcessOutput};
//!
//! #[test]
//! fn test_example() {
//!     let exec = MockExecutor::new();
//!     exec.expect("make install", MockProcessOutput::failure(2, "no rule"));
//!     exec.set_default(MockProcessOutput::success(""));
//!
//!     // Hand `&exec` to anything taking `&dyn ProcessRunner`...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};

use crate::builder::command::CommandSpec;
use crate::builder::executor::{ProcessOutcome, ProcessRunner};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// What a matched command produces.
#[derive(Debug, Clone)]
enum MockResponse {
    Output(MockProcessOutput),
    /// The command cannot be run at all (spawn failure, timeout).
    Error(String),
}

#[derive(Debug, Clone)]
struct CommandExpectation {
    pattern: CommandPattern,
    response: MockResponse,
}

/// Mock process runner.
///
/// Records every command it is asked to run and answers from a list of
/// expectations, first match wins.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: RefCell<Vec<CommandExpectation>>,
    calls: RefCell<Vec<CommandSpec>>,
    default_output: RefCell<Option<MockProcessOutput>>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Create a mock executor where every command succeeds.
    pub fn succeeding() -> Self {
        let exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(""));
        exec
    }

    fn push(&self, pattern: CommandPattern, response: MockResponse) -> &Self {
        self.expectations
            .borrow_mut()
            .push(CommandExpectation { pattern, response });
        self
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.push(
            CommandPattern::Exact(cmd.to_string()),
            MockResponse::Output(output),
        )
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.push(
            CommandPattern::StartsWith(prefix.to_string()),
            MockResponse::Output(output),
        )
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.push(
            CommandPattern::Contains(substring.to_string()),
            MockResponse::Output(output),
        )
    }

    /// Make an exact command fail to run at all.
    pub fn expect_error(&self, cmd: &str, message: &str) -> &Self {
        self.push(
            CommandPattern::Exact(cmd.to_string()),
            MockResponse::Error(message.to_string()),
        )
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&self, output: MockProcessOutput) -> &Self {
        *self.default_output.borrow_mut() = Some(output);
        self
    }

    /// Get all commands that were called, as display strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().iter().map(CommandSpec::display).collect()
    }

    /// Get all commands that were called, with environment and cwd.
    pub fn commands(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }
}

impl ProcessRunner for MockExecutor {
    fn run(&self, cmd: &CommandSpec, _timeout: Option<Duration>) -> Result<ProcessOutcome> {
        self.calls.borrow_mut().push(cmd.clone());
        let full_cmd = cmd.display();

        let matched = self
            .expectations
            .borrow()
            .iter()
            .find(|exp| exp.pattern.matches(&full_cmd))
            .map(|exp| exp.response.clone());

        let output = match matched {
            Some(MockResponse::Output(output)) => output,
            Some(MockResponse::Error(message)) => return Err(anyhow!(message)),
            None => match self.default_output.borrow().clone() {
                Some(default) => default,
                None => bail!("unexpected command: {}", full_cmd),
            },
        };

        Ok(ProcessOutcome {
            code: Some(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_first_match_wins() {
        let exec = MockExecutor::new();
        exec.expect("make install", MockProcessOutput::failure(2, "boom"));
        exec.expect_prefix("make", MockProcessOutput::success("ok"));

        let install = exec
            .run(&CommandSpec::new("make").arg("install"), None)
            .unwrap();
        assert_eq!(install.code, Some(2));

        let build = exec.run(&CommandSpec::new("make").arg("-j4"), None).unwrap();
        assert!(build.success());
        assert_eq!(exec.calls(), vec!["make install", "make -j4"]);
    }

    #[test]
    fn test_mock_executor_matches_substring() {
        let exec = MockExecutor::new();
        exec.expect_contains("/target:liblzma_dll", MockProcessOutput::failure(1, "MSB1009"));

        let outcome = exec
            .run(
                &CommandSpec::new("msbuild")
                    .arg("xz_win.sln")
                    .arg("/target:liblzma_dll"),
                None,
            )
            .unwrap();
        assert_eq!(outcome.code, Some(1));
        assert_eq!(outcome.stderr, "MSB1009");
    }

    #[test]
    fn test_mock_executor_unexpected_command() {
        let exec = MockExecutor::new();
        assert!(exec.run(&CommandSpec::new("msbuild"), None).is_err());
        assert_eq!(exec.calls().len(), 1);
    }
}
