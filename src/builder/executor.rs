//! Toolchain execution with progress reporting.

use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::builder::command::{CommandSpec, Phase};
use crate::core::errors::BuildFailure;

/// Lines of stderr kept in a [`BuildFailure`].
const STDERR_TAIL_LINES: usize = 20;

/// Result of running one external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external commands. The seam between strategies and the OS.
pub trait ProcessRunner {
    /// Run a command to completion.
    ///
    /// `Err` means the command could not be run at all (spawn failure,
    /// timeout); a non-zero exit is an `Ok` outcome.
    fn run(&self, cmd: &CommandSpec, timeout: Option<Duration>) -> Result<ProcessOutcome>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Option<Duration>) -> Result<ProcessOutcome> {
        let output = cmd.to_process(timeout).exec()?;
        Ok(ProcessOutcome {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Runs toolchain phases in order, stopping at the first failure.
pub struct BuildExecutor<'a> {
    runner: &'a dyn ProcessRunner,
    timeout: Option<Duration>,
    verbose: bool,
}

impl<'a> BuildExecutor<'a> {
    /// Create a new build executor.
    pub fn new(runner: &'a dyn ProcessRunner) -> Self {
        BuildExecutor {
            runner,
            timeout: None,
            verbose: false,
        }
    }

    /// Set the per-phase timeout.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable verbose output.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Execute phases sequentially. Phases are never retried and later
    /// phases never run after a failure.
    pub fn execute(&self, phases: &[Phase]) -> Result<(), BuildFailure> {
        let start = Instant::now();

        // Progress bar only when not streaming toolchain output
        let pb = if !self.verbose && phases.len() > 1 {
            let pb = ProgressBar::new(phases.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.enable_steady_tick(Duration::from_millis(120));
            Some(pb)
        } else {
            None
        };

        for phase in phases {
            let command = phase.command.display();
            tracing::info!("Running {}", phase.name);
            tracing::debug!("$ {}", command);
            if let Some(ref pb) = pb {
                pb.set_message(phase.name);
            }

            let outcome = self.runner.run(&phase.command, self.timeout);
            let result = match outcome {
                Ok(outcome) if outcome.success() => {
                    if self.verbose {
                        for line in outcome.stdout.lines() {
                            tracing::debug!("{}", line);
                        }
                    }
                    Ok(())
                }
                Ok(outcome) => Err(BuildFailure {
                    command,
                    status: outcome.code,
                    detail: stderr_tail(&outcome.stderr),
                }),
                Err(e) => Err(BuildFailure {
                    command,
                    status: None,
                    detail: format!("{:#}", e),
                }),
            };

            if let Err(failure) = result {
                if let Some(ref pb) = pb {
                    pb.abandon_with_message(format!("{} failed", phase.name));
                }
                return Err(failure);
            }

            if let Some(ref pb) = pb {
                pb.inc(1);
            }
        }

        if let Some(ref pb) = pb {
            pb.finish_and_clear();
        }

        tracing::info!(
            "Toolchain finished {} phase(s) in {:.2}s",
            phases.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockProcessOutput};

    fn phases() -> Vec<Phase> {
        vec![
            Phase::new("configure", CommandSpec::new("./configure").arg("--prefix=/tmp/x")),
            Phase::new("build", CommandSpec::new("make")),
            Phase::new("install", CommandSpec::new("make").arg("install")),
        ]
    }

    #[test]
    fn test_all_phases_run_in_order() {
        let exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(""));

        BuildExecutor::new(&exec).execute(&phases()).unwrap();
        assert_eq!(
            exec.calls(),
            vec!["./configure --prefix=/tmp/x", "make", "make install"]
        );
    }

    #[test]
    fn test_failure_stops_later_phases() {
        let exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(""));
        exec.expect("make", MockProcessOutput::failure(2, "make: *** [all] Error 2"));

        let failure = BuildExecutor::new(&exec).execute(&phases()).unwrap_err();
        assert_eq!(failure.status, Some(2));
        assert_eq!(failure.command, "make");
        assert!(failure.detail.contains("Error 2"));
        assert_eq!(exec.calls(), vec!["./configure --prefix=/tmp/x", "make"]);
    }

    #[test]
    fn test_spawn_error_is_build_failure() {
        let exec = MockExecutor::new();
        exec.expect_error("./configure --prefix=/tmp/x", "failed to spawn `./configure`");

        let failure = BuildExecutor::new(&exec).execute(&phases()).unwrap_err();
        assert_eq!(failure.status, None);
        assert!(failure.detail.contains("failed to spawn"));
        assert_eq!(exec.calls().len(), 1);
    }

    #[test]
    fn test_stderr_tail() {
        let stderr: String = (0..30).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(&stderr);
        assert!(tail.starts_with("line 10"));
        assert!(tail.ends_with("line 29"));
    }

    #[test]
    #[cfg(unix)]
    fn test_system_runner_reports_exit_code() {
        let cmd = CommandSpec::new("sh").args(["-c", "echo oops >&2; exit 2"]);
        let outcome = SystemRunner.run(&cmd, None).unwrap();
        assert_eq!(outcome.code, Some(2));
        assert!(outcome.stderr.contains("oops"));
    }
}
