//! Subprocess execution for confirmed commands.
//!
//! Commands run through `bash -c` with the invoking process's standard
//! streams inherited, so an executed command may itself prompt and read
//! input. Execution blocks the calling thread until the subprocess
//! terminates; there is no timeout or cancellation.
//!
//! The executor never inspects or rewrites the command text. If a sudo
//! prefix is wanted, the caller must have embedded it in the string already.

use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::info;

const SHELL: &str = "bash";

/// Ways a run can fail short of completing successfully.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The command string was empty or all whitespace; nothing was spawned.
    #[error("empty command")]
    EmptyCommand,
    /// The shell interpreter is not on PATH.
    #[error("shell '{0}' not found in PATH")]
    ShellUnavailable(&'static str),
    /// The subprocess could not be started.
    #[error("failed to launch command: {0}")]
    Launch(#[from] std::io::Error),
    /// The subprocess ran but exited unsuccessfully.
    #[error("command exited with {0}")]
    Failed(ExitStatus),
}

/// Trait for running shell processes.
///
/// This abstraction enables testing without spawning real processes.
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` through the shell with inherited standard streams,
    /// blocking until the subprocess terminates.
    fn run_shell(&self, command: &str) -> std::io::Result<ExitStatus>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using std::process::Command.
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run_shell(&self, command: &str) -> std::io::Result<ExitStatus> {
        Command::new(SHELL)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
    }

    fn program_exists(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Runs confirmed command strings as interactive subprocesses.
pub struct Executor;

impl Executor {
    pub fn new() -> Self {
        Self
    }

    /// Runs `command` through the system shell.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is empty or whitespace (rejected
    /// without spawning), the shell is missing, the subprocess fails to
    /// start, or it exits non-zero.
    pub fn run(&self, command: &str) -> Result<(), ExecError> {
        self.run_with_runner(command, &SystemProcessRunner)
    }

    /// Runs `command` with an injected process runner (for testing).
    pub fn run_with_runner<P: ProcessRunner>(
        &self,
        command: &str,
        runner: &P,
    ) -> Result<(), ExecError> {
        if command.trim().is_empty() {
            return Err(ExecError::EmptyCommand);
        }

        if !runner.program_exists(SHELL) {
            return Err(ExecError::ShellUnavailable(SHELL));
        }

        info!("Executing shell command: {}", command);

        let status = runner.run_shell(command)?;
        if status.success() {
            Ok(())
        } else {
            Err(ExecError::Failed(status))
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::sync::Mutex;

    /// Mock process runner that records every command it is asked to run.
    pub struct RecordingRunner {
        pub commands: Mutex<Vec<String>>,
        exit_code: i32,
        shell_present: bool,
    }

    impl RecordingRunner {
        pub fn succeeding() -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                exit_code: 0,
                shell_present: true,
            }
        }

        pub fn failing(exit_code: i32) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                exit_code,
                shell_present: true,
            }
        }

        pub fn without_shell() -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                exit_code: 0,
                shell_present: false,
            }
        }

        pub fn recorded(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for RecordingRunner {
        fn run_shell(&self, command: &str) -> std::io::Result<ExitStatus> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(ExitStatus::from_raw(self.exit_code << 8))
        }

        fn program_exists(&self, _program: &str) -> bool {
            self.shell_present
        }
    }
}
