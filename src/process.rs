//! Child-process execution behind a mockable trait seam.
//!
//! Both the validator executor and the git-backed synchronizer spawn
//! external programs; routing them through one trait keeps process
//! handling testable without touching the real system.

use std::process::Command;

use thiserror::Error;

/// Failure to spawn or wait on a child process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessError {
    /// The program could not be started or awaited.
    #[error("failed to run {program}: {message}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Details from the operating system.
        message: String,
    },
}

/// Captured result of a completed child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the child exited with status zero.
    pub success: bool,
    /// Raw exit code, absent when terminated by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Runs external programs to completion, capturing their output.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner: Send + Sync {
    /// Runs `program` with `args`, adding `envs` to the inherited
    /// environment, and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::Spawn`] when the child cannot be started
    /// or awaited. A non-zero exit is not an error; it is reported
    /// through [`CommandOutput::success`].
    fn run(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<CommandOutput, ProcessError>;
}

/// [`ProcessRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<CommandOutput, ProcessError> {
        let output = Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(name, value)| (name, value)))
            .output()
            .map_err(|error| ProcessError::Spawn {
                program: program.to_owned(),
                message: error.to_string(),
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
