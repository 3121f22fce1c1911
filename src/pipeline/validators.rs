//! Validator discovery and sequential execution.
//!
//! Validators are independently executable files in a fixed directory.
//! The executor knows nothing about their internals: it selects an
//! interpreter by file extension, projects the execution context into
//! each child's environment, and aggregates pass/fail.

use std::env;
use std::path::PathBuf;

use camino::{Utf8Path, Utf8PathBuf};

use crate::process::ProcessRunner;

use super::context::ExecutionContext;
use super::error::PipelineError;

/// Filenames inside the validator directory that are never validators.
pub const VALIDATOR_EXCLUDES: [&str; 2] = ["common.py", ".pylintrc"];

const PYTHON_INTERPRETER: &str = "/usr/bin/python";
const SHELL_INTERPRETER: &str = "/bin/sh";

/// A discovered validator file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    /// Path of the validator file.
    pub path: Utf8PathBuf,
    /// File name, used in outcomes and logs.
    pub name: String,
    /// File extension driving interpreter selection.
    pub extension: Option<String>,
}

/// Result of running one validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// File name of the validator.
    pub validator_name: String,
    /// Whether the validator exited successfully.
    pub succeeded: bool,
    /// Combined captured stdout and stderr.
    pub captured_output: String,
}

/// Discovers validator files directly inside `validator_dir`.
///
/// Only regular files are considered, exclusions are skipped, and the
/// result is sorted by name so repeated runs execute in the same order.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] when the directory cannot be
/// read or contains no validators; a misconfigured path must not report
/// a vacuous success.
pub fn discover(validator_dir: &Utf8Path) -> Result<Vec<Validator>, PipelineError> {
    let entries = validator_dir
        .read_dir_utf8()
        .map_err(|error| PipelineError::Configuration {
            message: format!("cannot read validator directory {validator_dir}: {error}"),
        })?;

    let mut validators = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|error| PipelineError::Configuration {
            message: format!("cannot read validator directory {validator_dir}: {error}"),
        })?;
        let file_type = entry
            .file_type()
            .map_err(|error| PipelineError::Configuration {
                message: format!("cannot inspect {}: {error}", entry.path()),
            })?;
        if !file_type.is_file() {
            continue;
        }

        let name = entry.file_name().to_owned();
        if VALIDATOR_EXCLUDES.contains(&name.as_str()) {
            continue;
        }

        let path = entry.into_path();
        let extension = path.extension().map(str::to_owned);
        validators.push(Validator {
            path,
            name,
            extension,
        });
    }

    validators.sort_by(|a, b| a.name.cmp(&b.name));

    if validators.is_empty() {
        return Err(PipelineError::Configuration {
            message: format!("no validators found in {validator_dir}"),
        });
    }

    Ok(validators)
}

/// Runs every discovered validator sequentially and collects outcomes.
///
/// A failing validator does not abort the batch; all validation problems
/// surface in one pass. The aggregate verdict is the logical AND of the
/// individual outcomes.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] when discovery fails or when
/// the child environment cannot be assembled.
pub fn run_all<Runner>(
    validator_dir: &Utf8Path,
    context: &ExecutionContext,
    runner: &Runner,
) -> Result<Vec<ValidationOutcome>, PipelineError>
where
    Runner: ProcessRunner,
{
    let validators = discover(validator_dir)?;
    let envs = spawn_environment(validator_dir, context)?;

    let mut outcomes = Vec::with_capacity(validators.len());
    for validator in &validators {
        outcomes.push(run_one(validator, &envs, runner));
    }

    Ok(outcomes)
}

/// Builds the child environment: the execution context plus a
/// `PYTHONPATH` with the validator directory prepended, so validators can
/// import shared helper code instead of manipulating paths themselves.
fn spawn_environment(
    validator_dir: &Utf8Path,
    context: &ExecutionContext,
) -> Result<Vec<(String, String)>, PipelineError> {
    let mut paths: Vec<PathBuf> = vec![validator_dir.as_std_path().to_path_buf()];
    if let Some(existing) = env::var_os("PYTHONPATH") {
        paths.extend(env::split_paths(&existing));
    }
    let python_path = env::join_paths(paths)
        .map_err(|error| PipelineError::Configuration {
            message: format!("cannot assemble PYTHONPATH: {error}"),
        })?
        .to_string_lossy()
        .into_owned();

    let mut envs = context.to_env();
    envs.push(("PYTHONPATH".to_owned(), python_path));
    Ok(envs)
}

fn run_one<Runner>(
    validator: &Validator,
    envs: &[(String, String)],
    runner: &Runner,
) -> ValidationOutcome
where
    Runner: ProcessRunner,
{
    let (program, args) = interpreter_command(validator);
    tracing::info!(validator = %validator.name, program = %program, "executing validator");

    match runner.run(&program, &args, envs) {
        Ok(output) => {
            if !output.stdout.is_empty() {
                tracing::info!(validator = %validator.name, "{}", output.stdout.trim_end());
            }
            if !output.success {
                tracing::warn!(
                    validator = %validator.name,
                    exit_code = ?output.exit_code,
                    "validator failed"
                );
            }
            let mut captured_output = output.stdout;
            captured_output.push_str(&output.stderr);
            ValidationOutcome {
                validator_name: validator.name.clone(),
                succeeded: output.success,
                captured_output,
            }
        }
        Err(error) => {
            tracing::warn!(validator = %validator.name, "validator could not be executed: {error}");
            ValidationOutcome {
                validator_name: validator.name.clone(),
                succeeded: false,
                captured_output: error.to_string(),
            }
        }
    }
}

/// Selects the interpreter for a validator by extension; unrecognised
/// extensions are executed directly.
fn interpreter_command(validator: &Validator) -> (String, Vec<String>) {
    match validator.extension.as_deref() {
        Some("py") => (
            PYTHON_INTERPRETER.to_owned(),
            vec![validator.path.to_string()],
        ),
        Some("sh") => (
            SHELL_INTERPRETER.to_owned(),
            vec![validator.path.to_string()],
        ),
        _ => (validator.path.to_string(), Vec::new()),
    }
}
