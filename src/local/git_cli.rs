//! Git CLI implementation of the source-control seam.

use crate::github::models::PullId;
use crate::process::{CommandOutput, ProcessRunner};

use super::SourceControl;
use super::error::SyncError;

const DEFAULT_GIT_PROGRAM: &str = "git";
const HEADS_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";
const PULLS_REFSPEC: &str = "+refs/pull/*:refs/remotes/origin/pr/*";

/// [`SourceControl`] implementation that shells out to the git CLI.
///
/// Pull-request refs are mapped into the `refs/remotes/origin/pr/*`
/// namespace so the hypothetical merge result of any pull request can be
/// resolved locally.
#[derive(Debug)]
pub struct GitCliSourceControl<'runner, Runner>
where
    Runner: ProcessRunner,
{
    runner: &'runner Runner,
    program: String,
}

impl<'runner, Runner> GitCliSourceControl<'runner, Runner>
where
    Runner: ProcessRunner,
{
    /// Creates a source-control backend using the default `git` program.
    #[must_use]
    pub fn new(runner: &'runner Runner) -> Self {
        Self {
            runner,
            program: DEFAULT_GIT_PROGRAM.to_owned(),
        }
    }

    /// Overrides the git program path.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run_git(&self, operation: &str, args: &[&str]) -> Result<CommandOutput, SyncError> {
        let args: Vec<String> = args.iter().map(|&arg| arg.to_owned()).collect();
        let output =
            self.runner
                .run(&self.program, &args, &[])
                .map_err(|error| SyncError::Spawn {
                    operation: operation.to_owned(),
                    message: error.to_string(),
                })?;

        if !output.success {
            return Err(SyncError::Failed {
                operation: operation.to_owned(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim_end().to_owned(),
            });
        }

        Ok(output)
    }
}

impl<Runner> SourceControl for GitCliSourceControl<'_, Runner>
where
    Runner: ProcessRunner,
{
    fn fetch_all(&self) -> Result<(), SyncError> {
        self.run_git(
            "fetch",
            &["fetch", "--tags", "origin", HEADS_REFSPEC, PULLS_REFSPEC],
        )?;
        Ok(())
    }

    fn resolve_merge_commit(&self, pull_id: &PullId) -> Result<String, SyncError> {
        let merge_ref = format!("refs/remotes/origin/pr/{pull_id}/merge^{{commit}}");
        let output = self.run_git("rev-parse", &["rev-parse", merge_ref.as_str()])?;

        let sha = output.stdout.trim().to_owned();
        if sha.is_empty() {
            return Err(SyncError::MissingMergeCommit {
                pull_id: pull_id.to_string(),
            });
        }

        Ok(sha)
    }

    fn force_checkout(&self, sha: &str) -> Result<(), SyncError> {
        self.run_git("checkout", &["checkout", "-f", sha])?;
        Ok(())
    }
}
