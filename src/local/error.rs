//! Error types for working-tree synchronization.

use thiserror::Error;

/// Errors surfaced while synchronizing the working tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The version-control tool could not be launched.
    #[error("failed to run git for {operation}: {message}")]
    Spawn {
        /// The operation being attempted (fetch, rev-parse, checkout).
        operation: String,
        /// Error detail from the operating system.
        message: String,
    },

    /// The version-control tool exited unsuccessfully.
    #[error("git {operation} exited with status {exit_code:?}: {stderr}")]
    Failed {
        /// The operation that failed.
        operation: String,
        /// Exit code when the tool terminated normally.
        exit_code: Option<i32>,
        /// Captured standard error from the tool.
        stderr: String,
    },

    /// Revision parsing produced no commit for the merge ref.
    #[error("no merge commit resolved for pull request {pull_id}")]
    MissingMergeCommit {
        /// The pull request whose merge ref could not be resolved.
        pull_id: String,
    },
}
