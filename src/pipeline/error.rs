//! Pipeline error taxonomy and process exit-code mapping.

use thiserror::Error;

use crate::github::error::GithubError;
use crate::local::error::SyncError;

/// Terminal failures of one pipeline invocation.
///
/// Each variant maps to a distinct process exit code so the invoking
/// scheduler can tell input problems, operator misconfiguration, and
/// genuine test failures apart. Denied authorization is not an error; it
/// is modelled as a skipped outcome and exits zero.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// The webhook payload was missing or not valid JSON.
    #[error("webhook payload input error: {message}")]
    Input {
        /// Details about the malformed input.
        message: String,
    },

    /// Operator misconfiguration, e.g. a missing secret directory.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// The payload parsed as JSON but matches no known event shape, or
    /// the linked pull request could not be resolved.
    #[error("malformed webhook payload: {message}")]
    MalformedPayload {
        /// Details about the unrecognised shape.
        message: String,
    },

    /// Fetching refs or checking out the merge commit failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// One or more validators failed; a final report was still posted.
    #[error("{failed} of {total} validators failed")]
    ValidatorsFailed {
        /// Number of validators that failed.
        failed: usize,
        /// Number of validators that ran.
        total: usize,
    },

    /// Posting the final status or comment failed after validators ran.
    #[error("failed to report final result: {0}")]
    Report(#[source] GithubError),

    /// A review-system call outside classification failed.
    #[error(transparent)]
    Api(#[from] GithubError),
}

impl PipelineError {
    /// Returns the process exit code for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Input { .. } => 1,
            Self::Configuration { .. } => 2,
            Self::MalformedPayload { .. } => 3,
            Self::Sync(_) => 4,
            Self::ValidatorsFailed { .. } => 5,
            Self::Report(_) => 6,
            Self::Api(_) => 7,
        }
    }
}
