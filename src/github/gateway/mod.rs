//! Gateways for talking to the review system.
//!
//! This module provides a trait-based client for the handful of review
//! system capabilities the pipeline needs. The trait-based design enables
//! mocking in tests while the HTTP implementation handles real requests at
//! the wire level.

mod http;

pub use http::HttpReviewGateway;

use crate::github::error::GithubError;
use crate::github::models::{PullId, PullRequestResource};

/// Commit status states understood by the review system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusState {
    /// Testing is in progress.
    Pending,
    /// Testing completed and every validator passed.
    Success,
    /// Testing completed and at least one validator failed.
    Failure,
    /// Testing aborted before a verdict could be reached.
    Error,
}

impl StatusState {
    /// Returns the wire representation of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }
}

/// Client for the review-system capabilities required by the pipeline.
#[cfg_attr(test, mockall::automock)]
pub trait ReviewGateway: Send + Sync {
    /// Fetches a pull request by its API URL.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Api`] for non-success responses and
    /// [`GithubError::Decode`] when the body is not a valid pull request
    /// document.
    fn fetch_pull_request(&self, url: &str) -> Result<PullRequestResource, GithubError>;

    /// Lists the paths changed by a pull request, in review-system order.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Api`] or [`GithubError::Network`] when the
    /// request fails.
    fn list_changed_files(
        &self,
        repo_full_name: &str,
        pull_id: &PullId,
    ) -> Result<Vec<String>, GithubError>;

    /// Checks whether `user` is a member of `org`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Api`] when the review system answers with a
    /// status other than the documented member/non-member responses.
    fn is_org_member(&self, org: &str, user: &str) -> Result<bool, GithubError>;

    /// Posts a commit status against `sha` in `repo_full_name`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Api`] or [`GithubError::Network`] when the
    /// status cannot be recorded.
    fn post_commit_status(
        &self,
        state: StatusState,
        description: &str,
        sha: &str,
        repo_full_name: &str,
    ) -> Result<(), GithubError>;

    /// Posts an issue comment on the pull request.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Api`] or [`GithubError::Network`] when the
    /// comment cannot be created.
    fn post_issue_comment(
        &self,
        body: &str,
        pull_id: &PullId,
        repo_full_name: &str,
    ) -> Result<(), GithubError>;
}
