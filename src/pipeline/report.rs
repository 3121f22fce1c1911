//! Result reporting back to the review system.

use crate::github::error::GithubError;
use crate::github::gateway::{ReviewGateway, StatusState};
use crate::github::models::PullRequestResource;

const PENDING_DESCRIPTION: &str = "Automated tests in progress";
const SUCCESS_DESCRIPTION: &str = "Automated tests passed";
const FAILURE_DESCRIPTION: &str = "Automated tests failed";
const ABORTED_DESCRIPTION: &str = "Automated tests aborted before completion";
const SUCCESS_COMMENT: &str = "Tests passed!";
const FAILURE_COMMENT: &str = "Tests failed!";

/// Posts pipeline progress and verdicts using a gateway.
///
/// Statuses target the head commit of the pull request; comments target
/// the pull request itself.
pub struct ResultReporter<'client, Gateway>
where
    Gateway: ReviewGateway,
{
    client: &'client Gateway,
}

impl<'client, Gateway> ResultReporter<'client, Gateway>
where
    Gateway: ReviewGateway,
{
    /// Creates a reporter using the provided gateway.
    #[must_use]
    pub const fn new(client: &'client Gateway) -> Self {
        Self { client }
    }

    /// Marks testing as in progress, before synchronization begins.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures; without a visible pending status the
    /// ordering guarantee to reviewers would be broken.
    pub fn report_pending(&self, resource: &PullRequestResource) -> Result<(), GithubError> {
        self.client.post_commit_status(
            StatusState::Pending,
            PENDING_DESCRIPTION,
            &resource.head.sha,
            &resource.base.repo_full_name,
        )
    }

    /// Posts the final verdict: a human-readable comment, then a matching
    /// commit status.
    ///
    /// # Errors
    ///
    /// Propagates gateway failures so a reporting failure is never
    /// silently swallowed; a reviewer watching the pull request must not
    /// be left believing testing never happened.
    pub fn report_final(
        &self,
        success: bool,
        resource: &PullRequestResource,
    ) -> Result<(), GithubError> {
        let (comment, state, description) = if success {
            (SUCCESS_COMMENT, StatusState::Success, SUCCESS_DESCRIPTION)
        } else {
            (FAILURE_COMMENT, StatusState::Failure, FAILURE_DESCRIPTION)
        };

        self.client.post_issue_comment(
            comment,
            &resource.number,
            &resource.base.repo_full_name,
        )?;
        self.client.post_commit_status(
            state,
            description,
            &resource.head.sha,
            &resource.base.repo_full_name,
        )
    }

    /// Best-effort error status for fatal aborts after the pending report
    /// was posted, so the review system is not left pending forever. Its
    /// own failure is logged and swallowed; the abort that triggered it
    /// is the failure worth surfacing.
    pub fn report_aborted(&self, resource: &PullRequestResource) {
        if let Err(error) = self.client.post_commit_status(
            StatusState::Error,
            ABORTED_DESCRIPTION,
            &resource.head.sha,
            &resource.base.repo_full_name,
        ) {
            tracing::warn!("failed to report aborted run: {error}");
        }
    }
}
