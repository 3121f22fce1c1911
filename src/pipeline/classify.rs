//! Webhook payload classification.
//!
//! The raw payload is resolved into a [`PullRequestResource`] exactly once
//! at this boundary; every downstream component operates on the resolved
//! resource and never on the raw payload.

use serde::Deserialize;

use crate::github::gateway::ReviewGateway;
use crate::github::models::{ApiPullRequest, ApiUser, PullRequestResource};

use super::error::PipelineError;

/// The two webhook event shapes that can trigger a pipeline run.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WebhookPayload {
    /// A pull request was opened or edited; the resource is embedded.
    PullRequest(PullRequestEvent),
    /// A comment was posted on an issue; the pull request is linked.
    IssueComment(IssueCommentEvent),
}

/// Payload carrying the pull request directly.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    pub(crate) pull_request: ApiPullRequest,
}

/// Payload describing a comment on an issue.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueCommentEvent {
    pub(crate) issue: IssueRef,
    pub(crate) comment: CommentRef,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IssueRef {
    pub(crate) pull_request: Option<PullRequestLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PullRequestLink {
    pub(crate) url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommentRef {
    pub(crate) body: String,
    pub(crate) user: ApiUser,
}

/// Parses the raw payload document into a [`WebhookPayload`].
///
/// # Errors
///
/// Returns [`PipelineError::Input`] when the document is not valid JSON
/// and [`PipelineError::MalformedPayload`] when it matches neither event
/// shape. Both are fatal; retrying would reproduce the same failure.
pub fn parse_payload(raw: &str) -> Result<WebhookPayload, PipelineError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|error| PipelineError::Input {
            message: format!("payload is not valid JSON: {error}"),
        })?;

    serde_json::from_value(value).map_err(|_| PipelineError::MalformedPayload {
        message: "payload matches neither a pull request event nor an issue comment event"
            .to_owned(),
    })
}

/// Resolves the payload into the pull request under test.
///
/// Pull-request events carry the resource directly. Comment events carry
/// only a link, which is dereferenced through the review gateway.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedPayload`] when a comment event is
/// not attached to a pull request, or when the linked resource cannot be
/// fetched or decoded.
pub fn classify<Gateway>(
    payload: &WebhookPayload,
    gateway: &Gateway,
) -> Result<PullRequestResource, PipelineError>
where
    Gateway: ReviewGateway,
{
    match payload {
        WebhookPayload::PullRequest(event) => Ok(event.pull_request.clone().into()),
        WebhookPayload::IssueComment(event) => {
            let link =
                event
                    .issue
                    .pull_request
                    .as_ref()
                    .ok_or_else(|| PipelineError::MalformedPayload {
                        message: "comment is on a plain issue, not a pull request".to_owned(),
                    })?;

            gateway
                .fetch_pull_request(&link.url)
                .map_err(|error| PipelineError::MalformedPayload {
                    message: format!("failed to resolve linked pull request: {error}"),
                })
        }
    }
}
