//! Execution context exposed to validators as process environment.
//!
//! The context is an explicit record owned by the pipeline instance; only
//! the validator executor projects it into child-process environments, at
//! spawn time. No component mutates the parent process environment.

use crate::github::error::GithubError;
use crate::github::gateway::ReviewGateway;
use crate::github::models::{PullId, PullRequestResource};

/// Flat mapping of pull-request facts, derived 1:1 from the resource.
///
/// `current_sha` is only known after the working tree has been
/// synchronized and is absent from the projection until then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Title of the pull request.
    pub title: String,
    /// Description body; an absent body is an empty string.
    pub body: String,
    /// Pull request identifier.
    pub pull_id: PullId,
    /// API URL of the pull request.
    pub url: String,
    /// SHA of the merge target.
    pub base_sha: String,
    /// Ref of the merge target.
    pub base_ref: String,
    /// Label of the merge target.
    pub base_label: String,
    /// Full name of the merge target repository.
    pub base_name: String,
    /// SHA of the proposed head.
    pub remote_sha: String,
    /// Ref of the proposed head.
    pub remote_ref: String,
    /// Label of the proposed head.
    pub remote_label: String,
    /// Full name of the head repository.
    pub remote_name: String,
    /// Paths changed by the pull request, in review-system order.
    pub changed_files: Vec<String>,
    /// Resolved merge commit, set after synchronization.
    pub current_sha: Option<String>,
}

impl ExecutionContext {
    /// Builds a context from the resource and a changed-file listing.
    #[must_use]
    pub fn from_resource(resource: &PullRequestResource, changed_files: Vec<String>) -> Self {
        Self {
            title: resource.title.clone(),
            body: resource.body.clone(),
            pull_id: resource.number.clone(),
            url: resource.url.clone(),
            base_sha: resource.base.sha.clone(),
            base_ref: resource.base.ref_name.clone(),
            base_label: resource.base.label.clone(),
            base_name: resource.base.repo_full_name.clone(),
            remote_sha: resource.head.sha.clone(),
            remote_ref: resource.head.ref_name.clone(),
            remote_label: resource.head.label.clone(),
            remote_name: resource.head.repo_full_name.clone(),
            changed_files,
            current_sha: None,
        }
    }

    /// Records the resolved merge commit.
    pub fn set_current_sha(&mut self, sha: impl Into<String>) {
        self.current_sha = Some(sha.into());
    }

    /// Projects the context into environment variable pairs.
    ///
    /// An empty changed-file list yields an empty string, not an absent
    /// variable. `PRV_CURRENT_SHA` is only present once set.
    #[must_use]
    pub fn to_env(&self) -> Vec<(String, String)> {
        let mut env = vec![
            ("PRV_TITLE".to_owned(), self.title.clone()),
            ("PRV_BODY".to_owned(), self.body.clone()),
            ("PRV_PULL_ID".to_owned(), self.pull_id.to_string()),
            ("PRV_URL".to_owned(), self.url.clone()),
            ("PRV_BASE_SHA".to_owned(), self.base_sha.clone()),
            ("PRV_BASE_REF".to_owned(), self.base_ref.clone()),
            ("PRV_BASE_LABEL".to_owned(), self.base_label.clone()),
            ("PRV_BASE_NAME".to_owned(), self.base_name.clone()),
            ("PRV_REMOTE_SHA".to_owned(), self.remote_sha.clone()),
            ("PRV_REMOTE_REF".to_owned(), self.remote_ref.clone()),
            ("PRV_REMOTE_LABEL".to_owned(), self.remote_label.clone()),
            ("PRV_REMOTE_NAME".to_owned(), self.remote_name.clone()),
            (
                "PRV_CHANGED_FILES".to_owned(),
                self.changed_files.join(","),
            ),
        ];

        if let Some(current_sha) = &self.current_sha {
            env.push(("PRV_CURRENT_SHA".to_owned(), current_sha.clone()));
        }

        env
    }
}

/// Builds the execution context, fetching the changed-file listing from
/// the review system.
///
/// # Errors
///
/// Propagates gateway failures from the changed-file listing.
pub fn build_context<Gateway>(
    resource: &PullRequestResource,
    gateway: &Gateway,
) -> Result<ExecutionContext, GithubError>
where
    Gateway: ReviewGateway,
{
    let changed_files =
        gateway.list_changed_files(&resource.base.repo_full_name, &resource.number)?;
    Ok(ExecutionContext::from_resource(resource, changed_files))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;
    use serde_json::json;

    use crate::github::MockReviewGateway;
    use crate::github::models::{PullId, PullRequestResource};

    use super::{ExecutionContext, build_context};

    fn sample_resource() -> PullRequestResource {
        let api: crate::github::models::ApiPullRequest = serde_json::from_value(json!({
            "number": "42",
            "title": "Add widget",
            "body": null,
            "url": "https://api.example.com/repos/acme/widgets/pulls/42",
            "user": {"login": "octocat"},
            "base": {
                "sha": "base-sha",
                "ref": "main",
                "label": "acme:main",
                "repo": {"full_name": "acme/widgets"}
            },
            "head": {
                "sha": "head-sha",
                "ref": "feature",
                "label": "octocat:feature",
                "repo": {"full_name": "octocat/widgets"}
            }
        }))
        .expect("sample should decode");
        api.into()
    }

    fn env_map(context: &ExecutionContext) -> HashMap<String, String> {
        context.to_env().into_iter().collect()
    }

    #[rstest]
    fn projection_round_trips_the_resource_fields() {
        let resource = sample_resource();
        let context = ExecutionContext::from_resource(
            &resource,
            vec!["src/lib.rs".to_owned(), "README.md".to_owned()],
        );
        let env = env_map(&context);

        assert_eq!(env.get("PRV_TITLE").map(String::as_str), Some("Add widget"));
        assert_eq!(env.get("PRV_BODY").map(String::as_str), Some(""));
        assert_eq!(env.get("PRV_PULL_ID").map(String::as_str), Some("42"));
        assert_eq!(env.get("PRV_BASE_SHA").map(String::as_str), Some("base-sha"));
        assert_eq!(env.get("PRV_BASE_REF").map(String::as_str), Some("main"));
        assert_eq!(
            env.get("PRV_BASE_NAME").map(String::as_str),
            Some("acme/widgets")
        );
        assert_eq!(
            env.get("PRV_REMOTE_SHA").map(String::as_str),
            Some("head-sha")
        );
        assert_eq!(
            env.get("PRV_REMOTE_LABEL").map(String::as_str),
            Some("octocat:feature")
        );
        assert_eq!(
            env.get("PRV_CHANGED_FILES").map(String::as_str),
            Some("src/lib.rs,README.md")
        );
    }

    #[rstest]
    fn current_sha_is_absent_until_synchronization_records_it() {
        let resource = sample_resource();
        let mut context = ExecutionContext::from_resource(&resource, Vec::new());

        assert!(!env_map(&context).contains_key("PRV_CURRENT_SHA"));

        context.set_current_sha("merge-sha");
        assert_eq!(
            env_map(&context).get("PRV_CURRENT_SHA").map(String::as_str),
            Some("merge-sha")
        );
    }

    #[rstest]
    fn empty_changed_file_list_projects_an_empty_string() {
        let resource = sample_resource();
        let context = ExecutionContext::from_resource(&resource, Vec::new());

        assert_eq!(
            env_map(&context).get("PRV_CHANGED_FILES").map(String::as_str),
            Some("")
        );
    }

    #[rstest]
    fn build_context_delegates_to_the_changed_files_listing() {
        let resource = sample_resource();
        let mut gateway = MockReviewGateway::new();
        gateway
            .expect_list_changed_files()
            .withf(|repo, pull_id| repo == "acme/widgets" && *pull_id == PullId::new("42"))
            .times(1)
            .returning(|_, _| Ok(vec!["src/lib.rs".to_owned()]));

        let context = build_context(&resource, &gateway).expect("context should build");
        assert_eq!(context.changed_files, vec!["src/lib.rs".to_owned()]);
    }
}
