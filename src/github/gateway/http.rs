//! Wire-level HTTP implementation of the review gateway.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::redirect::Policy;
use serde::Serialize;

use crate::github::error::GithubError;
use crate::github::models::{ApiPullRequest, PullId, PullRequestResource};

use super::{ReviewGateway, StatusState};

const ACCEPT_HEADER: &str = "application/vnd.github+json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("prvet/", env!("CARGO_PKG_VERSION"));

/// Review gateway backed by a blocking HTTP client.
///
/// All calls block until a response arrives or the request times out.
/// Redirects are not followed so membership probes can distinguish the
/// review system's redirect answer from a real success.
#[derive(Debug, Clone)]
pub struct HttpReviewGateway {
    http: Client,
    api_base: String,
    token: Option<String>,
}

impl HttpReviewGateway {
    /// Creates a gateway for the given API base URL and optional token.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Configuration`] when the HTTP client cannot
    /// be constructed.
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Result<Self, GithubError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|error| GithubError::Configuration {
                message: format!("failed to build HTTP client: {error}"),
            })?;

        let mut api_base = api_base.into();
        while api_base.ends_with('/') {
            api_base.pop();
        }

        Ok(Self {
            http,
            api_base,
            token,
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.authorise(self.http.get(url).header(reqwest::header::ACCEPT, ACCEPT_HEADER))
    }

    fn post_json<Body: Serialize + ?Sized>(&self, url: &str, body: &Body) -> RequestBuilder {
        self.authorise(
            self.http
                .post(url)
                .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
                .json(body),
        )
    }

    fn authorise(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn send(
        &self,
        operation: &str,
        builder: RequestBuilder,
    ) -> Result<reqwest::blocking::Response, GithubError> {
        builder.send().map_err(|error| GithubError::Network {
            message: format!("{operation} transport failed: {error}"),
        })
    }

    fn expect_success(
        operation: &str,
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, GithubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(api_error(operation, status, response))
    }
}

impl ReviewGateway for HttpReviewGateway {
    fn fetch_pull_request(&self, url: &str) -> Result<PullRequestResource, GithubError> {
        let response = self.send("pull request fetch", self.get(url))?;
        let response = Self::expect_success("pull request fetch", response)?;

        let body = response.text().map_err(|error| GithubError::Network {
            message: format!("pull request fetch body read failed: {error}"),
        })?;
        let api: ApiPullRequest =
            serde_json::from_str(&body).map_err(|error| GithubError::Decode {
                message: format!("pull request document is invalid: {error}"),
            })?;

        Ok(api.into())
    }

    fn list_changed_files(
        &self,
        repo_full_name: &str,
        pull_id: &PullId,
    ) -> Result<Vec<String>, GithubError> {
        let url = format!(
            "{}/repos/{repo_full_name}/pulls/{pull_id}/files?per_page=100",
            self.api_base
        );
        let response = self.send("changed files listing", self.get(&url))?;
        let response = Self::expect_success("changed files listing", response)?;

        let files: Vec<ApiChangedFile> =
            response.json().map_err(|error| GithubError::Decode {
                message: format!("changed files document is invalid: {error}"),
            })?;

        Ok(files.into_iter().map(|file| file.filename).collect())
    }

    fn is_org_member(&self, org: &str, user: &str) -> Result<bool, GithubError> {
        let url = format!("{}/orgs/{org}/members/{user}", self.api_base);
        let response = self.send("membership check", self.get(&url))?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::NOT_FOUND | StatusCode::FOUND => Ok(false),
            status => Err(api_error("membership check", status, response)),
        }
    }

    fn post_commit_status(
        &self,
        state: StatusState,
        description: &str,
        sha: &str,
        repo_full_name: &str,
    ) -> Result<(), GithubError> {
        let url = format!("{}/repos/{repo_full_name}/statuses/{sha}", self.api_base);
        let payload = CommitStatusRequest {
            state: state.as_str(),
            description,
        };
        let response = self.send("status update", self.post_json(&url, &payload))?;
        Self::expect_success("status update", response)?;
        Ok(())
    }

    fn post_issue_comment(
        &self,
        body: &str,
        pull_id: &PullId,
        repo_full_name: &str,
    ) -> Result<(), GithubError> {
        let url = format!(
            "{}/repos/{repo_full_name}/issues/{pull_id}/comments",
            self.api_base
        );
        let payload = IssueCommentRequest { body };
        let response = self.send("comment creation", self.post_json(&url, &payload))?;
        Self::expect_success("comment creation", response)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct CommitStatusRequest<'a> {
    state: &'a str,
    description: &'a str,
}

#[derive(Debug, Serialize)]
struct IssueCommentRequest<'a> {
    body: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ApiChangedFile {
    filename: String,
}

fn api_error(
    operation: &str,
    status: StatusCode,
    response: reqwest::blocking::Response,
) -> GithubError {
    let excerpt = response.text().map_or_else(
        |_| "(failed to read error response body)".to_owned(),
        |content| truncate_for_message(content.as_str(), 160),
    );

    GithubError::Api {
        message: format!(
            "{operation} failed with status {}: {excerpt}",
            status.as_u16()
        ),
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
