//! Authorization gating for pipeline runs.
//!
//! An untrusted webhook payload must never cause code execution without
//! passing this gate. The acting user is checked against a local admin
//! allow-list and then against organization memberships; comment-triggered
//! runs additionally require an explicit trigger token in the comment.

use std::fs;

use camino::Utf8Path;

use crate::github::gateway::ReviewGateway;
use crate::github::models::PullRequestResource;

use super::classify::WebhookPayload;
use super::error::PipelineError;

/// The token a comment must contain, as a whitespace-delimited word, to
/// trigger testing.
pub const TEST_TRIGGER: &str = "[test]";

/// Outcome of the authorization gate for one invocation.
///
/// Denials are not errors: the top-level driver maps both denial variants
/// to a clean zero-status termination so gated automation is never marked
/// as broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// The acting user may trigger testing.
    Granted {
        /// Login of the authorized user.
        user: String,
    },
    /// Nothing to do, e.g. a comment without the trigger token.
    DeniedSilently {
        /// Human-readable explanation for the logs.
        reason: String,
    },
    /// The user asked for testing but is not allow-listed.
    DeniedWithReason {
        /// Login of the denied user.
        user: String,
        /// Human-readable explanation for the logs.
        reason: String,
    },
}

/// Runs the authorization gate for the classified payload.
///
/// # Errors
///
/// Returns [`PipelineError::MalformedPayload`] when no acting user can be
/// determined and [`PipelineError::Configuration`] when an allow-list
/// file cannot be read.
pub fn authorize<Gateway>(
    payload: &WebhookPayload,
    resource: &PullRequestResource,
    secret_dir: &Utf8Path,
    gateway: &Gateway,
) -> Result<AuthorizationDecision, PipelineError>
where
    Gateway: ReviewGateway,
{
    let user = acting_user(payload, resource)?;

    if let WebhookPayload::IssueComment(event) = payload
        && !contains_trigger(&event.comment.body)
    {
        return Ok(AuthorizationDecision::DeniedSilently {
            reason: format!("comment does not contain the trigger token {TEST_TRIGGER}"),
        });
    }

    let admins = read_allow_list(&secret_dir.join("users"))?;
    if admins.iter().any(|admin| admin == &user) {
        return Ok(AuthorizationDecision::Granted { user });
    }

    let orgs = read_allow_list(&secret_dir.join("orgs"))?;
    for org in &orgs {
        match gateway.is_org_member(org, &user) {
            Ok(true) => return Ok(AuthorizationDecision::Granted { user }),
            Ok(false) => {}
            Err(error) => {
                tracing::warn!(org = %org, user = %user, "membership query failed: {error}");
            }
        }
    }

    let reason = format!("user {user} is not in the admin or organization allow-lists");
    Ok(AuthorizationDecision::DeniedWithReason { user, reason })
}

/// Determines the acting user: the pull request author for pull-request
/// events, the comment author for comment events.
fn acting_user(
    payload: &WebhookPayload,
    resource: &PullRequestResource,
) -> Result<String, PipelineError> {
    let login = match payload {
        WebhookPayload::PullRequest(_) => resource.author.clone(),
        WebhookPayload::IssueComment(event) => event.comment.user.login.clone(),
    };

    login.ok_or_else(|| PipelineError::MalformedPayload {
        message: "payload does not identify an acting user".to_owned(),
    })
}

fn contains_trigger(body: &str) -> bool {
    body.split_whitespace().any(|word| word == TEST_TRIGGER)
}

fn read_allow_list(path: &Utf8Path) -> Result<Vec<String>, PipelineError> {
    let contents = fs::read_to_string(path).map_err(|error| PipelineError::Configuration {
        message: format!("cannot read allow-list {path}: {error}"),
    })?;

    Ok(contents
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    use crate::github::MockReviewGateway;
    use crate::github::error::GithubError;
    use crate::github::models::PullRequestResource;
    use crate::pipeline::classify::{WebhookPayload, parse_payload};
    use crate::pipeline::error::PipelineError;

    use super::{AuthorizationDecision, authorize, contains_trigger};

    fn pull_request_json(author: &str) -> serde_json::Value {
        json!({
            "number": 42,
            "title": "Add widget",
            "body": null,
            "url": "https://api.example.com/repos/acme/widgets/pulls/42",
            "user": {"login": author},
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
        })
    }

    fn pull_request_payload(author: &str) -> WebhookPayload {
        let raw = json!({"pull_request": pull_request_json(author)}).to_string();
        parse_payload(&raw).expect("payload should parse")
    }

    fn comment_payload(body: &str, author: &str) -> WebhookPayload {
        let raw = json!({
            "issue": {
                "pull_request": {"url": "https://api.example.com/repos/acme/widgets/pulls/42"}
            },
            "comment": {"body": body, "user": {"login": author}}
        })
        .to_string();
        parse_payload(&raw).expect("payload should parse")
    }

    fn resource(author: &str) -> PullRequestResource {
        let api: crate::github::models::ApiPullRequest =
            serde_json::from_value(pull_request_json(author)).expect("sample should decode");
        api.into()
    }

    struct SecretDir {
        _dir: TempDir,
        path: Utf8PathBuf,
    }

    fn secret_dir(users: &str, orgs: &str) -> SecretDir {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temp dir path should be UTF-8");
        std::fs::write(path.join("users"), users).expect("users file should be written");
        std::fs::write(path.join("orgs"), orgs).expect("orgs file should be written");
        SecretDir { _dir: dir, path }
    }

    #[fixture]
    fn gateway() -> MockReviewGateway {
        MockReviewGateway::new()
    }

    #[rstest]
    #[case::bare_token("[test]", true)]
    #[case::token_in_sentence("please [test] this", true)]
    #[case::token_with_newline("retrigger\n[test]", true)]
    #[case::no_token("looks good", false)]
    #[case::token_embedded_in_word("pre[test]post", false)]
    #[case::empty("", false)]
    fn trigger_token_must_be_a_separate_word(#[case] body: &str, #[case] expected: bool) {
        assert_eq!(contains_trigger(body), expected);
    }

    #[rstest]
    fn admin_allow_list_grants_without_membership_queries(gateway: MockReviewGateway) {
        let secrets = secret_dir("octocat,hubber", "acme");
        let payload = pull_request_payload("octocat");

        let decision = authorize(&payload, &resource("octocat"), &secrets.path, &gateway)
            .expect("gate should run");

        assert_eq!(
            decision,
            AuthorizationDecision::Granted {
                user: "octocat".to_owned()
            }
        );
    }

    #[rstest]
    fn comment_without_trigger_is_denied_silently(gateway: MockReviewGateway) {
        let secrets = secret_dir("octocat", "acme");
        let payload = comment_payload("looks good", "octocat");

        let decision = authorize(&payload, &resource("someone"), &secrets.path, &gateway)
            .expect("gate should run");

        assert!(
            matches!(decision, AuthorizationDecision::DeniedSilently { .. }),
            "expected silent denial, got {decision:?}"
        );
    }

    #[rstest]
    fn org_membership_grants_comment_triggered_runs() {
        let secrets = secret_dir("octocat", "acme,beta");
        let payload = comment_payload("please [test] this", "drone");

        let mut gateway = MockReviewGateway::new();
        gateway
            .expect_is_org_member()
            .withf(|org, user| org == "acme" && user == "drone")
            .times(1)
            .returning(|_, _| Ok(false));
        gateway
            .expect_is_org_member()
            .withf(|org, user| org == "beta" && user == "drone")
            .times(1)
            .returning(|_, _| Ok(true));

        let decision = authorize(&payload, &resource("someone"), &secrets.path, &gateway)
            .expect("gate should run");

        assert_eq!(
            decision,
            AuthorizationDecision::Granted {
                user: "drone".to_owned()
            }
        );
    }

    #[rstest]
    fn unlisted_users_are_denied_with_a_reason() {
        let secrets = secret_dir("octocat", "acme");
        let payload = comment_payload("please [test] this", "drone");

        let mut gateway = MockReviewGateway::new();
        gateway
            .expect_is_org_member()
            .returning(|_, _| Ok(false));

        let decision = authorize(&payload, &resource("someone"), &secrets.path, &gateway)
            .expect("gate should run");

        assert!(
            matches!(
                decision,
                AuthorizationDecision::DeniedWithReason { ref user, .. } if user == "drone"
            ),
            "expected reasoned denial, got {decision:?}"
        );
    }

    #[rstest]
    fn failed_membership_queries_keep_the_gate_closed() {
        let secrets = secret_dir("", "acme");
        let payload = comment_payload("[test]", "drone");

        let mut gateway = MockReviewGateway::new();
        gateway.expect_is_org_member().returning(|_, _| {
            Err(GithubError::Network {
                message: "connection reset".to_owned(),
            })
        });

        let decision = authorize(&payload, &resource("someone"), &secrets.path, &gateway)
            .expect("gate should run");

        assert!(
            matches!(decision, AuthorizationDecision::DeniedWithReason { .. }),
            "expected reasoned denial, got {decision:?}"
        );
    }

    #[rstest]
    fn unreadable_allow_list_is_a_configuration_error(gateway: MockReviewGateway) {
        let dir = TempDir::new().expect("temp dir should be created");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .expect("temp dir path should be UTF-8");
        let payload = pull_request_payload("octocat");

        let error = authorize(&payload, &resource("octocat"), &path, &gateway)
            .expect_err("missing users file should error");

        assert!(
            matches!(error, PipelineError::Configuration { .. }),
            "expected Configuration error, got {error:?}"
        );
    }

    #[rstest]
    fn missing_acting_user_is_a_malformed_payload(gateway: MockReviewGateway) {
        let secrets = secret_dir("octocat", "acme");
        let raw = json!({
            "issue": {"pull_request": {"url": "https://api.example.com/x"}},
            "comment": {"body": "[test]", "user": {}}
        })
        .to_string();
        let payload = parse_payload(&raw).expect("payload should parse");

        let error = authorize(&payload, &resource("someone"), &secrets.path, &gateway)
            .expect_err("missing login should error");

        assert!(
            matches!(error, PipelineError::MalformedPayload { .. }),
            "expected MalformedPayload, got {error:?}"
        );
    }
}
