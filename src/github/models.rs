//! Data models representing the pull request under test.
//!
//! Wire payloads are decoded into `Api*` structs and converted into the
//! domain types consumed by the pipeline. Scalar identifiers are kept as
//! strings throughout so values arrive in validator environments exactly
//! as the review system sent them, with no precision or type-coercion
//! surprises.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// Opaque pull request identifier.
///
/// Compared and formatted, never used arithmetically. Decoded from either
/// a JSON string or a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullId(String);

impl PullId {
    /// Wraps an identifier value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PullId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// One side of the pull request: either the merge target or the proposed
/// head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchTarget {
    /// Commit SHA of this side.
    pub sha: String,
    /// Ref name, usually a branch name.
    pub ref_name: String,
    /// Display label, e.g. `owner:branch`.
    pub label: String,
    /// Full repository name in `namespace/reponame` form.
    pub repo_full_name: String,
}

/// The canonical subject of one pipeline invocation.
///
/// Once constructed, `base` and `head` are fully populated; payloads with
/// partial branch data are rejected at the decode boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestResource {
    /// Pull request identifier, carried as an opaque string.
    pub number: PullId,
    /// Title of the pull request.
    pub title: String,
    /// Description body, normalised to an empty string when absent.
    pub body: String,
    /// API URL of the pull request.
    pub url: String,
    /// Login of the pull request author, when the payload provides one.
    pub author: Option<String>,
    /// Merge target.
    pub base: BranchTarget,
    /// Proposed head.
    pub head: BranchTarget,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    #[serde(deserialize_with = "scalar_string")]
    pub(crate) number: String,
    pub(crate) title: String,
    pub(crate) body: Option<String>,
    pub(crate) url: String,
    pub(crate) user: Option<ApiUser>,
    pub(crate) base: ApiBranch,
    pub(crate) head: ApiBranch,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiBranch {
    pub(crate) sha: String,
    #[serde(rename = "ref")]
    pub(crate) ref_name: String,
    pub(crate) label: String,
    pub(crate) repo: ApiRepo,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiRepo {
    pub(crate) full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: Option<String>,
}

impl From<ApiPullRequest> for PullRequestResource {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            number: PullId::new(value.number),
            title: value.title,
            body: value.body.unwrap_or_default(),
            url: value.url,
            author: value.user.and_then(|user| user.login),
            base: value.base.into(),
            head: value.head.into(),
        }
    }
}

impl From<ApiBranch> for BranchTarget {
    fn from(value: ApiBranch) -> Self {
        Self {
            sha: value.sha,
            ref_name: value.ref_name,
            label: value.label,
            repo_full_name: value.repo.full_name,
        }
    }
}

/// Decodes a scalar JSON value into its string representation.
///
/// Accepts strings, integers, and floats so identifier fields survive
/// exactly as received regardless of how the review system encodes them.
pub(crate) fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a string or numeric scalar")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.to_owned())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}
