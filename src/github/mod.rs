//! Review-system client: models, errors, and the gateway trait.

pub mod error;
pub mod gateway;
pub mod models;

pub use error::GithubError;
pub use gateway::{HttpReviewGateway, ReviewGateway, StatusState};
pub use models::{BranchTarget, PullId, PullRequestResource};

#[cfg(test)]
pub(crate) use gateway::MockReviewGateway;
