//! Prvet library crate providing webhook-triggered pull request vetting.
//!
//! The library classifies GitHub-style webhook payloads, gates runs on an
//! allow-list authorization check, synchronizes a local working tree to
//! the pull request's merge commit, executes a directory of validator
//! programs, and reports the verdict back to the review system.

pub mod config;
pub mod github;
pub mod local;
pub mod pipeline;
pub mod process;
pub mod telemetry;

pub use config::PrvetConfig;
pub use github::{GithubError, HttpReviewGateway, ReviewGateway, StatusState};
pub use local::{GitCliSourceControl, SourceControl, SyncError};
pub use pipeline::{Pipeline, PipelineError, PipelineOutcome};
pub use process::{ProcessRunner, SystemProcessRunner};
