//! Working-tree synchronization against the pull-request merge ref.
//!
//! This module provides a trait-based abstraction over the narrow set of
//! version-control operations the pipeline needs, along with an
//! implementation that shells out to the git CLI. The trait enables
//! dependency injection for testing and leaves room for a library-based
//! backend without touching the pipeline.

mod git_cli;

pub mod error;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::SyncError;
pub use git_cli::GitCliSourceControl;

use crate::github::models::PullId;

/// Version-control operations required to prepare the working tree.
///
/// The working tree is a single globally shared mutable resource; the
/// invoking scheduler must ensure only one synchronizer runs per tree.
#[cfg_attr(test, mockall::automock)]
pub trait SourceControl: Send + Sync {
    /// Fetches tags, branch heads, and pull-request merge refs from the
    /// remote.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the fetch cannot run or exits non-zero.
    fn fetch_all(&self) -> Result<(), SyncError>;

    /// Resolves the merge-commit SHA for the given pull request.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when revision parsing fails or produces no
    /// commit.
    fn resolve_merge_commit(&self, pull_id: &PullId) -> Result<String, SyncError>;

    /// Forces the working tree to the given commit.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] when the checkout cannot run or exits
    /// non-zero.
    fn force_checkout(&self, sha: &str) -> Result<(), SyncError>;
}
