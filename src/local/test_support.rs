//! Test-support utilities for working-tree synchronization flows.

use std::sync::Mutex;

use crate::github::models::PullId;

use super::{SourceControl, SyncError};

/// Deterministic source-control double that records the operations the
/// pipeline performs instead of touching a working tree.
#[derive(Debug)]
pub struct RecordingSourceControl {
    merge_commit: String,
    operations: Mutex<Vec<String>>,
}

impl RecordingSourceControl {
    /// Creates a double that resolves every pull request to the given
    /// merge commit.
    #[must_use]
    pub fn new(merge_commit: impl Into<String>) -> Self {
        Self {
            merge_commit: merge_commit.into(),
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Returns the recorded operations in invocation order.
    ///
    /// # Panics
    ///
    /// Panics when the internal log mutex is poisoned, which only happens
    /// after another test thread panicked mid-record.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.operations
            .lock()
            .map(|log| log.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn record(&self, operation: String) {
        if let Ok(mut log) = self.operations.lock() {
            log.push(operation);
        }
    }
}

impl SourceControl for RecordingSourceControl {
    fn fetch_all(&self) -> Result<(), SyncError> {
        self.record("fetch".to_owned());
        Ok(())
    }

    fn resolve_merge_commit(&self, pull_id: &PullId) -> Result<String, SyncError> {
        self.record(format!("resolve {pull_id}"));
        Ok(self.merge_commit.clone())
    }

    fn force_checkout(&self, sha: &str) -> Result<(), SyncError> {
        self.record(format!("checkout {sha}"));
        Ok(())
    }
}
