//! The orchestration pipeline.
//!
//! One invocation moves through a fixed sequence: classify the payload,
//! gate on authorization, build the execution context, report a pending
//! status, synchronize the working tree, run the validators, and report
//! the verdict. Exactly one terminal outcome is produced per invocation.

pub mod authorize;
pub mod classify;
pub mod context;
pub mod error;
pub mod report;
pub mod validators;

pub use authorize::{AuthorizationDecision, TEST_TRIGGER};
pub use classify::WebhookPayload;
pub use context::ExecutionContext;
pub use error::PipelineError;
pub use validators::{ValidationOutcome, Validator};

use crate::config::PrvetConfig;
use crate::github::gateway::ReviewGateway;
use crate::local::{SourceControl, SyncError};
use crate::process::ProcessRunner;

use report::ResultReporter;

/// Terminal outcome of a pipeline invocation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every validator passed and the verdict was reported.
    Completed,
    /// Authorization declined the run; nothing was executed.
    Skipped {
        /// Human-readable explanation for the logs.
        reason: String,
    },
}

/// Orchestrates one webhook-triggered validation run.
pub struct Pipeline<'deps, Gateway, Source, Runner>
where
    Gateway: ReviewGateway,
    Source: SourceControl,
    Runner: ProcessRunner,
{
    config: &'deps PrvetConfig,
    gateway: &'deps Gateway,
    source_control: &'deps Source,
    runner: &'deps Runner,
}

impl<'deps, Gateway, Source, Runner> Pipeline<'deps, Gateway, Source, Runner>
where
    Gateway: ReviewGateway,
    Source: SourceControl,
    Runner: ProcessRunner,
{
    /// Creates a pipeline over the given collaborators.
    #[must_use]
    pub const fn new(
        config: &'deps PrvetConfig,
        gateway: &'deps Gateway,
        source_control: &'deps Source,
        runner: &'deps Runner,
    ) -> Self {
        Self {
            config,
            gateway,
            source_control,
            runner,
        }
    }

    /// Runs the pipeline to its single terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] describing the first fatal failure;
    /// see [`PipelineError::exit_code`] for the process-level mapping.
    pub fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let raw_payload = self.config.resolve_payload()?;
        let payload = classify::parse_payload(&raw_payload)?;
        let resource = classify::classify(&payload, self.gateway)?;
        tracing::info!(
            pull_id = %resource.number,
            repo = %resource.base.repo_full_name,
            "pull request resolved"
        );

        let secret_dir = self.config.resolve_secret_dir()?;
        match authorize::authorize(&payload, &resource, &secret_dir, self.gateway)? {
            AuthorizationDecision::Granted { user } => {
                tracing::info!(user = %user, "authorization granted");
            }
            AuthorizationDecision::DeniedSilently { reason } => {
                return Ok(PipelineOutcome::Skipped { reason });
            }
            AuthorizationDecision::DeniedWithReason { user, reason } => {
                tracing::warn!(user = %user, "{reason}");
                return Ok(PipelineOutcome::Skipped { reason });
            }
        }

        let mut execution_context = context::build_context(&resource, self.gateway)?;

        let reporter = ResultReporter::new(self.gateway);
        reporter.report_pending(&resource)?;

        let current_sha = match self.synchronize(&resource) {
            Ok(sha) => sha,
            Err(error) => {
                reporter.report_aborted(&resource);
                return Err(error.into());
            }
        };
        tracing::info!(sha = %current_sha, "working tree synchronized");
        execution_context.set_current_sha(current_sha);

        let outcomes = validators::run_all(
            &self.config.validator_dir(),
            &execution_context,
            self.runner,
        )?;
        let total = outcomes.len();
        let failed = outcomes.iter().filter(|o| !o.succeeded).count();
        let success = failed == 0;

        reporter
            .report_final(success, &resource)
            .map_err(PipelineError::Report)?;

        if success {
            Ok(PipelineOutcome::Completed)
        } else {
            Err(PipelineError::ValidatorsFailed { failed, total })
        }
    }

    fn synchronize(
        &self,
        resource: &crate::github::models::PullRequestResource,
    ) -> Result<String, SyncError> {
        self.source_control.fetch_all()?;
        let sha = self.source_control.resolve_merge_commit(&resource.number)?;
        self.source_control.force_checkout(&sha)?;
        Ok(sha)
    }
}
