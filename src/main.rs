//! Prvet CLI entrypoint for webhook-triggered pull request vetting.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use prvet::{
    GitCliSourceControl, HttpReviewGateway, Pipeline, PipelineError, PipelineOutcome, PrvetConfig,
    SystemProcessRunner, telemetry,
};

fn main() -> ExitCode {
    telemetry::init();

    match run() {
        Ok(PipelineOutcome::Completed) => ExitCode::SUCCESS,
        Ok(PipelineOutcome::Skipped { reason }) => {
            tracing::info!("run skipped: {reason}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::from(error.exit_code());
            }
            ExitCode::from(error.exit_code())
        }
    }
}

fn run() -> Result<PipelineOutcome, PipelineError> {
    let config = load_config()?;

    let gateway = HttpReviewGateway::new(config.api_base(), config.resolve_token())
        .map_err(PipelineError::Api)?;
    let runner = SystemProcessRunner;
    let source_control = GitCliSourceControl::new(&runner);

    let pipeline = Pipeline::new(&config, &gateway, &source_control, &runner);
    pipeline.run()
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] when ortho-config fails to
/// parse arguments or load configuration files.
fn load_config() -> Result<PrvetConfig, PipelineError> {
    PrvetConfig::load().map_err(|error| PipelineError::Configuration {
        message: error.to_string(),
    })
}
