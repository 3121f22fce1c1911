//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.prvet.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PRVET_PAYLOAD`, `PRVET_SECRET_DIR`,
//!    `PRVET_TOKEN`, or the legacy scheduler names `GITHUB_WEBHOOK_PAYLOAD`,
//!    `WHITELIST_SECRET_DIR`, and `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--payload`, `--secret-dir`, and friends
//!
//! # Configuration File
//!
//! Place `.prvet.toml` in the current directory, home directory, or
//! XDG config directory with:
//!
//! ```toml
//! secret_dir = "/etc/prvet/secrets"
//! validator_dir = "validators"
//! api_base = "https://api.github.com"
//! ```

use std::env;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::pipeline::error::PipelineError;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const DEFAULT_VALIDATOR_DIR: &str = "validators";

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `PRVET_PAYLOAD` or `GITHUB_WEBHOOK_PAYLOAD` (legacy): Webhook payload JSON
/// - `PRVET_SECRET_DIR` or `WHITELIST_SECRET_DIR` (legacy): Allow-list directory
/// - `PRVET_TOKEN` or `GITHUB_TOKEN` (legacy): Authentication token
/// - `PRVET_API_BASE` or `--api-base`: Review-system API base URL
/// - `PRVET_VALIDATOR_DIR` or `--validator-dir`: Validator directory
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PRVET",
    discovery(
        dotfile_name = ".prvet.toml",
        config_file_name = "prvet.toml",
        app_name = "prvet"
    )
)]
pub struct PrvetConfig {
    /// Webhook payload delivered by the scheduler, as a JSON document.
    ///
    /// Can be provided via:
    /// - CLI: `--payload <JSON>` or `-p <JSON>`
    /// - Environment: `PRVET_PAYLOAD` or `GITHUB_WEBHOOK_PAYLOAD` (legacy)
    #[ortho_config(cli_short = 'p')]
    pub payload: Option<String>,

    /// Directory holding the `users` and `orgs` allow-list files.
    ///
    /// Can be provided via:
    /// - CLI: `--secret-dir <DIR>` or `-s <DIR>`
    /// - Environment: `PRVET_SECRET_DIR` or `WHITELIST_SECRET_DIR` (legacy)
    /// - Config file: `secret_dir = "..."`
    #[ortho_config(cli_short = 's')]
    pub secret_dir: Option<String>,

    /// Personal access token for review-system API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PRVET_TOKEN` or `GITHUB_TOKEN` (legacy)
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Base URL of the review-system API.
    ///
    /// Can be provided via:
    /// - CLI: `--api-base <URL>`
    /// - Environment: `PRVET_API_BASE`
    /// - Config file: `api_base = "..."`
    pub api_base: Option<String>,

    /// Directory containing the validator files to execute.
    ///
    /// Can be provided via:
    /// - CLI: `--validator-dir <DIR>`
    /// - Environment: `PRVET_VALIDATOR_DIR`
    /// - Config file: `validator_dir = "..."`
    pub validator_dir: Option<String>,
}

impl PrvetConfig {
    /// Resolves the raw webhook payload from configuration or the legacy
    /// `GITHUB_WEBHOOK_PAYLOAD` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Input`] when no source provides a
    /// non-empty payload; without one there is nothing to classify.
    pub fn resolve_payload(&self) -> Result<String, PipelineError> {
        self.payload
            .clone()
            .or_else(|| env::var("GITHUB_WEBHOOK_PAYLOAD").ok())
            .filter(|payload| !payload.trim().is_empty())
            .ok_or_else(|| PipelineError::Input {
                message: "no webhook payload provided".to_owned(),
            })
    }

    /// Resolves the allow-list directory from configuration or the legacy
    /// `WHITELIST_SECRET_DIR` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when no source provides a
    /// directory; authorization cannot run without the allow-lists.
    pub fn resolve_secret_dir(&self) -> Result<Utf8PathBuf, PipelineError> {
        self.secret_dir
            .clone()
            .or_else(|| env::var("WHITELIST_SECRET_DIR").ok())
            .filter(|dir| !dir.is_empty())
            .map(Utf8PathBuf::from)
            .ok_or_else(|| PipelineError::Configuration {
                message: "no allow-list secret directory configured".to_owned(),
            })
    }

    /// Resolves the API token from configuration or the legacy
    /// `GITHUB_TOKEN` environment variable. Unauthenticated operation is
    /// permitted; membership queries then only see public members.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.is_empty())
    }

    /// Returns the review-system API base URL, defaulting to the public
    /// GitHub endpoint.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    /// Returns the validator directory, defaulting to `validators` in the
    /// working directory.
    #[must_use]
    pub fn validator_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(
            self.validator_dir
                .as_deref()
                .unwrap_or(DEFAULT_VALIDATOR_DIR),
        )
    }
}
