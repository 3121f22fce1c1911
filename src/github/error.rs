//! Error types exposed by the review-system client layer.

use thiserror::Error;

/// Errors surfaced while communicating with the review system.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GithubError {
    /// The HTTP client could not be constructed.
    #[error("review-system client configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Networking failed before a response was received.
    #[error("network error talking to the review system: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The review system answered with a non-success status.
    #[error("review-system API error: {message}")]
    Api {
        /// Response status and body excerpt describing the failure.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("review-system response decoding failed: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },
}
