//! Structured logging setup for the CLI entrypoint.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initializes the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Events are
/// written to stderr so scheduler-captured stdout stays reserved for
/// validator output. Repeated initialization is ignored, which keeps the
/// call safe in tests.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();

    if let Err(error) = result {
        tracing::debug!("subscriber already initialized: {error}");
    }
}
