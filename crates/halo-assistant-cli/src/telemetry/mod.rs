//! Telemetry and tracing configuration.

mod tracing;

use anyhow::Context;

/// Initializes the tracing subscriber.
///
/// # Errors
///
/// Returns an error if the tracing subscriber fails to initialize.
pub(crate) fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    tracing::init_tracing(verbose).context("Failed to initialize tracing")
}
