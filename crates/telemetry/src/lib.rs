//! Tracing pipeline bootstrap.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use kuuburi_kernel::settings::{LogFormat, TelemetrySettings};

/// Initialize the global tracing subscriber from settings.
/// `RUST_LOG` overrides the configured filter when set.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
    };

    result.map_err(|error| anyhow!("failed to initialize tracing subscriber: {error}"))
}
