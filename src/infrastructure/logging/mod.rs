// Logging module - Logging infrastructure
use crate::domain::error::{ProbeError, ProbeResult};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter used when `RUST_LOG` is not set.
pub fn default_filter(log_level: &str, verbose: bool) -> String {
    let level = if verbose {
        "debug"
    } else {
        match log_level {
            "error" | "warn" | "info" | "debug" | "trace" => log_level,
            _ => "info",
        }
    };
    format!("mtdprobe={},warn", level)
}

/// Initialize logging system. Log lines go to stderr so stdout carries
/// only probe output.
pub fn init_logging(log_level: &str, verbose: bool) -> ProbeResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level, verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .with_level(true)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init()
        .map_err(|e| ProbeError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;

    tracing::debug!("mtdprobe logging initialized");
    Ok(())
}
