//! Tracing subscriber setup

use drivepush_core::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Effective filter directive for a verbosity count
///
/// `0` keeps the configured level, `1` is debug, anything higher is trace.
pub fn filter_directive(config: &LoggingConfig, verbosity: u8) -> &str {
    match verbosity {
        0 => config.level.as_str(),
        1 => "debug",
        _ => "trace",
    }
}

/// Installs the global fmt subscriber
///
/// `RUST_LOG` takes precedence over both the configuration and the
/// verbosity count.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init(config: &LoggingConfig, verbosity: u8) -> anyhow::Result<()> {
    let directive = filter_directive(config, verbosity);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
