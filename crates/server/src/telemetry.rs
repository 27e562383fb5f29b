//! `tracing` subscriber setup.

use crate::config::{LogFormat, Settings};
use anyhow::Context as _;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Filter precedence: `DEBUG` forces `debug`; otherwise `RUST_LOG`; otherwise `LOG_LEVEL`.
///
/// # Errors
///
/// Returns an error if the configured level is not a valid filter directive, or if a global
/// subscriber is already installed.
pub fn init(settings: &Settings) -> anyhow::Result<()> {
    let filter = if settings.debug {
        EnvFilter::new("debug")
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(f) => f,
            Err(_) => EnvFilter::try_new(&settings.log_level)
                .with_context(|| format!("invalid LOG_LEVEL '{}'", settings.log_level))?,
        }
    };

    let registry = tracing_subscriber::registry().with(filter);
    match settings.log_format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
    .context("install tracing subscriber")
}
