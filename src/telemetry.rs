//! Tracing subscriber setup

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Filter directive for the configured level; `verbose` forces debug output
#[must_use]
pub fn filter_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("{level},tower_http=info,hyper=warn,reqwest=warn")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the config.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(config, verbose)))
        .context("Invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        _ => registry.with(fmt::layer().with_target(false)).try_init(),
    }
    .context("Failed to install tracing subscriber")
}
