//! Structured logging setup.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once.

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// Build the filter: `RUST_LOG` wins, otherwise the configured level for this
/// crate and `warn` for dependencies.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("continual={},warn", config.level)))
}

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = env_filter(config);

    if config.json {
        let fmt_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_line_number(true)
            .with_thread_names(true);
        Registry::default()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    } else {
        let fmt_layer = fmt::layer().with_target(true).with_line_number(true);
        Registry::default()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_ok()
    }
}
