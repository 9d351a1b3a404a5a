// src/logging.rs

//! Logging for the `wavedag` binary.
//!
//! The filter is picked from, in order:
//! 1. `--log-level` (applies to every target);
//! 2. the `WAVEDAG_LOG` environment variable, which takes full
//!    `EnvFilter` directives such as `wavedag::dag=debug,info`;
//! 3. `info`.
//!
//! Events go to stderr so the run summary on stdout stays clean. The library
//! only emits events; installing the subscriber is left to the binary (or to
//! the test harness).

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable read when `--log-level` is not given.
pub const LOG_ENV: &str = "WAVEDAG_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    fmt()
        .with_env_filter(filter_for(cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn filter_for(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}
