// src/cli.rs

//! Command-line flags for the `wavedag` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `wavedag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "wavedag",
    version,
    about = "Run a dependency graph of jobs in bounded waves, with retries and resumable state.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the job graph config file (TOML).
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// State file to resume from and save to.
    ///
    /// Overrides `[scheduler].state_file` from the config.
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// Job capacity and wave size.
    ///
    /// Overrides `[scheduler].max_tasks` from the config, and the value saved
    /// in the state file when resuming.
    #[arg(long, value_name = "N")]
    pub max_tasks: Option<usize>,

    /// Ignore an existing state file and start from the config.
    #[arg(long)]
    pub fresh: bool,

    /// Log verbosity for every target.
    ///
    /// Without it, `WAVEDAG_LOG` is read, then `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the job graph, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Value of `--log-level`.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// The level as a tracing filter directive.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
