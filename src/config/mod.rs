// src/config/mod.rs

//! Configuration loading and validation for wavedag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate ids, dependencies and acyclicity (`validate.rs`).
//! - Build or re-bind a scheduler from the config (`build.rs`).

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use build::{bind_restored, build_scheduler};
pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, JobConfig, RawConfigFile, SchedulerSection};
pub use validate::validate_raw_config;
