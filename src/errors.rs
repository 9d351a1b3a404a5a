// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::JobId;

#[derive(Error, Debug)]
pub enum WavedagError {
    #[error("Scheduler is full: cannot hold more than {max_tasks} jobs")]
    CapacityExceeded { max_tasks: usize },

    #[error("Job {0} has no work unit bound")]
    MissingWorkUnit(JobId),

    #[error("Job {job} work unit failed: {message}")]
    WorkUnitFailure { job: JobId, message: String },

    #[error("Job {job} exhausted its retry budget after {attempts} attempt(s)")]
    RetryBudgetExhausted { job: JobId, attempts: u32 },

    #[error("Job {0} is already registered")]
    DuplicateJob(JobId),

    #[error("Job not found: {0}")]
    UnknownJob(JobId),

    #[error("Cycle detected in job graph: {0}")]
    DagCycle(String),

    #[error("Unknown work unit: {0}")]
    UnknownWorkUnit(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("State document error: {0}")]
    StateFormat(#[from] serde_json::Error),

    #[error("Invalid state document: {0}")]
    InvalidState(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WavedagError>;
