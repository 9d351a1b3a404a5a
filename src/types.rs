use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable integer identity of a job within one scheduler.
pub type JobId = u64;

/// Lifecycle status of a job.
///
/// - `Waiting`: initial state; the job has not been dispatched yet.
/// - `Running`: dispatched in the current wave, attempts in progress.
/// - `Completed`: an attempt exhausted the work unit without failing.
/// - `Failed`: the last attempt failed. While retry budget remains this is
///   transient; once the budget is spent it is permanent.
///
/// The lowercase serde names are the persisted wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Waiting,
    Running,
    Completed,
    Failed,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Waiting
    }
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Waiting => "waiting",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "waiting" => Ok(JobStatus::Waiting),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!(
                "invalid job status: {other} (expected \"waiting\", \"running\", \"completed\" or \"failed\")"
            )),
        }
    }
}
