// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::dag::DEFAULT_MAX_TASKS;
use crate::job::{DEFAULT_MAX_RESTARTS, Job};
use crate::types::JobId;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [scheduler]
/// max_tasks = 10
/// state_file = ".wavedag/state.json"
///
/// [[job]]
/// id = 1
/// work = "create_dir"
/// args = { path = "tmp" }
/// duration = 0.5
///
/// [[job]]
/// id = 2
/// work = "write_file"
/// args = { path = "tmp/a.txt", content = "hello" }
/// after = [1]
/// ```
///
/// All sections are optional at parse time; validation then requires at
/// least one job.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub scheduler: SchedulerSection,

    /// All jobs from `[[job]]`, in file order.
    #[serde(default)]
    pub job: Vec<JobConfig>,
}

/// Validated configuration; only obtainable via `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub scheduler: SchedulerSection,
    pub job: Vec<JobConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(scheduler: SchedulerSection, job: Vec<JobConfig>) -> Self {
        Self { scheduler, job }
    }

    pub fn job(&self, id: JobId) -> Option<&JobConfig> {
        self.job.iter().find(|j| j.id == id)
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    /// Maximum number of jobs, and of jobs per wave.
    #[serde(default = "default_max_tasks")]
    pub max_tasks: usize,

    /// Where run state is saved after a run and resumed from on start.
    /// No state is kept when unset.
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Reject cycles when jobs are added to the scheduler. Config files are
    /// always checked for cycles during validation regardless.
    #[serde(default = "default_detect_cycles")]
    pub detect_cycles: bool,
}

fn default_max_tasks() -> usize {
    DEFAULT_MAX_TASKS
}

fn default_detect_cycles() -> bool {
    true
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            max_tasks: default_max_tasks(),
            state_file: None,
            detect_cycles: default_detect_cycles(),
        }
    }
}

/// `[[job]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub id: JobId,

    /// Name of the work unit in the registry (e.g. `"shell"`, `"create_dir"`).
    pub work: String,

    /// Named arguments passed to the work unit.
    #[serde(default)]
    pub args: BTreeMap<String, String>,

    /// Ids of jobs that must complete first.
    #[serde(default)]
    pub after: Vec<JobId>,

    /// Seconds to wait before every attempt.
    #[serde(default)]
    pub duration: Option<f64>,

    /// Seconds to wait once before the first attempt.
    #[serde(default)]
    pub start_delay: Option<f64>,

    #[serde(default)]
    pub max_restarts: Option<u32>,

    /// Attempts already consumed; normally left at 0.
    #[serde(default)]
    pub restarts: u32,
}

impl JobConfig {
    pub fn effective_max_restarts(&self) -> u32 {
        self.max_restarts.unwrap_or(DEFAULT_MAX_RESTARTS)
    }

    /// Build the job without its work unit. Timings are assumed validated.
    pub fn to_job(&self) -> Job {
        let mut job = Job::new(self.id)
            .with_dependencies(self.after.iter().copied())
            .with_max_restarts(self.effective_max_restarts())
            .with_restarts(self.restarts);
        if let Some(delay) = self.start_delay.and_then(|s| Duration::try_from_secs_f64(s).ok()) {
            job = job.with_start_delay(delay);
        }
        if let Some(duration) = self.duration.and_then(|s| Duration::try_from_secs_f64(s).ok()) {
            job = job.with_duration(duration);
        }
        job
    }
}
