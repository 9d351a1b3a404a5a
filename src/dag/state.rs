// src/dag/state.rs

//! Saving and restoring scheduler state.
//!
//! The document is JSON:
//!
//! ```json
//! {
//!   "max_tasks": 10,
//!   "tasks": [
//!     {
//!       "task_id": 2,
//!       "duration": 3.0,
//!       "start_time": null,
//!       "restarts": 0,
//!       "max_restarts": 1,
//!       "dependencies": [1],
//!       "status": "waiting"
//!     }
//!   ]
//! }
//! ```
//!
//! `duration` and `start_time` (the start delay) are seconds. Every job is
//! written, but only jobs that were not `completed` are rebuilt on load, and
//! their dependency lists only keep ids of other rebuilt jobs: an edge to a
//! job that had already completed is dropped. Work units are never written;
//! re-attach them with [`Scheduler::rebind_work`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dag::Scheduler;
use crate::errors::{Result, WavedagError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::job::{DEFAULT_MAX_RESTARTS, Job};
use crate::types::{JobId, JobStatus};

/// Top-level persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tasks: Option<usize>,
    #[serde(default)]
    pub tasks: Vec<JobRecord>,
}

/// One persisted job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub task_id: JobId,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub start_time: Option<f64>,
    #[serde(default)]
    pub restarts: u32,
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,
    #[serde(default)]
    pub dependencies: Vec<JobId>,
    pub status: JobStatus,
}

fn default_max_restarts() -> u32 {
    DEFAULT_MAX_RESTARTS
}

impl JobRecord {
    fn from_job(job: &Job) -> Self {
        Self {
            task_id: job.id(),
            duration: job.duration().map(|d| d.as_secs_f64()),
            start_time: job.start_delay().map(|d| d.as_secs_f64()),
            restarts: job.restarts(),
            max_restarts: job.max_restarts(),
            dependencies: job.dependencies().to_vec(),
            status: job.status(),
        }
    }

    /// A fresh `Waiting` job with this record's counters, no dependencies
    /// and no work unit.
    fn to_job(&self) -> Result<Job> {
        let mut job = Job::new(self.task_id)
            .with_restarts(self.restarts)
            .with_max_restarts(self.max_restarts);
        if let Some(delay) = secs_to_duration(self.task_id, "start_time", self.start_time)? {
            job = job.with_start_delay(delay);
        }
        if let Some(duration) = secs_to_duration(self.task_id, "duration", self.duration)? {
            job = job.with_duration(duration);
        }
        Ok(job)
    }
}

fn secs_to_duration(job: JobId, field: &str, secs: Option<f64>) -> Result<Option<Duration>> {
    secs.map(|s| {
        Duration::try_from_secs_f64(s).map_err(|e| {
            WavedagError::InvalidState(format!("task {job}: invalid `{field}` value {s}: {e}"))
        })
    })
    .transpose()
}

impl Scheduler {
    /// Snapshot every job, in arena order, regardless of status.
    pub fn snapshot(&self) -> StateDocument {
        StateDocument {
            max_tasks: Some(self.max_tasks),
            tasks: self.jobs.iter().map(JobRecord::from_job).collect(),
        }
    }

    /// Replace this scheduler's jobs with the non-completed jobs of `doc`.
    ///
    /// `max_tasks` is taken from the document when present. The capacity is
    /// not enforced here; a restored arena may hold more than `max_tasks`.
    pub fn restore(&mut self, doc: &StateDocument) -> Result<()> {
        let mut jobs = Vec::new();
        let mut index = HashMap::new();

        for record in doc.tasks.iter().filter(|r| r.status != JobStatus::Completed) {
            if index.contains_key(&record.task_id) {
                return Err(WavedagError::DuplicateJob(record.task_id));
            }
            index.insert(record.task_id, jobs.len());
            jobs.push((record, record.to_job()?));
        }

        let restored: HashSet<JobId> = index.keys().copied().collect();
        let jobs: Vec<Job> = jobs
            .into_iter()
            .map(|(record, job)| {
                let mut job = job.with_dependencies(record.dependencies.iter().copied());
                let dropped = job.retain_dependencies(|dep| restored.contains(&dep));
                if !dropped.is_empty() {
                    warn!(
                        job = job.id(),
                        ?dropped,
                        "dependencies on jobs not restored (completed before save) are dropped"
                    );
                }
                job
            })
            .collect();

        if let Some(max_tasks) = doc.max_tasks {
            self.max_tasks = max_tasks;
        }
        self.jobs = jobs;
        self.index = index;
        self.ready = VecDeque::new();

        debug!(
            restored = self.jobs.len(),
            skipped = doc.tasks.len() - self.jobs.len(),
            max_tasks = self.max_tasks,
            "scheduler state restored"
        );
        Ok(())
    }

    pub fn save_state(&self, path: impl AsRef<Path>) -> Result<()> {
        self.save_state_with(&RealFileSystem, path)
    }

    pub fn save_state_with(&self, fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs.write(path, json.as_bytes())?;
        info!(path = %path.display(), jobs = self.jobs.len(), "scheduler state saved");
        Ok(())
    }

    pub fn load_state(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.load_state_with(&RealFileSystem, path)
    }

    pub fn load_state_with(&mut self, fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = fs.read_to_string(path)?;
        let doc: StateDocument = serde_json::from_str(&contents)?;
        self.restore(&doc)?;
        info!(path = %path.display(), jobs = self.jobs.len(), "scheduler state loaded");
        Ok(())
    }
}
