// src/job/model.rs

//! The job entity owned by the scheduler's arena.

use std::time::Duration;

use tracing::{debug, warn};

use crate::job::run::{JobRun, RunReport};
use crate::types::{JobId, JobStatus};
use crate::work::BoundWork;

/// Number of extra attempts a job gets when none is configured.
pub const DEFAULT_MAX_RESTARTS: u32 = 1;

/// A schedulable unit of work.
///
/// Dependencies are ids resolved against the scheduler that owns the job; a
/// job never owns the jobs it depends on.
#[derive(Debug, Clone)]
pub struct Job {
    id: JobId,
    status: JobStatus,
    dependencies: Vec<JobId>,
    restarts: u32,
    max_restarts: u32,
    start_delay: Option<Duration>,
    duration: Option<Duration>,
    work: Option<BoundWork>,
}

impl Job {
    /// A `Waiting` job with no dependencies and no work bound yet.
    pub fn new(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Waiting,
            dependencies: Vec::new(),
            restarts: 0,
            max_restarts: DEFAULT_MAX_RESTARTS,
            start_delay: None,
            duration: None,
            work: None,
        }
    }

    pub fn with_work(mut self, work: BoundWork) -> Self {
        self.work = Some(work);
        self
    }

    /// Add one dependency. Repeated ids are kept once.
    pub fn after(mut self, dep: JobId) -> Self {
        if !self.dependencies.contains(&dep) {
            self.dependencies.push(dep);
        }
        self
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = JobId>) -> Self {
        for dep in deps {
            self = self.after(dep);
        }
        self
    }

    pub fn with_max_restarts(mut self, max_restarts: u32) -> Self {
        self.max_restarts = max_restarts;
        self
    }

    /// Seed the restart counter, e.g. when resuming from a saved state.
    pub fn with_restarts(mut self, restarts: u32) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = Some(delay);
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn dependencies(&self) -> &[JobId] {
        &self.dependencies
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn max_restarts(&self) -> u32 {
        self.max_restarts
    }

    pub fn start_delay(&self) -> Option<Duration> {
        self.start_delay
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    pub fn work(&self) -> Option<&BoundWork> {
        self.work.as_ref()
    }

    /// Attach (or replace) the work unit.
    pub fn bind_work(&mut self, work: BoundWork) {
        self.work = Some(work);
    }

    /// Total attempts allowed over the job's lifetime.
    pub fn attempt_budget(&self) -> u32 {
        self.max_restarts.saturating_add(1)
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.attempt_budget().saturating_sub(self.restarts)
    }

    pub(crate) fn retain_dependencies(&mut self, keep: impl Fn(JobId) -> bool) -> Vec<JobId> {
        let (kept, dropped): (Vec<JobId>, Vec<JobId>) =
            self.dependencies.iter().partition(|dep| keep(**dep));
        self.dependencies = kept;
        dropped
    }

    /// Mark the job `Running` and snapshot what a worker needs to run it.
    ///
    /// Returns `None` (and leaves the job untouched) unless it is `Waiting`.
    pub fn begin_run(&mut self) -> Option<JobRun> {
        if self.status != JobStatus::Waiting {
            warn!(
                job = self.id,
                status = %self.status,
                "begin_run called on a job that is not waiting; ignoring"
            );
            return None;
        }

        self.status = JobStatus::Running;
        debug!(job = self.id, restarts = self.restarts, "job marked running");

        Some(JobRun {
            id: self.id,
            start_delay: self.start_delay,
            duration: self.duration,
            restarts: self.restarts,
            max_restarts: self.max_restarts,
            work: self.work.clone(),
        })
    }

    /// Apply the outcome of a [`JobRun`] produced by [`Job::begin_run`].
    pub fn finish_run(&mut self, report: &RunReport) {
        if report.id != self.id {
            warn!(
                job = self.id,
                report_job = report.id,
                "run report belongs to a different job; ignoring"
            );
            return;
        }
        self.status = report.status;
        self.restarts = report.restarts;
    }

    /// Run the job through its retry policy in place.
    ///
    /// Must be called on a `Waiting` job; otherwise nothing happens and `None`
    /// is returned. Work failures never escape: they are recorded in the
    /// returned report and reflected in [`Job::status`].
    pub async fn execute(&mut self) -> Option<RunReport> {
        let run = self.begin_run()?;
        let report = run.execute().await;
        self.finish_run(&report);
        Some(report)
    }
}
