use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, warn};

use crate::dag::graph::check_acyclic;
use crate::dag::readiness::Readiness;
use crate::dag::wave::{RunSummary, WaveReport};
use crate::errors::{Result, WavedagError};
use crate::exec::dispatch_wave;
use crate::job::{Job, RunReport};
use crate::types::{JobId, JobStatus};
use crate::work::BoundWork;

/// Default capacity, matching the config default.
pub const DEFAULT_MAX_TASKS: usize = 10;

/// Scheduler owns the job arena and drives it to quiescence in waves.
///
/// It is responsible for:
/// - keeping jobs in insertion order, indexed by id
/// - deciding which jobs are ready (all dependencies `Completed`)
/// - dispatching at most `max_tasks` ready jobs per wave and joining them
///   before looking for more work
/// - saving/restoring the pending part of the arena (see [`crate::dag::state`])
///
/// `max_tasks` is both the number of jobs the scheduler accepts and the
/// size of a wave.
#[derive(Debug)]
pub struct Scheduler {
    pub(crate) max_tasks: usize,
    detect_cycles: bool,
    pub(crate) jobs: Vec<Job>,
    pub(crate) index: HashMap<JobId, usize>,
    /// Jobs known to be ready, in discovery order. Rebuilt before every wave.
    pub(crate) ready: VecDeque<JobId>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TASKS)
    }
}

impl Scheduler {
    pub fn new(max_tasks: usize) -> Self {
        Self {
            max_tasks,
            detect_cycles: false,
            jobs: Vec::new(),
            index: HashMap::new(),
            ready: VecDeque::new(),
        }
    }

    /// Reject jobs in `add_task` that would close a dependency cycle.
    ///
    /// Off by default: a cyclic graph then simply never becomes ready.
    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    pub fn max_tasks(&self) -> usize {
        self.max_tasks
    }

    /// Change capacity and wave size, e.g. to override a restored value.
    /// Jobs already held are kept even when there are more than `max_tasks`.
    pub fn set_max_tasks(&mut self, max_tasks: usize) {
        self.max_tasks = max_tasks;
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in insertion order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn job_ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|j| j.id()).collect()
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.index.get(&id).map(|&i| &self.jobs[i])
    }

    pub fn status_of(&self, id: JobId) -> Option<JobStatus> {
        self.job(id).map(|j| j.status())
    }

    /// Add a job to the managed set.
    ///
    /// Fails without modifying the set when it already holds `max_tasks`
    /// jobs, when the id is taken, or (with cycle detection on) when the job
    /// would close a cycle.
    pub fn add_task(&mut self, job: Job) -> Result<()> {
        if self.jobs.len() >= self.max_tasks {
            warn!(
                job = job.id(),
                max_tasks = self.max_tasks,
                "scheduler is full; rejecting job"
            );
            return Err(WavedagError::CapacityExceeded {
                max_tasks: self.max_tasks,
            });
        }

        if self.index.contains_key(&job.id()) {
            return Err(WavedagError::DuplicateJob(job.id()));
        }

        if self.detect_cycles {
            let existing = self.jobs.iter().map(|j| (j.id(), j.dependencies()));
            check_acyclic(existing.chain(std::iter::once((job.id(), job.dependencies()))))?;
        }

        debug!(
            job = job.id(),
            deps = ?job.dependencies(),
            max_restarts = job.max_restarts(),
            "job added"
        );
        self.index.insert(job.id(), self.jobs.len());
        self.jobs.push(job);
        Ok(())
    }

    /// Re-attach a work unit, typically after [`Scheduler::load_state`].
    pub fn rebind_work(&mut self, id: JobId, work: BoundWork) -> Result<()> {
        let &i = self.index.get(&id).ok_or(WavedagError::UnknownJob(id))?;
        debug!(job = id, work = %work.name(), "work unit bound");
        self.jobs[i].bind_work(work);
        Ok(())
    }

    /// The readiness predicate: `job` is not `Completed` and every one of its
    /// dependencies in this scheduler is `Completed`.
    pub fn can_start_task(&self, job: &Job) -> bool {
        self.readiness().can_start(job)
    }

    fn readiness(&self) -> Readiness<'_> {
        Readiness::new(&self.jobs, &self.index)
    }

    /// Rebuild the ready queue from a full scan in insertion order.
    fn refresh_ready(&mut self) {
        let ready = self.readiness().dispatchable();
        self.ready = ready.into();
    }

    /// Run one wave: take up to `max_tasks` ready jobs, run them concurrently
    /// and apply their outcomes.
    ///
    /// Returns `None` when nothing is ready.
    pub async fn execute_wave(&mut self, index: usize) -> Option<WaveReport> {
        self.refresh_ready();
        if self.ready.is_empty() {
            return None;
        }

        let size = self.max_tasks.max(1).min(self.ready.len());
        let mut runs = Vec::with_capacity(size);
        for id in self.ready.drain(..size) {
            let Some(&i) = self.index.get(&id) else {
                continue;
            };
            if let Some(run) = self.jobs[i].begin_run() {
                runs.push(run);
            }
        }

        let jobs: Vec<JobId> = runs.iter().map(|r| r.id()).collect();
        info!(wave = index, ?jobs, "starting wave");

        let reports = dispatch_wave(runs).await;
        let report = self.apply_reports(index, jobs, &reports);

        info!(
            wave = index,
            completed = ?report.completed,
            failed = ?report.failed,
            "wave finished"
        );
        Some(report)
    }

    fn apply_reports(&mut self, index: usize, jobs: Vec<JobId>, reports: &[RunReport]) -> WaveReport {
        let mut wave = WaveReport {
            index,
            jobs,
            ..WaveReport::default()
        };

        for report in reports {
            let Some(&i) = self.index.get(&report.id) else {
                warn!(job = report.id, "report for unknown job; ignoring");
                continue;
            };
            self.jobs[i].finish_run(report);
            if report.succeeded() {
                wave.completed.push(report.id);
            } else {
                wave.failed.push(report.id);
            }
        }

        wave
    }

    /// Run waves until no job is ready.
    ///
    /// Jobs whose dependencies failed permanently (or never existed) are left
    /// `Waiting` and listed in [`RunSummary::stalled`]; this is not an error.
    pub async fn execute_tasks(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        while let Some(wave) = self.execute_wave(summary.waves.len() + 1).await {
            summary.waves.push(wave);
        }

        summary.stalled = self
            .jobs
            .iter()
            .filter(|j| j.status() == JobStatus::Waiting)
            .map(|j| j.id())
            .collect();

        if !summary.stalled.is_empty() {
            warn!(stalled = ?summary.stalled, "jobs left waiting on unsatisfied dependencies");
        }
        info!(
            waves = summary.waves.len(),
            completed = summary.completed().len(),
            failed = summary.failed().len(),
            "scheduler quiesced"
        );

        summary
    }
}
