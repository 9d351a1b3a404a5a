// src/dag/readiness.rs

//! Readiness evaluation over the job arena.

use std::collections::HashMap;

use tracing::warn;

use crate::job::Job;
use crate::types::{JobId, JobStatus};

/// A read-only view of the arena for answering "can this job start?".
pub struct Readiness<'a> {
    jobs: &'a [Job],
    index: &'a HashMap<JobId, usize>,
}

impl<'a> Readiness<'a> {
    pub fn new(jobs: &'a [Job], index: &'a HashMap<JobId, usize>) -> Self {
        Self { jobs, index }
    }

    pub fn status_of(&self, id: JobId) -> Option<JobStatus> {
        self.index.get(&id).map(|&i| self.jobs[i].status())
    }

    /// Every dependency of `job` is `Completed`.
    ///
    /// A dependency that is not in the arena is never satisfied.
    pub fn deps_satisfied(&self, job: &Job) -> bool {
        job.dependencies().iter().all(|&dep| match self.status_of(dep) {
            Some(status) => status == JobStatus::Completed,
            None => {
                warn!(job = job.id(), dep, "dependency missing from scheduler");
                false
            }
        })
    }

    /// The readiness predicate: not yet completed and all dependencies are.
    pub fn can_start(&self, job: &Job) -> bool {
        job.status() != JobStatus::Completed && self.deps_satisfied(job)
    }

    /// Ids of jobs that are ready and have not been dispatched yet, in arena
    /// (insertion) order.
    pub fn dispatchable(&self) -> Vec<JobId> {
        self.jobs
            .iter()
            .filter(|job| job.status() == JobStatus::Waiting && self.can_start(job))
            .map(|job| job.id())
            .collect()
    }
}
