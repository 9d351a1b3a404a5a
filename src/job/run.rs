// src/job/run.rs

//! Attempt loop for a single job.
//!
//! A [`JobRun`] is an owned snapshot of everything one execution needs, so it
//! can be moved onto a worker task while the scheduler keeps the arena.

use std::any::Any;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use crate::errors::{Result, WavedagError};
use crate::types::{JobId, JobStatus};
use crate::work::BoundWork;

/// Owned execution snapshot of a job, produced by `Job::begin_run`.
#[derive(Debug, Clone)]
pub struct JobRun {
    pub(crate) id: JobId,
    pub(crate) start_delay: Option<Duration>,
    pub(crate) duration: Option<Duration>,
    pub(crate) restarts: u32,
    pub(crate) max_restarts: u32,
    pub(crate) work: Option<BoundWork>,
}

/// Outcome of a [`JobRun`], applied back with `Job::finish_run`.
#[derive(Debug)]
pub struct RunReport {
    pub id: JobId,
    /// `Completed` or `Failed`.
    pub status: JobStatus,
    /// Restart counter after this run.
    pub restarts: u32,
    /// Attempts that actually invoked the work unit in this run.
    pub attempts: u32,
    /// One entry per failed attempt, oldest first.
    pub failures: Vec<WavedagError>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Completed
    }

    pub fn last_failure(&self) -> Option<&WavedagError> {
        self.failures.last()
    }

    /// Collapse into a `Result`: `RetryBudgetExhausted` unless completed.
    ///
    /// A run that never had a work unit returns its `MissingWorkUnit`.
    pub fn into_result(mut self) -> Result<()> {
        if self.succeeded() {
            Ok(())
        } else if matches!(self.failures.last(), Some(WavedagError::MissingWorkUnit(_))) {
            Err(self
                .failures
                .pop()
                .unwrap_or(WavedagError::MissingWorkUnit(self.id)))
        } else {
            Err(WavedagError::RetryBudgetExhausted {
                job: self.id,
                attempts: self.restarts,
            })
        }
    }

    /// Report for a run whose worker task was lost before it produced one.
    /// Counts as one failed attempt.
    pub(crate) fn aborted(run_id: JobId, restarts: u32, message: String) -> Self {
        Self {
            id: run_id,
            status: JobStatus::Failed,
            restarts: restarts.saturating_add(1),
            attempts: 1,
            failures: vec![WavedagError::WorkUnitFailure {
                job: run_id,
                message,
            }],
        }
    }
}

impl JobRun {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Run attempts until one succeeds or the budget is spent.
    pub async fn execute(self) -> RunReport {
        let budget = self.max_restarts.saturating_add(1);
        let mut report = RunReport {
            id: self.id,
            status: JobStatus::Failed,
            restarts: self.restarts,
            attempts: 0,
            failures: Vec::new(),
        };

        info!(job = self.id, "executing job");

        if report.restarts >= budget {
            warn!(
                job = self.id,
                restarts = report.restarts,
                max_restarts = self.max_restarts,
                "retry budget already spent; not running"
            );
            return report;
        }

        let Some(work) = self.work.clone() else {
            // Retrying cannot bind a unit; fail before any delay, no attempt charged.
            let err = WavedagError::MissingWorkUnit(self.id);
            error!(job = self.id, error = %err, "job has no work unit; failing");
            report.failures.push(err);
            return report;
        };

        if let Some(delay) = self.start_delay {
            debug!(job = self.id, delay_ms = delay.as_millis() as u64, "waiting for start delay");
            sleep(delay).await;
        }

        while report.restarts < budget {
            report.attempts += 1;
            let attempt = report.attempts;

            if let Some(duration) = self.duration {
                sleep(duration).await;
            }

            match self.attempt(&work).await {
                Ok(()) => {
                    report.status = JobStatus::Completed;
                    info!(job = self.id, attempt, "job completed");
                    break;
                }
                Err(err) => {
                    report.restarts += 1;
                    error!(
                        job = self.id,
                        attempt,
                        restarts = report.restarts,
                        error = %err,
                        "job attempt failed"
                    );
                    report.failures.push(err);
                }
            }
        }

        if report.status == JobStatus::Failed && report.restarts >= budget {
            warn!(job = self.id, attempts = report.restarts, "job exhausted its retry budget");
        }

        report
    }

    /// One invocation of the work unit, on its own task so a panicking body
    /// only costs this attempt.
    async fn attempt(&self, work: &BoundWork) -> Result<()> {
        let id = self.id;
        let work = work.clone();
        debug!(job = id, work = %work.name(), "starting work unit");

        match tokio::spawn(drive(id, work)).await {
            Ok(result) => result,
            Err(err) if err.is_panic() => Err(WavedagError::WorkUnitFailure {
                job: id,
                message: format!("work unit panicked: {}", panic_message(err.into_panic())),
            }),
            Err(err) => Err(WavedagError::WorkUnitFailure {
                job: id,
                message: err.to_string(),
            }),
        }
    }
}

/// Drive a fresh step sequence to exhaustion.
async fn drive(id: JobId, work: BoundWork) -> Result<()> {
    let mut steps = work.start();
    let mut step = 0u64;
    while let Some(outcome) = steps.next_step().await {
        outcome.map_err(|err| WavedagError::WorkUnitFailure {
            job: id,
            message: format!("{err:#}"),
        })?;
        step += 1;
        trace!(job = id, step, "work step");
    }
    Ok(())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => msg.to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}
