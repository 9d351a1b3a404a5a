// src/dag/wave.rs

//! Result types for wave execution.

use crate::types::JobId;

/// What happened in one wave.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WaveReport {
    /// 1-based wave number within the `execute_tasks` call.
    pub index: usize,
    /// Jobs dispatched in this wave, in dispatch order.
    pub jobs: Vec<JobId>,
    /// Jobs that ended the wave `Completed`.
    pub completed: Vec<JobId>,
    /// Jobs that ended the wave `Failed` with their budget spent.
    pub failed: Vec<JobId>,
}

/// Structured result of a whole `execute_tasks` call.
///
/// Failures are not errors at this level; this is only a record of what ran
/// so callers can decide what to do about failed or stalled jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub waves: Vec<WaveReport>,
    /// Jobs still `Waiting` once nothing else could become ready: they sit
    /// downstream of a failed (or missing) dependency.
    pub stalled: Vec<JobId>,
}

impl RunSummary {
    /// Job ids per wave, e.g. `[[1], [2], [3]]`.
    pub fn wave_jobs(&self) -> Vec<Vec<JobId>> {
        self.waves.iter().map(|w| w.jobs.clone()).collect()
    }

    pub fn wave_sizes(&self) -> Vec<usize> {
        self.waves.iter().map(|w| w.jobs.len()).collect()
    }

    pub fn completed(&self) -> Vec<JobId> {
        self.waves.iter().flat_map(|w| w.completed.iter().copied()).collect()
    }

    pub fn failed(&self) -> Vec<JobId> {
        self.waves.iter().flat_map(|w| w.failed.iter().copied()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.stalled.is_empty() && self.waves.iter().all(|w| w.failed.is_empty())
    }
}
