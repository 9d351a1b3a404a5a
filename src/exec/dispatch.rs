// src/exec/dispatch.rs

//! Concurrent dispatch of one wave.

use tracing::{debug, error};

use crate::job::{JobRun, RunReport};

/// Run every member of a wave on its own Tokio task and wait for all of them.
///
/// This is the barrier between waves: the returned reports cover every run
/// that was passed in, in the same order. Panics inside work bodies are
/// absorbed per attempt; a worker task lost anyway is reported as one failed
/// attempt for its job.
pub async fn dispatch_wave(runs: Vec<JobRun>) -> Vec<RunReport> {
    let ids: Vec<_> = runs.iter().map(|r| r.id()).collect();
    debug!(?ids, "dispatching wave");

    let handles: Vec<_> = runs
        .into_iter()
        .map(|run| {
            let id = run.id();
            let restarts = run.restarts;
            (id, restarts, tokio::spawn(run.execute()))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for (id, restarts, handle) in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(err) => {
                error!(job = id, error = %err, "job worker did not finish");
                reports.push(RunReport::aborted(id, restarts, err.to_string()));
            }
        }
    }

    reports
}
