// src/config/build.rs

//! Turning a validated config into a scheduler.

use tracing::{info, warn};

use crate::config::model::ConfigFile;
use crate::dag::Scheduler;
use crate::errors::Result;
use crate::types::JobId;
use crate::work::WorkRegistry;

/// Build a scheduler holding every configured job, in file order, with its
/// work unit bound from `registry`.
pub fn build_scheduler(cfg: &ConfigFile, registry: &WorkRegistry) -> Result<Scheduler> {
    let mut scheduler =
        Scheduler::new(cfg.scheduler.max_tasks).with_cycle_detection(cfg.scheduler.detect_cycles);

    for jc in cfg.job.iter() {
        let work = registry.bind(&jc.work, jc.args.clone())?;
        scheduler.add_task(jc.to_job().with_work(work))?;
    }

    info!(jobs = scheduler.len(), max_tasks = scheduler.max_tasks(), "scheduler built from config");
    Ok(scheduler)
}

/// Re-bind work units to jobs restored from a state file.
///
/// Restored jobs keep the dependencies and counters from the state file; only
/// the work unit is taken from the config. Returns the ids of restored jobs
/// that have no config entry (they stay unbound and will fail when run).
pub fn bind_restored(
    cfg: &ConfigFile,
    registry: &WorkRegistry,
    scheduler: &mut Scheduler,
) -> Result<Vec<JobId>> {
    let mut unbound = Vec::new();

    for id in scheduler.job_ids() {
        match cfg.job(id) {
            Some(jc) => {
                let work = registry.bind(&jc.work, jc.args.clone())?;
                scheduler.rebind_work(id, work)?;
            }
            None => {
                warn!(job = id, "restored job has no config entry; leaving it without work");
                unbound.push(id);
            }
        }
    }

    Ok(unbound)
}
