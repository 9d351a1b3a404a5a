#![allow(dead_code)]

use wavedag::dag::Scheduler;
use wavedag::job::Job;
use wavedag::types::JobId;

pub use wavedag_test_utils::{init_tracing, with_timeout};

/// Add jobs in order, panicking on any rejection.
pub fn scheduler_with(max_tasks: usize, jobs: impl IntoIterator<Item = Job>) -> Scheduler {
    let mut scheduler = Scheduler::new(max_tasks);
    for job in jobs {
        scheduler.add_task(job).expect("add_task failed");
    }
    scheduler
}

/// A job with no start delay, no duration and `max_restarts` extra attempts.
pub fn quick_job(id: JobId, max_restarts: u32) -> Job {
    Job::new(id).with_max_restarts(max_restarts)
}
