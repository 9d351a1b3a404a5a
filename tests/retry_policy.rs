// tests/retry_policy.rs

mod common;
use crate::common::{init_tracing, quick_job, with_timeout};

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use wavedag::errors::WavedagError;
use wavedag::job::Job;
use wavedag::types::JobStatus;
use wavedag::work::{BoundWork, FnWork, WorkArgs};
use wavedag_test_utils::fake_work::ScriptedWork;

#[tokio::test]
async fn always_failing_job_makes_max_restarts_plus_one_attempts() {
    init_tracing();

    for max_restarts in 0..4u32 {
        let work = ScriptedWork::always_failing();
        let mut job = quick_job(1, max_restarts).with_work(work.bound());

        let report = with_timeout(job.execute()).await.expect("job was waiting");

        assert_eq!(work.invocations(), max_restarts + 1);
        assert_eq!(report.attempts, max_restarts + 1);
        assert_eq!(report.failures.len() as u32, max_restarts + 1);
        assert_eq!(job.status(), JobStatus::Failed);
        assert_eq!(job.restarts(), max_restarts + 1);
        assert_eq!(job.attempts_remaining(), 0);

        match report.into_result() {
            Err(WavedagError::RetryBudgetExhausted { job, attempts }) => {
                assert_eq!(job, 1);
                assert_eq!(attempts, max_restarts + 1);
            }
            other => panic!("expected RetryBudgetExhausted, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn job_that_recovers_within_budget_completes_with_failed_attempts_counted() {
    init_tracing();

    let max_restarts = 3;
    for fail_first in 0..=max_restarts {
        let work = ScriptedWork::failing_first(fail_first);
        let mut job = quick_job(7, max_restarts).with_work(work.bound());

        let report = with_timeout(job.execute()).await.expect("job was waiting");

        assert!(report.succeeded());
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(job.restarts(), fail_first);
        assert_eq!(work.invocations(), fail_first + 1);
        for failure in &report.failures {
            assert!(
                matches!(failure, WavedagError::WorkUnitFailure { job: 7, message } if message.contains("scripted failure")),
                "unexpected failure: {failure:?}"
            );
        }
    }
}

#[tokio::test]
async fn zero_max_restarts_means_exactly_one_attempt() {
    let work = ScriptedWork::failing_first(1);
    let mut job = quick_job(1, 0).with_work(work.bound());

    job.execute().await;

    assert_eq!(work.invocations(), 1);
    assert_eq!(job.status(), JobStatus::Failed);
}

#[tokio::test]
async fn job_without_work_unit_fails_fast() {
    init_tracing();

    let mut job = quick_job(3, 2);
    let report = job.execute().await.expect("job was waiting");

    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(report.attempts, 0);
    assert_eq!(job.restarts(), 0, "a missing unit is not charged to the budget");
    assert!(matches!(
        report.last_failure(),
        Some(WavedagError::MissingWorkUnit(3))
    ));
    assert!(matches!(
        report.into_result(),
        Err(WavedagError::MissingWorkUnit(3))
    ));
}

#[tokio::test]
async fn job_without_work_unit_skips_its_delays() {
    let mut job = quick_job(4, 1)
        .with_start_delay(Duration::from_secs(1))
        .with_duration(Duration::from_secs(1));

    let started = Instant::now();
    let report = with_timeout(job.execute()).await.expect("job was waiting");

    assert!(
        started.elapsed() < Duration::from_millis(500),
        "missing unit took {:?} to fail",
        started.elapsed()
    );
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(matches!(
        report.last_failure(),
        Some(WavedagError::MissingWorkUnit(4))
    ));
}

#[tokio::test]
async fn panicking_work_costs_one_attempt() {
    init_tracing();
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let flaky = FnWork::new("flaky", move |_args: &WorkArgs| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("first call blows up");
        }
        Ok(())
    });
    let mut job = quick_job(1, 2).with_work(BoundWork::new(Arc::new(flaky)));

    let report = with_timeout(job.execute()).await.expect("job was waiting");

    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.restarts(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(matches!(
        report.failures.as_slice(),
        [WavedagError::WorkUnitFailure { job: 1, message }] if message.contains("first call blows up")
    ));
}

#[tokio::test]
async fn always_panicking_work_spends_the_whole_budget() {
    let always = FnWork::new("always", |_args: &WorkArgs| -> anyhow::Result<()> {
        panic!("never works")
    });
    let mut job = quick_job(1, 1).with_work(BoundWork::new(Arc::new(always)));

    let report = with_timeout(job.execute()).await.expect("job was waiting");

    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(report.attempts, 2);
    assert_eq!(job.attempts_remaining(), 0);
}

#[tokio::test]
async fn execute_is_ignored_unless_waiting() {
    let work = ScriptedWork::succeeding();
    let mut job = quick_job(1, 0).with_work(work.bound());

    assert!(job.execute().await.is_some());
    assert_eq!(job.status(), JobStatus::Completed);

    assert!(job.execute().await.is_none());
    assert_eq!(work.invocations(), 1);
    assert_eq!(job.status(), JobStatus::Completed);
}

#[tokio::test]
async fn spent_budget_fails_without_invoking_work() {
    let work = ScriptedWork::succeeding();
    let mut job = Job::new(1)
        .with_max_restarts(1)
        .with_restarts(2)
        .with_work(work.bound());

    let report = job.execute().await.expect("job was waiting");

    assert_eq!(work.invocations(), 0);
    assert_eq!(report.attempts, 0);
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.restarts(), 2);
}

#[tokio::test]
async fn partially_spent_budget_only_gets_remaining_attempts() {
    let work = ScriptedWork::always_failing();
    let mut job = Job::new(1)
        .with_max_restarts(3)
        .with_restarts(2)
        .with_work(work.bound());

    job.execute().await;

    assert_eq!(work.invocations(), 2);
    assert_eq!(job.restarts(), 4);
    assert_eq!(job.status(), JobStatus::Failed);
}

#[tokio::test]
async fn start_delay_applies_once_and_duration_applies_per_attempt() {
    let delay = Duration::from_millis(40);
    let duration = Duration::from_millis(30);
    let work = ScriptedWork::failing_first(1);
    let mut job = quick_job(1, 1)
        .with_start_delay(delay)
        .with_duration(duration)
        .with_work(work.bound());

    let started = Instant::now();
    job.execute().await;
    let elapsed = started.elapsed();

    assert_eq!(job.status(), JobStatus::Completed);
    assert!(
        elapsed >= delay + duration * 2,
        "expected at least {:?}, got {:?}",
        delay + duration * 2,
        elapsed
    );
}
