// tests/state_roundtrip.rs

mod common;
use crate::common::{init_tracing, quick_job, scheduler_with, with_timeout};

use std::time::Duration;

use serde_json::Value;
use tempfile::tempdir;
use wavedag::dag::Scheduler;
use wavedag::errors::WavedagError;
use wavedag::fs::FileSystem;
use wavedag::fs::mock::MockFileSystem;
use wavedag::job::Job;
use wavedag::types::JobStatus;
use wavedag_test_utils::fake_work::ScriptedWork;

#[test]
fn pending_jobs_roundtrip_through_state_file() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("wavedag.json");

    let scheduler = scheduler_with(
        4,
        [
            Job::new(1)
                .with_duration(Duration::from_millis(1500))
                .with_start_delay(Duration::from_millis(250))
                .with_max_restarts(3),
            Job::new(2).after(1).with_restarts(1),
        ],
    );
    scheduler.save_state(&path).unwrap();

    let mut restored = Scheduler::new(10);
    restored.load_state(&path).unwrap();

    assert_eq!(restored.max_tasks(), 4);
    assert_eq!(restored.job_ids(), vec![1, 2]);

    let a = restored.job(1).unwrap();
    assert_eq!(a.status(), JobStatus::Waiting);
    assert_eq!(a.duration(), Some(Duration::from_millis(1500)));
    assert_eq!(a.start_delay(), Some(Duration::from_millis(250)));
    assert_eq!(a.max_restarts(), 3);
    assert!(a.work().is_none());

    let b = restored.job(2).unwrap();
    assert_eq!(b.dependencies(), &[1]);
    assert_eq!(b.restarts(), 1);
}

#[tokio::test]
async fn completed_jobs_and_edges_to_them_are_dropped_on_load() {
    init_tracing();
    let ok = ScriptedWork::succeeding();
    let failing = ScriptedWork::always_failing();

    let mut scheduler = scheduler_with(
        10,
        [
            quick_job(1, 0).with_work(ok.bound()),
            quick_job(2, 0).after(1).after(3).with_work(ok.bound()),
            quick_job(3, 0).with_work(failing.bound()),
        ],
    );
    with_timeout(scheduler.execute_tasks()).await;
    assert_eq!(scheduler.status_of(1), Some(JobStatus::Completed));
    assert_eq!(scheduler.status_of(2), Some(JobStatus::Waiting));
    assert_eq!(scheduler.status_of(3), Some(JobStatus::Failed));

    let fs = MockFileSystem::new();
    scheduler.save_state_with(&fs, "state.json").unwrap();

    let mut restored = Scheduler::new(10);
    restored.load_state_with(&fs, "state.json").unwrap();

    // Every job is written, only the non-completed ones come back.
    assert_eq!(scheduler.snapshot().tasks.len(), 3);
    assert_eq!(restored.job_ids(), vec![2, 3]);

    // The edge to completed job 1 is gone; the edge to failed job 3 stays.
    assert_eq!(restored.job(2).unwrap().dependencies(), &[3]);

    // Failed jobs are restored as waiting with their counters intact.
    let c = restored.job(3).unwrap();
    assert_eq!(c.status(), JobStatus::Waiting);
    assert_eq!(c.restarts(), 1);
    assert_eq!(c.attempts_remaining(), 0);
}

#[tokio::test]
async fn state_document_uses_the_documented_wire_format() {
    let fs = MockFileSystem::new();
    let ok = ScriptedWork::succeeding();
    let mut scheduler = scheduler_with(
        3,
        [
            quick_job(1, 2)
                .with_duration(Duration::from_secs(3))
                .with_work(ok.bound()),
            quick_job(2, 0).after(1).after(9),
        ],
    );
    scheduler.execute_tasks().await;
    scheduler.save_state_with(&fs, "s.json").unwrap();

    let raw = fs.contents("s.json").unwrap();
    let doc: Value = serde_json::from_slice(&raw).unwrap();

    assert_eq!(doc["max_tasks"], 3);
    let tasks = doc["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);

    let first = &tasks[0];
    assert_eq!(first["task_id"], 1);
    assert_eq!(first["duration"], 3.0);
    assert_eq!(first["start_time"], Value::Null);
    assert_eq!(first["restarts"], 0);
    assert_eq!(first["max_restarts"], 2);
    assert_eq!(first["dependencies"], serde_json::json!([]));
    assert_eq!(first["status"], "completed");

    assert_eq!(tasks[1]["dependencies"], serde_json::json!([1, 9]));
    assert_eq!(tasks[1]["status"], "waiting");
}

#[test]
fn missing_optional_fields_fall_back_to_defaults() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "s.json",
        r#"{ "tasks": [ { "task_id": 5, "status": "running" } ] }"#,
    );

    let mut scheduler = Scheduler::new(7);
    scheduler.load_state_with(&fs, "s.json").unwrap();

    assert_eq!(scheduler.max_tasks(), 7);
    let job = scheduler.job(5).unwrap();
    assert_eq!(job.status(), JobStatus::Waiting);
    assert_eq!(job.restarts(), 0);
    assert_eq!(job.max_restarts(), wavedag::job::DEFAULT_MAX_RESTARTS);
    assert!(job.dependencies().is_empty());
    assert!(job.duration().is_none());
}

#[test]
fn empty_document_clears_the_scheduler() {
    let fs = MockFileSystem::new();
    fs.add_file("s.json", "{}");

    let mut scheduler = scheduler_with(10, [Job::new(1)]);
    scheduler.load_state_with(&fs, "s.json").unwrap();

    assert!(scheduler.is_empty());
}

#[test]
fn load_replaces_existing_jobs() {
    let fs = MockFileSystem::new();
    scheduler_with(10, [Job::new(8)])
        .save_state_with(&fs, "s.json")
        .unwrap();

    let mut scheduler = scheduler_with(10, [Job::new(1), Job::new(2)]);
    scheduler.load_state_with(&fs, "s.json").unwrap();

    assert_eq!(scheduler.job_ids(), vec![8]);
    assert!(scheduler.job(1).is_none());
}

#[test]
fn malformed_document_is_a_format_error() {
    let fs = MockFileSystem::new();
    fs.add_file("s.json", r#"{ "tasks": [ { "task_id": "one" } ] }"#);

    let mut scheduler = scheduler_with(10, [Job::new(1)]);
    let err = scheduler.load_state_with(&fs, "s.json").unwrap_err();

    assert!(matches!(err, WavedagError::StateFormat(_)), "got {err:?}");
    assert_eq!(scheduler.job_ids(), vec![1], "failed load must not touch the arena");
}

#[test]
fn unknown_status_string_is_rejected() {
    let fs = MockFileSystem::new();
    fs.add_file("s.json", r#"{ "tasks": [ { "task_id": 1, "status": "paused" } ] }"#);

    let err = Scheduler::new(1).load_state_with(&fs, "s.json").unwrap_err();
    assert!(matches!(err, WavedagError::StateFormat(_)));
}

#[test]
fn negative_seconds_are_rejected() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "s.json",
        r#"{ "tasks": [ { "task_id": 1, "duration": -1.0, "status": "waiting" } ] }"#,
    );

    let err = Scheduler::new(1).load_state_with(&fs, "s.json").unwrap_err();
    assert!(
        matches!(&err, WavedagError::InvalidState(msg) if msg.contains("duration")),
        "got {err:?}"
    );

    fs.add_file(
        "s.json",
        r#"{ "tasks": [ { "task_id": 1, "start_time": 1e300, "status": "waiting" } ] }"#,
    );
    let err = Scheduler::new(1).load_state_with(&fs, "s.json").unwrap_err();
    assert!(
        matches!(&err, WavedagError::InvalidState(msg) if msg.contains("start_time")),
        "got {err:?}"
    );
}

#[test]
fn duplicate_pending_ids_are_rejected() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "s.json",
        r#"{ "tasks": [
            { "task_id": 1, "status": "waiting" },
            { "task_id": 1, "status": "failed" }
        ] }"#,
    );

    let err = Scheduler::new(5).load_state_with(&fs, "s.json").unwrap_err();
    assert!(matches!(err, WavedagError::DuplicateJob(1)));
}

#[test]
fn missing_state_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let mut scheduler = Scheduler::new(1);

    let err = scheduler.load_state(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, WavedagError::IoError(_)));

    let fs = MockFileSystem::new();
    assert!(!fs.exists("nope.json".as_ref()));
    let err = scheduler.load_state_with(&fs, "nope.json").unwrap_err();
    assert!(matches!(err, WavedagError::IoError(_)));
}

#[tokio::test]
async fn restored_jobs_need_their_work_rebound() {
    init_tracing();
    let fs = MockFileSystem::new();
    scheduler_with(10, [quick_job(1, 0)])
        .save_state_with(&fs, "s.json")
        .unwrap();

    // Without rebinding, the job fails fast.
    let mut unbound = Scheduler::new(10);
    unbound.load_state_with(&fs, "s.json").unwrap();
    let summary = unbound.execute_tasks().await;
    assert_eq!(summary.failed(), vec![1]);
    assert_eq!(unbound.job(1).unwrap().restarts(), 0);

    let work = ScriptedWork::succeeding();
    let mut rebound = Scheduler::new(10);
    rebound.load_state_with(&fs, "s.json").unwrap();
    rebound.rebind_work(1, work.bound()).unwrap();
    let summary = rebound.execute_tasks().await;

    assert_eq!(summary.completed(), vec![1]);
    assert_eq!(work.invocations(), 1);

    let err = rebound.rebind_work(2, work.bound()).unwrap_err();
    assert!(matches!(err, WavedagError::UnknownJob(2)));
}

#[test]
fn status_strings_parse_and_display() {
    for status in [
        JobStatus::Waiting,
        JobStatus::Running,
        JobStatus::Completed,
        JobStatus::Failed,
    ] {
        let text = status.to_string();
        assert_eq!(text.parse::<JobStatus>().unwrap(), status);
        assert_eq!(serde_json::to_value(status).unwrap(), Value::from(text));
    }
    assert_eq!(" Failed ".parse::<JobStatus>().unwrap(), JobStatus::Failed);
    assert!("paused".parse::<JobStatus>().is_err());
    assert_eq!(JobStatus::default(), JobStatus::Waiting);
}
