use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use wavedag::types::JobId;
use wavedag::work::{BoundWork, IterSteps, OnceStep, WorkArgs, WorkSteps, WorkUnit};

/// A work unit that fails its first `fail_first` invocations and succeeds
/// afterwards.
///
/// A failing invocation yields one good step before failing, so failures
/// happen mid-sequence rather than on the first poll.
#[derive(Debug)]
pub struct ScriptedWork {
    fail_first: u32,
    invocations: Arc<AtomicU32>,
}

impl ScriptedWork {
    pub fn failing_first(fail_first: u32) -> Arc<Self> {
        Arc::new(Self {
            fail_first,
            invocations: Arc::new(AtomicU32::new(0)),
        })
    }

    pub fn always_failing() -> Arc<Self> {
        Self::failing_first(u32::MAX)
    }

    pub fn succeeding() -> Arc<Self> {
        Self::failing_first(0)
    }

    /// How many times `start` was called.
    pub fn invocations(&self) -> u32 {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn bound(self: &Arc<Self>) -> BoundWork {
        BoundWork::new(self.clone())
    }
}

impl WorkUnit for ScriptedWork {
    fn name(&self) -> &str {
        "scripted"
    }

    fn start(&self, _args: &WorkArgs) -> Box<dyn WorkSteps> {
        let n = self.invocations.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.fail_first {
            Box::new(IterSteps::new(
                vec![Ok(()), Err(anyhow!("scripted failure #{n}"))].into_iter(),
            ))
        } else {
            Box::new(IterSteps::new(
                vec![Ok::<(), anyhow::Error>(()), Ok(())].into_iter(),
            ))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkEvent {
    Started(JobId),
    Finished(JobId),
}

/// Shared recorder for [`RecordingWork`]: event order and peak concurrency.
#[derive(Debug, Clone, Default)]
pub struct WorkLog {
    events: Arc<Mutex<Vec<WorkEvent>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl WorkLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<WorkEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Job ids in the order their work started.
    pub fn started(&self) -> Vec<JobId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                WorkEvent::Started(id) => Some(id),
                WorkEvent::Finished(_) => None,
            })
            .collect()
    }

    /// Whether `first` finished before `then` started.
    pub fn finished_before_started(&self, first: JobId, then: JobId) -> bool {
        let events = self.events();
        let finished = events.iter().position(|e| *e == WorkEvent::Finished(first));
        let started = events.iter().position(|e| *e == WorkEvent::Started(then));
        matches!((finished, started), (Some(f), Some(s)) if f < s)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, event: WorkEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A work unit that records when it starts and finishes and holds for a
/// short time in between, so overlapping wave members are observable.
///
/// The job id is read from the `job` argument.
#[derive(Debug)]
pub struct RecordingWork {
    log: WorkLog,
    hold: Duration,
}

impl RecordingWork {
    pub fn new(log: &WorkLog, hold: Duration) -> Arc<Self> {
        Arc::new(Self {
            log: log.clone(),
            hold,
        })
    }

    pub fn bound(self: &Arc<Self>, job: JobId) -> BoundWork {
        BoundWork::new(self.clone()).arg("job", job.to_string())
    }
}

impl WorkUnit for RecordingWork {
    fn name(&self) -> &str {
        "recording"
    }

    fn start(&self, args: &WorkArgs) -> Box<dyn WorkSteps> {
        let job: JobId = args.get("job").and_then(|s| s.parse().ok()).unwrap_or_default();
        let log = self.log.clone();
        let hold = self.hold;

        Box::new(OnceStep::new(async move {
            log.record(WorkEvent::Started(job));
            let now = log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            log.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(hold).await;

            log.in_flight.fetch_sub(1, Ordering::SeqCst);
            log.record(WorkEvent::Finished(job));
            Ok(())
        }))
    }
}
