// src/work/mod.rs

//! Work units: the opaque bodies that jobs execute.
//!
//! A work unit is started with its named arguments and hands back a lazy
//! sequence of progress steps ([`WorkSteps`]). The job drives that sequence
//! to exhaustion; every step is an `.await` point so other members of the
//! same wave keep making progress.
//!
//! - [`adapters`] turns plain closures, async closures and iterators into
//!   work units / step sequences.
//! - [`builtin`] holds the filesystem bodies available from the config file.
//! - [`shell`] runs a command through the platform shell.
//! - [`registry`] maps config names to work units.

pub mod adapters;
pub mod builtin;
pub mod registry;
pub mod shell;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use anyhow::anyhow;

pub use adapters::{AsyncFnWork, FnWork, IterSteps, OnceStep};
pub use registry::WorkRegistry;
pub use shell::ShellWork;

/// Named arguments passed to a work unit when it starts.
pub type WorkArgs = BTreeMap<String, String>;

/// Future produced by a single [`WorkSteps::next_step`] call.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = Option<anyhow::Result<()>>> + Send + 'a>>;

/// A lazy, finite, non-restartable sequence of progress steps.
///
/// - `Some(Ok(()))`: one progress marker was produced.
/// - `Some(Err(_))`: the body failed; the sequence must not be polled again.
/// - `None`: the body finished successfully.
pub trait WorkSteps: Send {
    fn next_step(&mut self) -> StepFuture<'_>;
}

/// Something a job can execute.
pub trait WorkUnit: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Begin a fresh invocation. Each attempt of a job calls this again.
    fn start(&self, args: &WorkArgs) -> Box<dyn WorkSteps>;
}

/// A work unit bound to the arguments it will be started with.
#[derive(Clone)]
pub struct BoundWork {
    unit: Arc<dyn WorkUnit>,
    args: WorkArgs,
}

impl fmt::Debug for BoundWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundWork")
            .field("unit", &self.unit.name())
            .field("args", &self.args)
            .finish()
    }
}

impl BoundWork {
    pub fn new(unit: Arc<dyn WorkUnit>) -> Self {
        Self {
            unit,
            args: WorkArgs::new(),
        }
    }

    pub fn with_args(unit: Arc<dyn WorkUnit>, args: WorkArgs) -> Self {
        Self { unit, args }
    }

    /// Add a single named argument.
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        self.unit.name()
    }

    pub fn args(&self) -> &WorkArgs {
        &self.args
    }

    pub fn start(&self) -> Box<dyn WorkSteps> {
        self.unit.start(&self.args)
    }
}

/// Look up a required argument, failing with a readable message.
pub fn required_arg<'a>(args: &'a WorkArgs, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("missing required argument `{key}`"))
}
