// src/dag/mod.rs

//! Job arena and wave scheduling.
//!
//! - [`scheduler`] owns the arena and the wave loop.
//! - [`readiness`] evaluates the "all dependencies completed" predicate.
//! - [`wave`] contains the per-wave and per-run result types.
//! - [`state`] saves/restores the arena as a JSON document.
//! - [`graph`] holds cycle checks and topological ordering over job ids.

pub mod graph;
pub mod readiness;
pub mod scheduler;
pub mod state;
pub mod wave;

pub use scheduler::{DEFAULT_MAX_TASKS, Scheduler};
pub use state::{JobRecord, StateDocument};
pub use wave::{RunSummary, WaveReport};
