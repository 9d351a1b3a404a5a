// src/job/mod.rs

//! Jobs and their retry state machine.
//!
//! - [`model`] holds the [`Job`] entity stored in the scheduler arena.
//! - [`run`] holds the attempt loop ([`JobRun`]) and its [`RunReport`].

pub mod model;
pub mod run;

pub use model::{DEFAULT_MAX_RESTARTS, Job};
pub use run::{JobRun, RunReport};
