// src/exec/mod.rs

//! Execution layer.
//!
//! The scheduler decides *what* runs in a wave; [`dispatch`] owns *how* the
//! wave runs: one Tokio task per member, joined before the next readiness
//! scan.

pub mod dispatch;

pub use dispatch::dispatch_wave;
