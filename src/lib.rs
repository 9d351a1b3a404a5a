// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod job;
pub mod logging;
pub mod types;
pub mod work;

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, bind_restored, build_scheduler, load_from_path};
use crate::dag::graph::topological_order;
use crate::dag::{RunSummary, Scheduler};
use crate::types::JobStatus;
use crate::work::WorkRegistry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - resuming from the state file (if it holds pending jobs)
/// - the wave loop
/// - saving state afterwards
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(());
    }

    let registry = WorkRegistry::with_builtins();
    let state_path = args
        .state
        .clone()
        .or_else(|| cfg.scheduler.state_file.clone());

    let resumed = match state_path.as_ref().filter(|p| p.is_file() && !args.fresh) {
        Some(path) => resume(&cfg, &registry, path, args.max_tasks)?,
        None => None,
    };
    let mut scheduler = match resumed {
        Some(scheduler) => scheduler,
        None => build_scheduler(&cfg, &registry)?,
    };

    let summary = scheduler.execute_tasks().await;
    print_summary(&scheduler, &summary);

    if let Some(path) = state_path {
        scheduler.save_state(&path)?;
    }

    Ok(())
}

/// Load and validate the config, with `--max-tasks` applied before the
/// checks run.
fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = load_from_path(&args.config)?;
    if let Some(max_tasks) = args.max_tasks {
        raw.scheduler.max_tasks = max_tasks;
    }
    Ok(ConfigFile::try_from(raw)?)
}

/// Restore pending jobs from `path` and re-bind their work.
///
/// Returns `None` when the state holds no pending jobs, so the caller starts
/// over from the config.
fn resume(
    cfg: &ConfigFile,
    registry: &WorkRegistry,
    path: &Path,
    max_tasks: Option<usize>,
) -> Result<Option<Scheduler>> {
    let mut scheduler =
        Scheduler::new(cfg.scheduler.max_tasks).with_cycle_detection(cfg.scheduler.detect_cycles);
    scheduler.load_state(path)?;

    if scheduler.is_empty() {
        info!(
            path = %path.display(),
            "state file holds no pending jobs; starting from the config"
        );
        return Ok(None);
    }

    info!(path = %path.display(), jobs = scheduler.len(), "resuming from saved state");
    if let Some(max_tasks) = max_tasks {
        scheduler.set_max_tasks(max_tasks);
    }
    bind_restored(cfg, registry, &mut scheduler)?;
    Ok(Some(scheduler))
}

fn print_summary(scheduler: &Scheduler, summary: &RunSummary) {
    println!("wavedag: {} wave(s)", summary.waves.len());
    for wave in summary.waves.iter() {
        println!("  wave {}: {:?}", wave.index, wave.jobs);
    }
    for job in scheduler.jobs() {
        println!("  job {}: {} (restarts {})", job.id(), job.status(), job.restarts());
    }
    let failed = scheduler
        .jobs()
        .filter(|j| j.status() == JobStatus::Failed)
        .count();
    if failed > 0 || !summary.stalled.is_empty() {
        println!(
            "  {failed} job(s) failed, {} job(s) never became ready",
            summary.stalled.len()
        );
    }
}

/// Simple dry-run output: jobs in dependency order with their settings.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    println!("wavedag dry-run");
    println!("  scheduler.max_tasks = {}", cfg.scheduler.max_tasks);
    if let Some(ref path) = cfg.scheduler.state_file {
        println!("  scheduler.state_file = {}", path.display());
    }
    println!();

    let order = topological_order(cfg.job.iter().map(|j| (j.id, j.after.as_slice())))?;

    println!("jobs ({}):", cfg.job.len());
    for id in order {
        let Some(job) = cfg.job(id) else { continue };
        println!("  - {id}");
        println!("      work: {}", job.work);
        if !job.args.is_empty() {
            println!("      args: {:?}", job.args);
        }
        if !job.after.is_empty() {
            println!("      after: {:?}", job.after);
        }
        if let Some(secs) = job.start_delay {
            println!("      start_delay: {secs}s");
        }
        if let Some(secs) = job.duration {
            println!("      duration: {secs}s");
        }
        println!("      max_restarts: {}", job.effective_max_restarts());
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
