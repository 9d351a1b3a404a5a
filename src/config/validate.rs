// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::dag::graph::check_acyclic;
use crate::errors::{Result, WavedagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::WavedagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.scheduler, raw.job))
    }
}

/// Run every semantic check on a parsed config.
pub fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_scheduler_section(cfg)?;
    validate_job_ids(cfg)?;
    validate_job_timings(cfg)?;
    validate_job_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(WavedagError::ConfigError(
            "config must contain at least one [[job]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler_section(cfg: &RawConfigFile) -> Result<()> {
    let max_tasks = cfg.scheduler.max_tasks;
    if max_tasks == 0 {
        return Err(WavedagError::ConfigError(
            "[scheduler].max_tasks must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.job.len() > max_tasks {
        return Err(WavedagError::ConfigError(format!(
            "config defines {} jobs but [scheduler].max_tasks is {}",
            cfg.job.len(),
            max_tasks
        )));
    }
    Ok(())
}

fn validate_job_ids(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for job in cfg.job.iter() {
        if !seen.insert(job.id) {
            return Err(WavedagError::ConfigError(format!(
                "job id {} is defined more than once",
                job.id
            )));
        }
    }
    Ok(())
}

fn validate_job_timings(cfg: &RawConfigFile) -> Result<()> {
    for job in cfg.job.iter() {
        for (field, value) in [("duration", job.duration), ("start_delay", job.start_delay)] {
            if let Some(secs) = value {
                if !secs.is_finite() || secs < 0.0 {
                    return Err(WavedagError::ConfigError(format!(
                        "job {} has invalid `{}` = {} (expected seconds >= 0)",
                        job.id, field, secs
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_job_dependencies(cfg: &RawConfigFile) -> Result<()> {
    let ids: HashSet<_> = cfg.job.iter().map(|j| j.id).collect();
    for job in cfg.job.iter() {
        for dep in job.after.iter() {
            if *dep == job.id {
                return Err(WavedagError::ConfigError(format!(
                    "job {} cannot depend on itself in `after`",
                    job.id
                )));
            }
            if !ids.contains(dep) {
                return Err(WavedagError::ConfigError(format!(
                    "job {} has unknown dependency {} in `after`",
                    job.id, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    check_acyclic(cfg.job.iter().map(|j| (j.id, j.after.as_slice())))
}
