#![allow(dead_code)]

use std::path::PathBuf;

use wavedag::config::{ConfigFile, JobConfig, RawConfigFile, SchedulerSection};
use wavedag::types::JobId;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                scheduler: SchedulerSection::default(),
                job: Vec::new(),
            },
        }
    }

    pub fn max_tasks(mut self, max_tasks: usize) -> Self {
        self.config.scheduler.max_tasks = max_tasks;
        self
    }

    pub fn state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.scheduler.state_file = Some(path.into());
        self
    }

    pub fn detect_cycles(mut self, val: bool) -> Self {
        self.config.scheduler.detect_cycles = val;
        self
    }

    pub fn with_job(mut self, job: JobConfig) -> Self {
        self.config.job.push(job);
        self
    }

    /// The unvalidated config, for tests that exercise validation.
    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(id: JobId, work: &str) -> Self {
        Self {
            job: JobConfig {
                id,
                work: work.to_string(),
                args: Default::default(),
                after: vec![],
                duration: None,
                start_delay: None,
                max_restarts: None,
                restarts: 0,
            },
        }
    }

    pub fn arg(mut self, key: &str, value: &str) -> Self {
        self.job.args.insert(key.to_string(), value.to_string());
        self
    }

    pub fn after(mut self, dep: JobId) -> Self {
        self.job.after.push(dep);
        self
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.job.duration = Some(secs);
        self
    }

    pub fn start_delay(mut self, secs: f64) -> Self {
        self.job.start_delay = Some(secs);
        self
    }

    pub fn max_restarts(mut self, n: u32) -> Self {
        self.job.max_restarts = Some(n);
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
