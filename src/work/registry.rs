// src/work/registry.rs

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::errors::{Result, WavedagError};

use super::builtin::builtins;
use super::{BoundWork, ShellWork, WorkArgs, WorkUnit};

/// Name -> work unit lookup used when building jobs from config and when
/// re-binding jobs restored from a state file.
#[derive(Debug, Clone, Default)]
pub struct WorkRegistry {
    units: BTreeMap<String, Arc<dyn WorkUnit>>,
}

impl WorkRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the filesystem units and `shell`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for unit in builtins() {
            registry.register(unit);
        }
        registry.register(Arc::new(ShellWork));
        registry
    }

    /// Register a unit under its own name, replacing any previous one.
    pub fn register(&mut self, unit: Arc<dyn WorkUnit>) {
        self.units.insert(unit.name().to_string(), unit);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(|s| s.as_str())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn WorkUnit>> {
        self.units
            .get(name)
            .cloned()
            .ok_or_else(|| WavedagError::UnknownWorkUnit(name.to_string()))
    }

    /// Look up `name` and bind it to `args`.
    pub fn bind(&self, name: &str, args: WorkArgs) -> Result<BoundWork> {
        Ok(BoundWork::with_args(self.get(name)?, args))
    }
}
