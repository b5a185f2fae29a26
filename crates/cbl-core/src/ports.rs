//! Port traits.
//!
//! These traits define the interfaces between the run gate, the durable
//! store that remembers what each scheduled job last ran against, and the
//! tools that report the current upstream state.

use crate::Result;
use crate::run_info::RunInfo;
use std::collections::HashMap;

/// Versioned key/value store of run-state records.
///
/// Last writer wins. Keys are workflow names.
pub trait StateChannel {
    /// Load the record stored under `key`, if any.
    fn load(&mut self, key: &str) -> Result<Option<RunInfo>>;

    /// Replace the record stored under `key`.
    fn store(&mut self, key: &str, record: &RunInfo) -> Result<()>;
}

/// Source of the current upstream state a job depends on.
pub trait StateProbe {
    /// Version string of the installed compiler.
    fn compiler_version(&self) -> Result<String>;

    /// Commit `git_ref` currently points at in `repo`.
    fn remote_sha(&self, repo: &str, git_ref: &str) -> Result<String>;
}

/// In-process state channel, used for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStateChannel {
    records: HashMap<String, RunInfo>,
    writes: usize,
}

impl MemoryStateChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, key: impl Into<String>, record: RunInfo) -> Self {
        self.records.insert(key.into(), record);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RunInfo> {
        self.records.get(key)
    }

    /// Number of `store` calls made so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl StateChannel for MemoryStateChannel {
    fn load(&mut self, key: &str) -> Result<Option<RunInfo>> {
        Ok(self.records.get(key).cloned())
    }

    fn store(&mut self, key: &str, record: &RunInfo) -> Result<()> {
        self.records.insert(key.to_string(), record.clone());
        self.writes += 1;
        Ok(())
    }
}
