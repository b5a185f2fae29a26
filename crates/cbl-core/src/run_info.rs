//! Snapshot of the inputs a scheduled job last ran against.

use serde::{Deserialize, Serialize};

/// Name of the single file kept on a state branch.
pub const RUN_INFO_FILE: &str = "last_run_info.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    /// First line of `clang --version`.
    pub compiler: String,
    /// Remote commit of the tracked tree.
    pub sha: String,
}

impl RunInfo {
    pub fn new(compiler: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
            sha: sha.into(),
        }
    }

    /// Name of the first field that differs from `previous`, if any.
    pub fn changed_field(&self, previous: &RunInfo) -> Option<&'static str> {
        if self.compiler != previous.compiler {
            Some("compiler")
        } else if self.sha != previous.sha {
            Some("sha")
        } else {
            None
        }
    }
}
