//! The "does this scheduled job need to run" decision.
//!
//! A job runs when the compiler or the tracked tree changed since the last
//! recorded run. Operational failures never skip work: they surface as
//! [`GateOutcome::Errored`], which callers treat as a run.

use cbl_core::{Error, Result, RunInfo, StateChannel, StateProbe};
use std::fmt;
use tracing::{error, info};

/// Exit status for a run decision.
pub const EXIT_RUN: i32 = 0;
/// Exit status for a confirmed no-op.
pub const EXIT_SKIP: i32 = 2;
/// Exit status for an internal failure.
pub const EXIT_ERROR: i32 = 1;

/// Result of evaluating the gate.
#[derive(Debug)]
pub enum GateOutcome {
    /// Inputs changed (or were never recorded); the new state was persisted.
    Run,
    /// Inputs are unchanged since the last recorded run.
    Skip,
    /// The decision could not be made.
    Errored(Error),
}

impl GateOutcome {
    /// Whether downstream work should proceed. Errors fail open.
    pub fn should_run(&self) -> bool {
        !matches!(self, GateOutcome::Skip)
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            GateOutcome::Run => EXIT_RUN,
            GateOutcome::Skip => EXIT_SKIP,
            GateOutcome::Errored(_) => EXIT_ERROR,
        }
    }
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateOutcome::Run => f.write_str("run"),
            GateOutcome::Skip => f.write_str("skip"),
            GateOutcome::Errored(e) => write!(f, "error ({})", e),
        }
    }
}

/// Gate for one generated workflow.
#[derive(Debug, Clone)]
pub struct RunGate {
    key: String,
    repo: String,
    git_ref: String,
}

impl RunGate {
    /// `key` names the workflow; (`repo`, `git_ref`) is the tree it builds.
    pub fn new(
        key: impl Into<String>,
        repo: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            repo: repo.into(),
            git_ref: git_ref.into(),
        }
    }

    pub fn evaluate(
        &self,
        channel: &mut impl StateChannel,
        probe: &impl StateProbe,
    ) -> GateOutcome {
        match self.decide(channel, probe) {
            Ok(true) => GateOutcome::Run,
            Ok(false) => GateOutcome::Skip,
            Err(e) => {
                error!(key = %self.key, error = %e, "Run gate failed");
                GateOutcome::Errored(e)
            }
        }
    }

    fn decide(&self, channel: &mut impl StateChannel, probe: &impl StateProbe) -> Result<bool> {
        let current = RunInfo::new(
            probe.compiler_version()?,
            probe.remote_sha(&self.repo, &self.git_ref)?,
        );
        info!(key = %self.key, compiler = %current.compiler, sha = %current.sha, "Current state");

        let changed = match channel.load(&self.key)? {
            None => {
                info!(key = %self.key, "No previous run recorded");
                true
            }
            Some(previous) => match current.changed_field(&previous) {
                Some(field) => {
                    info!(key = %self.key, field, "State changed since last run");
                    true
                }
                None => false,
            },
        };

        if !changed {
            info!(key = %self.key, "No changes since last run");
            return Ok(false);
        }
        channel.store(&self.key, &current)?;
        Ok(true)
    }
}
