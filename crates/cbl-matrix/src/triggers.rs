//! Trigger block of a generated workflow.

use serde::Serialize;

/// Branch prefix that lets a generated workflow be exercised before merge.
pub const PRESUBMIT_BRANCHES: &str = "presubmit/*";

/// Files whose modification re-runs every generated workflow on push.
const SHARED_PATHS: [&str; 2] = ["check_logs.py", "utils.py"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triggers {
    pub push: PushTrigger,
    pub schedule: Vec<CronEntry>,
    /// Manual dispatch takes no inputs and renders as `null`.
    pub workflow_dispatch: (),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushTrigger {
    pub branches: Vec<String>,
    pub paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CronEntry {
    pub cron: String,
}

impl Triggers {
    /// Push to presubmit branches touching the workflow's inputs, the cron
    /// schedule, and manual dispatch.
    pub fn new(cron: &str, tuxsuite_yml: &str, workflow_yml: &str) -> Self {
        let mut paths: Vec<String> = SHARED_PATHS.iter().map(|p| p.to_string()).collect();
        paths.push(tuxsuite_yml.to_string());
        paths.push(workflow_yml.to_string());

        Self {
            push: PushTrigger {
                branches: vec![PRESUBMIT_BRANCHES.to_string()],
                paths,
            },
            schedule: vec![CronEntry {
                cron: cron.to_string(),
            }],
            workflow_dispatch: (),
        }
    }
}
