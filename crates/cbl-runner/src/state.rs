//! Run-state records kept on per-workflow orphan branches.
//!
//! Each key is a branch holding a single `last_run_info.json` commit chain.
//! Pushes are optimistic: two racing runs may make the second push fail,
//! which surfaces as an error.

use crate::git::{GitIdentity, GitRepo};
use cbl_core::run_info::RUN_INFO_FILE;
use cbl_core::{Result, RunInfo, StateChannel};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct GitStateSettings {
    /// URL the state repository is cloned from.
    pub clone_url: String,
    /// URL with push credentials, if cloning anonymously.
    pub push_url: Option<String>,
    /// Where the clone is made.
    pub workdir: PathBuf,
    pub identity: GitIdentity,
}

/// [`StateChannel`] backed by branches of a git repository.
pub struct GitStateChannel {
    repo: GitRepo,
    branch: Option<String>,
}

impl GitStateChannel {
    /// Clone the state repository.
    pub fn open(settings: GitStateSettings) -> Result<Self> {
        let repo = GitRepo::clone_from(&settings.clone_url, &settings.workdir, settings.identity)?;
        if let Some(push_url) = &settings.push_url {
            // A bad URL shows up again when pushing
            if let Err(e) = repo.set_remote_url("origin", push_url) {
                warn!(error = %e, "Could not set push URL");
            }
        }
        Ok(Self { repo, branch: None })
    }

    /// Check out the branch for `key`, creating an empty orphan branch the
    /// first time a key is seen.
    fn switch_to(&mut self, key: &str) -> Result<()> {
        if self.branch.as_deref() == Some(key) {
            return Ok(());
        }
        if self.repo.remote_branch_exists(key)? {
            self.repo.checkout(key)?;
        } else {
            info!(branch = key, "No state branch yet, creating orphan branch");
            self.repo.checkout_orphan(key)?;
        }
        self.branch = Some(key.to_string());
        Ok(())
    }
}

impl StateChannel for GitStateChannel {
    fn load(&mut self, key: &str) -> Result<Option<RunInfo>> {
        self.switch_to(key)?;
        let path = self.repo.path().join(RUN_INFO_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)?;
        match serde_json::from_str(&contents) {
            Ok(record) => Ok(Some(record)),
            // Treated as never run so the next store replaces it
            Err(e) => {
                warn!(branch = key, error = %e, "Unreadable run record, ignoring it");
                Ok(None)
            }
        }
    }

    fn store(&mut self, key: &str, record: &RunInfo) -> Result<()> {
        self.switch_to(key)?;
        std::fs::write(
            self.repo.path().join(RUN_INFO_FILE),
            serde_json::to_string(record)?,
        )?;
        self.repo.add(RUN_INFO_FILE)?;
        if !self.repo.has_changes()? {
            info!(branch = key, "State unchanged, nothing to commit");
            return Ok(());
        }
        self.repo.commit(&format!("Update {}", RUN_INFO_FILE))?;
        self.repo.push("origin", &format!("HEAD:{}", key))
    }
}
