//! Thin wrapper over the `git` command line.

use crate::process::Invocation;
use cbl_core::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Author and committer used for state commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitIdentity {
    pub name: String,
    pub email: String,
}

impl GitIdentity {
    /// Identity of a GitHub user, with their noreply address.
    pub fn github_user(actor: &str) -> Self {
        Self {
            name: actor.to_string(),
            email: format!("{}@users.noreply.github.com", actor),
        }
    }
}

/// A local clone.
///
/// Configuration is passed per invocation with `-c` so the user's global
/// git config is never modified.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
    identity: GitIdentity,
}

impl GitRepo {
    /// Clone `url` into `dest`.
    pub fn clone_from(url: &str, dest: &Path, identity: GitIdentity) -> Result<Self> {
        info!(url, dest = %dest.display(), "Cloning repository");
        Invocation::new("git").arg("clone").arg(url).arg(dest).run()?;
        Ok(Self::open(dest, identity))
    }

    /// Use an existing clone.
    pub fn open(path: &Path, identity: GitIdentity) -> Self {
        Self {
            path: path.to_path_buf(),
            identity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn git(&self) -> Invocation {
        Invocation::new("git")
            .arg("-c")
            .arg(format!("safe.directory={}", self.path.display()))
            .arg("-c")
            .arg(format!("user.name={}", self.identity.name))
            .arg("-c")
            .arg(format!("user.email={}", self.identity.email))
            .current_dir(&self.path)
    }

    /// Point a remote at a URL carrying credentials.
    pub fn set_remote_url(&self, remote: &str, url: &str) -> Result<()> {
        self.git()
            .args(["remote", "set-url", remote])
            .secret_arg(url)
            .run()
    }

    /// Whether `origin` has a branch named `branch`.
    pub fn remote_branch_exists(&self, branch: &str) -> Result<bool> {
        self.git()
            .args(["show-ref", "--verify", "--quiet"])
            .arg(format!("refs/remotes/origin/{}", branch))
            .probe()
    }

    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.git().args(["checkout", branch]).run()
    }

    /// Start a branch with no history and an empty tree.
    pub fn checkout_orphan(&self, branch: &str) -> Result<()> {
        self.git().args(["checkout", "--orphan", branch]).run()?;
        self.git()
            .args(["rm", "-r", "-f", "-q", "--ignore-unmatch", "."])
            .run()
    }

    pub fn add(&self, path: &str) -> Result<()> {
        self.git().args(["add", path]).run()
    }

    /// Whether the worktree or index differ from HEAD, untracked files included.
    pub fn has_changes(&self) -> Result<bool> {
        let status = self.git().args(["status", "--porcelain", "-u"]).output()?;
        Ok(!status.trim().is_empty())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.git().args(["commit", "-q", "-m", message]).run()
    }

    pub fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        info!(remote, refspec, "Pushing");
        self.git().args(["push", "-q", remote, refspec]).run()
    }
}

/// Commit `git_ref` points at in the remote repository `url`.
pub fn ls_remote_sha(url: &str, git_ref: &str) -> Result<String> {
    let listing = Invocation::new("git")
        .args(["ls-remote", url, git_ref])
        .output()?;
    parse_ls_remote(&listing)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidConfig(format!("{} has no ref {}", url, git_ref)))
}

/// Hash in front of the first tab of `git ls-remote` output.
pub fn parse_ls_remote(listing: &str) -> Option<&str> {
    listing
        .split_once('\t')
        .map(|(sha, _)| sha.trim())
        .filter(|sha| !sha.is_empty())
}
