//! Current upstream state gathered from installed tools.

use crate::git::ls_remote_sha;
use crate::process::Invocation;
use cbl_core::{Error, Result, StateProbe};

/// [`StateProbe`] that asks the compiler and the remote directly.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    compiler: String,
}

impl CommandProbe {
    pub fn new(compiler: impl Into<String>) -> Self {
        Self {
            compiler: compiler.into(),
        }
    }
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self::new("clang")
    }
}

impl StateProbe for CommandProbe {
    fn compiler_version(&self) -> Result<String> {
        let output = Invocation::new(&self.compiler).arg("--version").output()?;
        version_line(&output).ok_or_else(|| {
            Error::InvalidConfig(format!("{} --version printed nothing", self.compiler))
        })
    }

    fn remote_sha(&self, repo: &str, git_ref: &str) -> Result<String> {
        ls_remote_sha(repo, git_ref)
    }
}

/// First line of `--version` output.
fn version_line(output: &str) -> Option<String> {
    output
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        let output = "clang version 17.0.6\nTarget: x86_64-pc-linux-gnu\nThread model: posix\n";
        assert_eq!(version_line(output).as_deref(), Some("clang version 17.0.6"));
        assert_eq!(version_line(""), None);
    }

    #[test]
    fn test_missing_compiler_is_error() {
        let probe = CommandProbe::new("clang-that-does-not-exist");
        assert!(probe.compiler_version().is_err());
    }
}
