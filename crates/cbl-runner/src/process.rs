//! Synchronous execution of external commands.

use cbl_core::{Error, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, info};

/// A command line plus a printable label with secrets masked.
pub struct Invocation {
    command: Command,
    label: String,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        let label = program.as_ref().to_string_lossy().into_owned();
        Self {
            command: Command::new(program),
            label,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.label.push(' ');
        self.label.push_str(&arg.as_ref().to_string_lossy());
        self.command.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Argument that must not show up in logs or errors.
    pub fn secret_arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.label.push_str(" ***");
        self.command.arg(arg);
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.command.current_dir(dir);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Run to completion and return stdout. Non-zero exit is an error.
    pub fn output(mut self) -> Result<String> {
        let start = Instant::now();
        debug!(command = %self.label, "Executing command");

        let output = self
            .command
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                command: self.label.clone(),
                source,
            })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(command = %self.label, status = %output.status, duration_ms, "Command completed");

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: self.label,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run to completion discarding output.
    pub fn run(self) -> Result<()> {
        self.output().map(|_| ())
    }

    /// Run with the parent's stdio, for commands whose output belongs in
    /// the job log.
    pub fn run_inherited(mut self) -> Result<()> {
        info!(command = %self.label, "Executing command");
        let status = self.command.status().map_err(|source| Error::Spawn {
            command: self.label.clone(),
            source,
        })?;
        if !status.success() {
            return Err(Error::CommandFailed {
                command: self.label,
                status: status.to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Run a probe whose exit status answers a yes/no question. Status 0
    /// is yes, status 1 is no, anything else is an error.
    pub fn probe(mut self) -> Result<bool> {
        debug!(command = %self.label, "Probing");
        let output = self
            .command
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                command: self.label.clone(),
                source,
            })?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(Error::CommandFailed {
                command: self.label,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
        }
    }
}
