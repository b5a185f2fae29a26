//! LLVM toolchain versions.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A released LLVM major version or the `nightly` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawVersion", into = "RawVersion")]
pub enum LlvmVersion {
    Release(u32),
    Nightly,
}

const NIGHTLY: &str = "nightly";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Number(u32),
    Text(String),
}

impl TryFrom<RawVersion> for LlvmVersion {
    type Error = String;

    fn try_from(raw: RawVersion) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawVersion::Number(n) => Ok(LlvmVersion::Release(n)),
            RawVersion::Text(s) => s.parse(),
        }
    }
}

impl From<LlvmVersion> for RawVersion {
    fn from(version: LlvmVersion) -> Self {
        match version {
            LlvmVersion::Release(n) => RawVersion::Number(n),
            LlvmVersion::Nightly => RawVersion::Text(NIGHTLY.to_string()),
        }
    }
}

impl LlvmVersion {
    /// Tag of the `tuxmake/clang-*` image. The top-of-tree release is only
    /// published under `nightly`.
    pub fn container_tag(&self, tot: Option<u32>) -> String {
        match (self, tot) {
            (LlvmVersion::Release(n), Some(max)) if *n == max => NIGHTLY.to_string(),
            _ => self.to_string(),
        }
    }

    /// Read the top-of-tree major version from a file holding a single integer.
    pub fn read_tot(path: &Path) -> Result<u32> {
        let contents = std::fs::read_to_string(path)?;
        contents.trim().parse().map_err(|_| {
            Error::InvalidConfig(format!(
                "{} does not hold an LLVM major version: {:?}",
                path.display(),
                contents.trim()
            ))
        })
    }
}

impl fmt::Display for LlvmVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlvmVersion::Release(n) => write!(f, "{}", n),
            LlvmVersion::Nightly => f.write_str(NIGHTLY),
        }
    }
}

impl std::str::FromStr for LlvmVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == NIGHTLY {
            return Ok(LlvmVersion::Nightly);
        }
        s.parse::<u32>()
            .map(LlvmVersion::Release)
            .map_err(|_| format!("Invalid LLVM version: {}", s))
    }
}
