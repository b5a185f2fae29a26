//! Generator configuration types.
//!
//! These types represent the hand-maintained `generator.yml` describing the
//! trees, builds and schedules that workflows are generated from.

use crate::toolchain::LlvmVersion;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub trees: Vec<Tree>,
    pub builds: Vec<Build>,
    pub tree_schedules: Vec<Schedule>,
}

/// An upstream kernel source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    pub name: String,
    pub git_repo: String,
    pub git_ref: String,
}

/// One compiler, config and architecture combination under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub git_repo: String,
    pub git_ref: String,
    pub llvm_version: LlvmVersion,
    #[serde(rename = "ARCH", default = "default_arch")]
    pub arch: String,
    pub boot: bool,
    #[serde(default)]
    pub llvm: bool,
    pub config: ConfigValue,
    #[serde(default)]
    pub make_variables: BTreeMap<String, MakeValue>,
}

fn default_arch() -> String {
    "x86_64".to_string()
}

/// Cron schedule of one (tree, toolchain) workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub name: String,
    pub llvm_version: LlvmVersion,
    pub schedule: String,
}

/// A single config target or an ordered list of config fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Single(String),
    Fragments(Vec<String>),
}

impl ConfigValue {
    /// Substring test over the textual form of the value.
    ///
    /// Needles never contain the list punctuation of the textual form, so
    /// checking each fragment is equivalent to searching the whole rendering.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            ConfigValue::Single(s) => s.contains(needle),
            ConfigValue::Fragments(parts) => parts.iter().any(|p| p.contains(needle)),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Single(s) => f.write_str(s),
            ConfigValue::Fragments(parts) => f.write_str(&parts.join("+")),
        }
    }
}

/// Scalar value of a make variable (`LLVM_IAS: 0`, `LD: ld.bfd`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MakeValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for MakeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MakeValue::Bool(b) => write!(f, "{}", b),
            MakeValue::Int(i) => write!(f, "{}", i),
            MakeValue::Text(s) => f.write_str(s),
        }
    }
}

impl Build {
    pub fn make_variable(&self, name: &str) -> Option<&MakeValue> {
        self.make_variables.get(name)
    }

    pub fn tracks(&self, repo: &str, git_ref: &str, llvm_version: LlvmVersion) -> bool {
        self.git_repo == repo && self.git_ref == git_ref && self.llvm_version == llvm_version
    }
}

impl GeneratorConfig {
    /// Load the configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        debug!(
            path = %path.display(),
            trees = config.trees.len(),
            builds = config.builds.len(),
            "Loaded generator config"
        );
        Ok(config)
    }

    /// Parse a YAML document, resolving `<<` merge keys first.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        value.apply_merge()?;
        Ok(serde_yaml::from_value(value)?)
    }

    /// Look up the git repository and ref of a tree.
    pub fn get_repo_ref(&self, tree_name: &str) -> Result<(&str, &str)> {
        self.trees
            .iter()
            .find(|tree| tree.name == tree_name)
            .map(|tree| (tree.git_repo.as_str(), tree.git_ref.as_str()))
            .ok_or_else(|| Error::TreeNotFound(tree_name.to_string()))
    }

    /// Look up the cron expression of a (tree, toolchain) workflow.
    pub fn get_cron_schedule(&self, tree_name: &str, llvm_version: LlvmVersion) -> Result<&str> {
        self.tree_schedules
            .iter()
            .find(|item| item.name == tree_name && item.llvm_version == llvm_version)
            .map(|item| item.schedule.as_str())
            .ok_or_else(|| Error::ScheduleNotFound {
                tree: tree_name.to_string(),
                llvm_version: llvm_version.to_string(),
            })
    }

    pub fn builds_for<'a>(
        &'a self,
        repo: &'a str,
        git_ref: &'a str,
        llvm_version: LlvmVersion,
    ) -> impl Iterator<Item = &'a Build> + 'a {
        self.builds
            .iter()
            .filter(move |build| build.tracks(repo, git_ref, llvm_version))
    }

    /// Toolchain versions built for a tree, in first-seen order.
    pub fn llvm_versions(&self, tree_name: &str) -> Result<Vec<LlvmVersion>> {
        let (repo, git_ref) = self.get_repo_ref(tree_name)?;
        let mut versions = Vec::new();
        for build in &self.builds {
            if build.git_repo == repo
                && build.git_ref == git_ref
                && !versions.contains(&build.llvm_version)
            {
                versions.push(build.llvm_version);
            }
        }
        Ok(versions)
    }
}
