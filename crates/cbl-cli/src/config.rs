//! CLI configuration management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Generator config, relative to the checkout root.
    #[serde(default = "default_generator_file")]
    pub generator_file: PathBuf,
    /// File holding the top-of-tree LLVM major version.
    #[serde(default = "default_tot_version_file")]
    pub tot_version_file: PathBuf,
    /// Where generated workflows are written.
    #[serde(default = "default_workflow_dir")]
    pub workflow_dir: String,
    /// Where TuxSuite plans live.
    #[serde(default = "default_tuxsuite_dir")]
    pub tuxsuite_dir: String,
    /// Per-tree patch directories.
    #[serde(default = "default_patches_dir")]
    pub patches_dir: String,
    /// Command cache-check jobs run.
    #[serde(default = "default_gate_command")]
    pub gate_command: String,
    /// Crate cache-check jobs build the gate from; unset when
    /// `gate_command` needs no install.
    #[serde(default = "default_gate_source")]
    pub gate_source: Option<String>,
    /// Compiler whose version is recorded by the run gate.
    #[serde(default = "default_compiler")]
    pub compiler: String,
    /// Repository owner the run gate is allowed to push state for.
    #[serde(default)]
    pub allowed_owner: Option<String>,
}

fn default_generator_file() -> PathBuf {
    PathBuf::from("generator.yml")
}

fn default_tot_version_file() -> PathBuf {
    PathBuf::from("LLVM_TOT_VERSION")
}

fn default_workflow_dir() -> String {
    ".github/workflows".to_string()
}

fn default_tuxsuite_dir() -> String {
    "tuxsuite".to_string()
}

fn default_patches_dir() -> String {
    "patches".to_string()
}

fn default_gate_command() -> String {
    "cbl-ci should-run".to_string()
}

fn default_gate_source() -> Option<String> {
    Some("crates/cbl-cli".to_string())
}

fn default_compiler() -> String {
    "clang".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            generator_file: default_generator_file(),
            tot_version_file: default_tot_version_file(),
            workflow_dir: default_workflow_dir(),
            tuxsuite_dir: default_tuxsuite_dir(),
            patches_dir: default_patches_dir(),
            gate_command: default_gate_command(),
            gate_source: default_gate_source(),
            compiler: default_compiler(),
            allowed_owner: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, or the default location.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, or the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("dev", "ClangBuiltLinux", "cbl-ci")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "generator_file" => self.generator_file = PathBuf::from(value),
            "tot_version_file" => self.tot_version_file = PathBuf::from(value),
            "workflow_dir" => self.workflow_dir = value.to_string(),
            "tuxsuite_dir" => self.tuxsuite_dir = value.to_string(),
            "patches_dir" => self.patches_dir = value.to_string(),
            "gate_command" => self.gate_command = value.to_string(),
            "gate_source" => {
                self.gate_source = (!value.is_empty()).then(|| value.to_string());
            }
            "compiler" => self.compiler = value.to_string(),
            "allowed_owner" => {
                self.allowed_owner = (!value.is_empty()).then(|| value.to_string());
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}
