//! CLI command definitions.

use cbl_core::LlvmVersion;
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Generate GitHub Actions workflows for a tree
    Generate {
        /// Tree name from generator.yml
        tree: String,

        /// Only generate the workflow for this toolchain (number or "nightly")
        #[arg(short, long)]
        llvm_version: Option<LlvmVersion>,

        /// Print the workflow instead of writing it
        #[arg(long)]
        stdout: bool,
    },

    /// Decide whether the calling workflow needs to run (exit 0 run, 2 skip)
    ShouldRun,

    /// Boot a kernel image in a user-mode Linux VM
    BootTest {
        /// URL of the kernel image
        #[arg(long)]
        kernel_url: String,

        /// Directory for the image and boot-utils
        #[arg(long, default_value = ".")]
        workdir: PathBuf,
    },

    /// Print the calling workflow's reference
    WorkflowRef,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}
