//! ClangBuiltLinux CI core
//!
//! Domain types, the generator configuration loader, the run-state record
//! and the state channel port shared by the other crates.

pub mod config;
pub mod error;
pub mod ports;
pub mod run_info;
pub mod toolchain;

pub use config::{Build, ConfigValue, GeneratorConfig, MakeValue, Schedule, Tree};
pub use error::{Error, Result};
pub use ports::{MemoryStateChannel, StateChannel, StateProbe};
pub use run_info::RunInfo;
pub use toolchain::LlvmVersion;
