//! Error types for the CI helpers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("Could not find git repo and ref for {0}?")]
    TreeNotFound(String),

    #[error("Could not find schedule for {tree} clang-{llvm_version}?")]
    ScheduleNotFound { tree: String, llvm_version: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Environment errors
    #[error("Required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Wrong execution context: {0}")]
    WrongContext(String),

    // External command errors
    #[error("Command `{command}` failed with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Network error: {0}")]
    Network(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
