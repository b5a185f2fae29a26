//! Workflow matrix expansion for the ClangBuiltLinux CI helpers.
//!
//! Turns the builds of one (tree, toolchain) pair into a GitHub Actions job
//! graph: a gated TuxSuite kick-off per config class followed by one
//! log-checking job per build.

pub mod builder;
pub mod job;
pub mod triggers;
pub mod workflow;

pub use builder::{GeneratedWorkflow, GeneratorSettings, WorkflowBuilder};
pub use job::{ConfigClass, job_id, job_name};
pub use triggers::Triggers;
pub use workflow::{Container, Job, Jobs, Step, Workflow};
