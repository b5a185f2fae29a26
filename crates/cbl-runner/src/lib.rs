//! Process, git and run-gate execution for the ClangBuiltLinux CI helpers.

pub mod boot;
pub mod env;
pub mod gate;
pub mod git;
pub mod probe;
pub mod process;
pub mod state;

pub use boot::BootTest;
pub use env::ActionsContext;
pub use gate::{GateOutcome, RunGate};
pub use git::{GitIdentity, GitRepo};
pub use probe::CommandProbe;
pub use process::Invocation;
pub use state::{GitStateChannel, GitStateSettings};
