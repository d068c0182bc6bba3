//! Packager command line library
//!
//! Argument parsing, configuration and the orchestrator behind the
//! `packager` binary, exposed for integration tests.

pub mod args;
pub mod config;
pub mod error;
pub mod orchestrators;
pub mod output;
pub mod paths;
pub mod progress;
pub mod prompt;
pub mod terminal;

pub use args::PackagerArgs;
pub use error::{CliError, CliResult, ExitCode};
pub use orchestrators::{PackagerOrchestrator, PackagerRequest, RunOutcome, RunSummary};
