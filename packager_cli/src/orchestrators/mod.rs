//! Command orchestrators
//!
//! The orchestrator coordinates between the CLI layer and the core library:
//! it validates a request, drives the packager plugins and owns the session.

pub mod packager_orchestrator;

pub use packager_orchestrator::{PackagerOrchestrator, PackagerRequest, RunOutcome, RunSummary};
