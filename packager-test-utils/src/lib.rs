//! Test utilities for the packager
//!
//! This crate provides mock sessions and plugins, object and package builders,
//! and capturing writers for testing the packager crates.

pub mod builders;
pub mod mocks;
pub mod output;

// Re-export commonly used types
pub use builders::{AipTree, ManifestBuilder, ObjectBuilder};
pub use mocks::{
    MockDisseminator, MockIngester, MockSession, MockSessionProvider, PluginCall, SessionJournal,
};
pub use output::SharedBuffer;
