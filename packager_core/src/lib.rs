//! Packager Core Library
//!
//! Core types for ingesting and disseminating archival packages: package
//! parameters, operating modes, the session and plugin contracts the command
//! line orchestrator drives, and the built-in JSON store and JSON-AIP packager.

pub mod aip;
pub mod error;
pub mod location;
pub mod mode;
pub mod model;
pub mod naming;
pub mod params;
pub mod plugin;
pub mod registry;
pub mod session;
pub mod store;

// Re-export main types
pub use aip::JsonAipPackager;
pub use error::{Error, Result};
pub use location::{PackageLocation, expand_sources};
pub use mode::{ModeFlags, OperatingMode};
pub use model::{NewObject, ObjectType, Principal, RepositoryObject};
pub use params::PackageParameters;
pub use plugin::{PackageDisseminator, PackageIngester};
pub use registry::PluginRegistry;
pub use session::{IdentityResolver, PrincipalDirectory, Session, SessionMode, SessionProvider};
pub use store::JsonSessionProvider;
