//! Packager plugin contracts
//!
//! An ingester turns packages into repository objects, a disseminator turns
//! repository objects into packages. The `*_all` forms walk the whole tree and
//! own that walk: the caller only sees the final list or the first fatal error.

use crate::error::Result;
use crate::location::PackageLocation;
use crate::model::RepositoryObject;
use crate::params::PackageParameters;
use crate::session::Session;
use std::path::PathBuf;

/// Creates, restores and replaces objects from packages
pub trait PackageIngester: Send + Sync {
    /// Create (or restore) one object from one package
    ///
    /// `parent` is the owning parent chosen by the caller; when `None` the
    /// plugin must work it out from the package or fail.
    fn ingest(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject>;

    /// Ingest a package and every package it references
    ///
    /// Returns the handles of all created objects, top-level first.
    fn ingest_all(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<Vec<String>>;

    /// Replace one existing object with the contents of a package
    fn replace(
        &self,
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject>;

    /// Replace an object and everything its package references
    fn replace_all(
        &self,
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<Vec<String>>;

    /// Human-readable description of the options this plugin understands
    fn parameter_help(&self) -> String;
}

/// Writes objects out as packages
pub trait PackageDisseminator: Send + Sync {
    /// Write one object to one package
    fn disseminate(
        &self,
        session: &dyn Session,
        target: &RepositoryObject,
        params: &PackageParameters,
        destination: &PackageLocation,
    ) -> Result<()>;

    /// Write an object and all its descendants, returning every file produced
    fn disseminate_all(
        &self,
        session: &dyn Session,
        target: &RepositoryObject,
        params: &PackageParameters,
        destination: &PackageLocation,
    ) -> Result<Vec<PathBuf>>;

    /// Human-readable description of the options this plugin understands
    fn parameter_help(&self) -> String;
}
