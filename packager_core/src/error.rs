//! Error types for the packager core library
//!
//! Errors are grouped by who raises them and how the orchestrator reacts:
//! - Usage errors: bad or unresolvable command input, detected before any mutation
//! - Packaging errors: raised by plugins; `Collision` is the one kind with a policy branch
//! - Store errors: the repository session itself failed
//! - I/O errors: reading or writing package files

use thiserror::Error;

pub mod io;
pub mod packaging;
pub mod store;
pub mod usage;

pub use self::io::{IoError, IoErrorKind};
pub use self::packaging::PackagingError;
pub use self::store::StoreError;
pub use self::usage::UsageError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the packager core library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or unresolvable invocation input
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Plugin-level failure
    #[error(transparent)]
    Packaging(#[from] PackagingError),

    /// Repository store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// I/O related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

impl Error {
    /// True when the error signals that a restore hit an identifier already in use
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::Packaging(PackagingError::Collision { .. }))
    }

    /// True for errors caused by the invocation itself rather than by the operation
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Translate workflow-layer failures into a generic packaging failure
    pub fn into_generic(self) -> Self {
        match self {
            Self::Packaging(err) => Self::Packaging(err.into_generic()),
            other => other,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io(IoError::from_std(source))
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Store(StoreError::Serialization(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::Path;

    #[test]
    fn test_collision_is_detected() {
        let error = Error::Packaging(PackagingError::collision("123456/7"));

        assert!(error.is_collision());
        assert!(!error.is_usage());
        assert!(error.to_string().contains("123456/7"));
    }

    #[test]
    fn test_other_packaging_errors_are_not_collisions() {
        let error = Error::Packaging(PackagingError::failed("format error"));
        assert!(!error.is_collision());

        let error = Error::Packaging(PackagingError::package_not_found(Path::new("a.json")));
        assert!(!error.is_collision());
    }

    #[test]
    fn test_usage_error_classification() {
        let error = Error::Usage(UsageError::missing_argument("-e"));

        assert!(error.is_usage());
        assert!(!error.is_collision());
    }

    #[test]
    fn test_into_generic_converts_workflow_errors() {
        let error = Error::Packaging(PackagingError::workflow("review step rejected item"));

        match error.into_generic() {
            Error::Packaging(PackagingError::Failed { reason }) => {
                assert!(reason.contains("review step rejected item"));
            }
            other => panic!("Expected generic packaging failure, got {other:?}"),
        }
    }

    #[test]
    fn test_into_generic_keeps_collisions() {
        let error = Error::Packaging(PackagingError::collision("123456/7")).into_generic();
        assert!(error.is_collision());
    }

    #[test]
    fn test_std_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "missing");
        let error: Error = io_error.into();

        match error {
            Error::Io(io_err) => assert_eq!(io_err.kind, IoErrorKind::FileNotFound),
            other => panic!("Expected Io error, got {other:?}"),
        }
    }
}
