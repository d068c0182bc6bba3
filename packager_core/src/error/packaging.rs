//! Plugin-level packaging errors

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while ingesting, replacing or disseminating a package
#[derive(Error, Debug)]
pub enum PackagingError {
    /// A restore asked for an identifier that already belongs to another object
    #[error("Identifier already in use: {handle}")]
    Collision { handle: String },

    /// The package file does not exist
    #[error("Package located at {} does not exist", path.display())]
    PackageNotFound { path: PathBuf },

    /// The package could not be understood or violates the repository structure
    #[error("Invalid package '{package}': {reason}")]
    InvalidPackage { package: String, reason: String },

    /// The submission workflow refused or failed the object
    #[error("Workflow error: {reason}")]
    Workflow { reason: String },

    /// The plugin does not support the requested operation
    #[error("Package type '{package_type}' does not support {operation}")]
    Unsupported {
        package_type: String,
        operation: String,
    },

    /// Generic packaging failure
    #[error("Packaging failed: {reason}")]
    Failed { reason: String },
}

impl PackagingError {
    /// Create a collision error
    pub fn collision(handle: &str) -> Self {
        Self::Collision {
            handle: handle.to_string(),
        }
    }

    /// Create a package not found error
    pub fn package_not_found(path: &Path) -> Self {
        Self::PackageNotFound {
            path: path.to_path_buf(),
        }
    }

    /// Create an invalid package error
    pub fn invalid_package(package: &str, reason: &str) -> Self {
        Self::InvalidPackage {
            package: package.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a workflow error
    pub fn workflow(reason: &str) -> Self {
        Self::Workflow {
            reason: reason.to_string(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(package_type: &str, operation: &str) -> Self {
        Self::Unsupported {
            package_type: package_type.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create a generic failure
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Workflow errors become generic failures, everything else is kept
    pub fn into_generic(self) -> Self {
        match self {
            Self::Workflow { reason } => Self::failed(format!("Workflow error: {reason}")),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message() {
        let error = PackagingError::collision("123456/42");
        assert!(error.to_string().contains("already in use"));
        assert!(error.to_string().contains("123456/42"));
    }

    #[test]
    fn test_package_not_found_message() {
        let error = PackagingError::package_not_found(Path::new("/tmp/missing.json"));
        assert!(error.to_string().contains("/tmp/missing.json"));
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn test_unsupported_message() {
        let error = PackagingError::unsupported("AIP", "dissemination to standard output");
        assert!(error.to_string().contains("AIP"));
        assert!(error.to_string().contains("standard output"));
    }

    #[test]
    fn test_into_generic_only_touches_workflow() {
        let invalid = PackagingError::invalid_package("a.json", "no type").into_generic();
        assert!(matches!(invalid, PackagingError::InvalidPackage { .. }));

        let workflow = PackagingError::workflow("no reviewers").into_generic();
        assert!(matches!(workflow, PackagingError::Failed { .. }));
    }
}
