//! Usage error types
//!
//! Usage errors are raised before anything in the repository is mutated.

use thiserror::Error;

/// Invalid or unresolvable invocation input
#[derive(Error, Debug)]
pub enum UsageError {
    /// Missing required argument or option
    #[error("Missing required argument: {argument}")]
    MissingArgument { argument: String },

    /// The actor identity does not resolve to a known principal
    #[error("EPerson cannot be found: {email}")]
    UnknownPrincipal { email: String },

    /// No plugin of the required role is registered under the alias
    #[error("Unknown package type: {package_type} (no {role} plugin registered)")]
    UnknownPackageType { package_type: String, role: String },

    /// A parent handle did not resolve
    #[error("Bad parent list -- Cannot resolve parent handle \"{handle}\"")]
    UnresolvedParent { handle: String },

    /// A target handle did not resolve
    #[error("Bad identifier/handle -- Cannot resolve handle \"{handle}\"")]
    UnresolvedIdentifier { handle: String },
}

impl UsageError {
    /// Create a missing argument error
    pub fn missing_argument(argument: &str) -> Self {
        Self::MissingArgument {
            argument: argument.to_string(),
        }
    }

    /// Create an unknown principal error
    pub fn unknown_principal(email: &str) -> Self {
        Self::UnknownPrincipal {
            email: email.to_string(),
        }
    }

    /// Create an unknown package type error
    pub fn unknown_package_type(package_type: &str, role: &str) -> Self {
        Self::UnknownPackageType {
            package_type: package_type.to_string(),
            role: role.to_string(),
        }
    }

    /// Create an unresolved parent error
    pub fn unresolved_parent(handle: &str) -> Self {
        Self::UnresolvedParent {
            handle: handle.to_string(),
        }
    }

    /// Create an unresolved identifier error
    pub fn unresolved_identifier(handle: &str) -> Self {
        Self::UnresolvedIdentifier {
            handle: handle.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_error() {
        let error = UsageError::missing_argument("-t <type>");
        assert!(error.to_string().contains("Missing required argument"));
        assert!(error.to_string().contains("-t <type>"));
    }

    #[test]
    fn test_unknown_principal_error() {
        let error = UsageError::unknown_principal("nobody@example.org");
        assert!(error.to_string().contains("nobody@example.org"));
    }

    #[test]
    fn test_unknown_package_type_error() {
        let error = UsageError::unknown_package_type("METS", "ingester");
        assert!(error.to_string().contains("METS"));
        assert!(error.to_string().contains("ingester"));
    }

    #[test]
    fn test_unresolved_handles() {
        let parent = UsageError::unresolved_parent("123456/404");
        assert!(parent.to_string().contains("parent handle"));
        assert!(parent.to_string().contains("123456/404"));

        let identifier = UsageError::unresolved_identifier("123456/405");
        assert!(identifier.to_string().contains("Cannot resolve handle"));
        assert!(identifier.to_string().contains("123456/405"));
    }
}
