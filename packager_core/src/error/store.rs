//! Repository store errors

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the repository session itself
#[derive(Error, Debug)]
pub enum StoreError {
    /// The persisted repository state could not be read
    #[error("Repository store at {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// A write was attempted through a read-only session
    #[error("Session is read-only")]
    ReadOnly,

    /// An operation referenced an object the store does not know
    #[error("Unknown repository object: {handle}")]
    UnknownObject { handle: String },

    /// The session was already committed or aborted
    #[error("Session has already been closed")]
    SessionClosed,

    /// Serialization of the repository state failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a corrupt store error
    pub fn corrupt(path: &std::path::Path, reason: &str) -> Self {
        Self::Corrupt {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Create an unknown object error
    pub fn unknown_object(handle: &str) -> Self {
        Self::UnknownObject {
            handle: handle.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_corrupt_message() {
        let error = StoreError::corrupt(Path::new("/data/repository.json"), "unexpected EOF");
        assert!(error.to_string().contains("/data/repository.json"));
        assert!(error.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn test_unknown_object_message() {
        let error = StoreError::unknown_object("123456/99");
        assert!(error.to_string().contains("123456/99"));
    }
}
