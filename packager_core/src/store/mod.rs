//! JSON-file repository store
//!
//! A small self-contained store: the whole repository lives in one pretty
//! printed JSON document. Each session works on a copy of it that replaces the
//! file on commit.

mod session;
mod state;

pub use session::JsonSession;
pub use state::RepositoryState;

use crate::error::Result;
use crate::model::Principal;
use crate::session::{Session, SessionProvider};
use std::path::{Path, PathBuf};

/// Handle prefix used when none is configured
pub const DEFAULT_HANDLE_PREFIX: &str = "123456789";

/// Opens sessions over a JSON repository file
#[derive(Debug, Clone)]
pub struct JsonSessionProvider {
    path: PathBuf,
    handle_prefix: String,
    principals: Vec<Principal>,
}

impl JsonSessionProvider {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            handle_prefix: DEFAULT_HANDLE_PREFIX.to_string(),
            principals: Vec::new(),
        }
    }

    /// Prefix for handles minted in a repository that does not exist yet
    pub fn with_handle_prefix(mut self, prefix: &str) -> Self {
        self.handle_prefix = prefix.to_string();
        self
    }

    /// Principals known in addition to the ones stored in the repository
    pub fn with_principals<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.principals
            .extend(emails.into_iter().map(|email| Principal::new(email.as_ref())));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionProvider for JsonSessionProvider {
    fn open(&self) -> Result<Box<dyn Session>> {
        let state = RepositoryState::load(&self.path, &self.handle_prefix)?;
        log::debug!("Opened session on {}", self.path.display());
        Ok(Box::new(JsonSession::new(
            self.path.clone(),
            state,
            self.principals.clone(),
        )))
    }
}
