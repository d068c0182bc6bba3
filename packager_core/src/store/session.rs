//! Session over the JSON repository store

use super::state::RepositoryState;
use crate::error::{Result, StoreError};
use crate::model::{NewObject, Principal, RepositoryObject};
use crate::session::{IdentityResolver, PrincipalDirectory, Session, SessionMode};
use std::path::PathBuf;

/// A working copy of the repository, written back only on commit
pub struct JsonSession {
    path: PathBuf,
    /// `None` once the session has been committed or aborted
    state: Option<RepositoryState>,
    configured_principals: Vec<Principal>,
    current_user: Option<Principal>,
    mode: SessionMode,
}

impl JsonSession {
    pub(super) fn new(
        path: PathBuf,
        state: RepositoryState,
        configured_principals: Vec<Principal>,
    ) -> Self {
        Self {
            path,
            state: Some(state),
            configured_principals,
            current_user: None,
            mode: SessionMode::default(),
        }
    }

    fn state(&self) -> Result<&RepositoryState> {
        self.state.as_ref().ok_or_else(|| StoreError::SessionClosed.into())
    }

    fn state_for_write(&mut self) -> Result<&mut RepositoryState> {
        if self.mode == SessionMode::ReadOnly {
            return Err(StoreError::ReadOnly.into());
        }
        self.state.as_mut().ok_or_else(|| StoreError::SessionClosed.into())
    }
}

impl IdentityResolver for JsonSession {
    fn resolve(&self, handle: &str) -> Result<Option<RepositoryObject>> {
        Ok(self.state()?.get(handle).cloned())
    }

    fn children(&self, object: &RepositoryObject) -> Result<Vec<RepositoryObject>> {
        Ok(self.state()?.children(&object.handle))
    }
}

impl PrincipalDirectory for JsonSession {
    fn find_principal(&self, email: &str) -> Result<Option<Principal>> {
        let stored = self.state()?.find_principal(email);
        let configured = self
            .configured_principals
            .iter()
            .find(|principal| principal.email.eq_ignore_ascii_case(email));
        Ok(stored.or(configured).cloned())
    }
}

impl Session for JsonSession {
    fn set_current_user(&mut self, principal: Principal) {
        self.current_user = Some(principal);
    }

    fn current_user(&self) -> Option<&Principal> {
        self.current_user.as_ref()
    }

    fn set_mode(&mut self, mode: SessionMode) {
        self.mode = mode;
    }

    fn mode(&self) -> SessionMode {
        self.mode
    }

    fn create_object(&mut self, object: NewObject) -> Result<RepositoryObject> {
        let created = self.state_for_write()?.insert(object)?;
        log::debug!("Created {}", created.describe());
        Ok(created)
    }

    fn remove_object(&mut self, handle: &str) -> Result<()> {
        let removed = self.state_for_write()?.remove(handle)?;
        log::debug!("Removed {handle} and {} descendants", removed - 1);
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let state = self.state.take().ok_or(StoreError::SessionClosed)?;
        if self.mode == SessionMode::ReadOnly {
            log::debug!("Closing read-only session");
            return Ok(());
        }
        state.save(&self.path)
    }

    fn abort(&mut self) {
        if self.state.take().is_some() {
            log::debug!("Discarding uncommitted changes to {}", self.path.display());
        }
    }
}
