//! Repository session interfaces
//!
//! A session is the single transactional scope of a run. Everything a run
//! changes happens through one session and becomes permanent only when the
//! session is committed; aborting discards all of it.

use crate::error::Result;
use crate::model::{NewObject, Principal, RepositoryObject};

/// Access mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Reads only, used for dissemination
    ReadOnly,
    /// Bulk changes, used for ingest and replace
    #[default]
    BatchEdit,
}

/// Resolves handles to repository objects
pub trait IdentityResolver {
    /// Look up an object by handle; `Ok(None)` when nothing has that handle
    fn resolve(&self, handle: &str) -> Result<Option<RepositoryObject>>;

    /// Direct children of an object, in a stable order
    fn children(&self, object: &RepositoryObject) -> Result<Vec<RepositoryObject>>;
}

/// Looks up the principals allowed to act on the repository
pub trait PrincipalDirectory {
    fn find_principal(&self, email: &str) -> Result<Option<Principal>>;
}

/// A transactional scope over the repository
pub trait Session: IdentityResolver + PrincipalDirectory {
    fn set_current_user(&mut self, principal: Principal);

    fn current_user(&self) -> Option<&Principal>;

    fn set_mode(&mut self, mode: SessionMode);

    fn mode(&self) -> SessionMode;

    /// Create an object; a requested handle that is already taken yields a collision
    fn create_object(&mut self, object: NewObject) -> Result<RepositoryObject>;

    /// Remove an object together with everything beneath it
    fn remove_object(&mut self, handle: &str) -> Result<()>;

    /// Make every change of this session permanent
    fn commit(&mut self) -> Result<()>;

    /// Discard every change of this session
    fn abort(&mut self);
}

/// Opens sessions against a repository
pub trait SessionProvider {
    fn open(&self) -> Result<Box<dyn Session>>;
}

/// Every object beneath `root`, depth-first with parents before children
pub fn descendants(
    resolver: &dyn IdentityResolver,
    root: &RepositoryObject,
) -> Result<Vec<RepositoryObject>> {
    let mut found = Vec::new();
    let mut stack = resolver.children(root)?;
    stack.reverse();

    while let Some(object) = stack.pop() {
        let mut children = resolver.children(&object)?;
        children.reverse();
        found.push(object);
        stack.extend(children);
    }

    Ok(found)
}
