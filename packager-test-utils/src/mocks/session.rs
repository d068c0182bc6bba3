//! In-memory session and provider with an inspectable journal

use packager_core::error::{PackagingError, StoreError};
use packager_core::{
    IdentityResolver, NewObject, Principal, PrincipalDirectory, RepositoryObject, Result,
    Session, SessionMode, SessionProvider,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Handle prefix of objects minted by the mock repository
pub const MOCK_HANDLE_PREFIX: &str = "123456789";

/// Record of everything the orchestrator did with sessions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionJournal {
    pub opens: usize,
    pub commits: usize,
    pub aborts: usize,
    /// Handles passed to `resolve`, in call order
    pub resolved: Vec<String>,
    /// Emails passed to `find_principal`, in call order
    pub principal_lookups: Vec<String>,
    /// Modes applied with `set_mode`, in call order
    pub modes: Vec<SessionMode>,
    /// Last principal set as the current user
    pub current_user: Option<Principal>,
}

#[derive(Debug, Default)]
struct MockRepository {
    persisted: BTreeMap<String, RepositoryObject>,
    principals: Vec<Principal>,
    next_id: u64,
    fail_commit: bool,
    journal: SessionJournal,
}

/// Session provider backed by a shared in-memory repository
///
/// Clones share the repository, so a test can hand one clone to the code
/// under test and inspect the journal through another.
///
/// # Examples
///
/// ```rust
/// use packager_test_utils::MockSessionProvider;
/// use packager_core::{Session, SessionProvider};
///
/// let provider = MockSessionProvider::new().with_principal("admin@example.org");
/// let mut session = provider.open().unwrap();
/// session.commit().unwrap();
///
/// assert_eq!(provider.journal().opens, 1);
/// assert_eq!(provider.journal().commits, 1);
/// ```
#[derive(Clone, Default)]
pub struct MockSessionProvider {
    repository: Arc<Mutex<MockRepository>>,
}

impl MockSessionProvider {
    pub fn new() -> Self {
        let provider = Self::default();
        provider.repository.lock().unwrap().next_id = 1;
        provider
    }

    /// Make `email` a known principal
    pub fn with_principal(self, email: &str) -> Self {
        self.repository
            .lock()
            .unwrap()
            .principals
            .push(Principal::new(email));
        self
    }

    /// Seed an already persisted object
    pub fn with_object(self, object: RepositoryObject) -> Self {
        {
            let mut repository = self.repository.lock().unwrap();
            repository.next_id = repository.next_id.max(object.id + 1);
            repository.persisted.insert(object.handle.clone(), object);
        }
        self
    }

    /// Make every commit fail with a store error
    pub fn with_failing_commit(self) -> Self {
        self.repository.lock().unwrap().fail_commit = true;
        self
    }

    pub fn journal(&self) -> SessionJournal {
        self.repository.lock().unwrap().journal.clone()
    }

    /// Objects that survived a commit
    pub fn persisted_objects(&self) -> Vec<RepositoryObject> {
        let mut objects: Vec<_> = self
            .repository
            .lock()
            .unwrap()
            .persisted
            .values()
            .cloned()
            .collect();
        objects.sort_by_key(|object| object.id);
        objects
    }

    pub fn persisted(&self, handle: &str) -> Option<RepositoryObject> {
        self.repository.lock().unwrap().persisted.get(handle).cloned()
    }
}

impl SessionProvider for MockSessionProvider {
    fn open(&self) -> Result<Box<dyn Session>> {
        let mut repository = self.repository.lock().unwrap();
        repository.journal.opens += 1;

        Ok(Box::new(MockSession {
            repository: self.repository.clone(),
            working: repository.persisted.clone(),
            next_id: repository.next_id,
            current_user: None,
            mode: SessionMode::default(),
            closed: false,
        }))
    }
}

/// Session over a private working copy of the mock repository
pub struct MockSession {
    repository: Arc<Mutex<MockRepository>>,
    working: BTreeMap<String, RepositoryObject>,
    next_id: u64,
    current_user: Option<Principal>,
    mode: SessionMode,
    closed: bool,
}

impl MockSession {
    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(StoreError::SessionClosed.into());
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        self.ensure_open()?;
        if self.mode == SessionMode::ReadOnly {
            return Err(StoreError::ReadOnly.into());
        }
        Ok(())
    }
}

impl IdentityResolver for MockSession {
    fn resolve(&self, handle: &str) -> Result<Option<RepositoryObject>> {
        self.ensure_open()?;
        self.repository
            .lock()
            .unwrap()
            .journal
            .resolved
            .push(handle.to_string());
        Ok(self.working.get(handle).cloned())
    }

    fn children(&self, object: &RepositoryObject) -> Result<Vec<RepositoryObject>> {
        self.ensure_open()?;
        let mut children: Vec<_> = self
            .working
            .values()
            .filter(|child| child.parent.as_deref() == Some(object.handle.as_str()))
            .cloned()
            .collect();
        children.sort_by_key(|child| child.id);
        Ok(children)
    }
}

impl PrincipalDirectory for MockSession {
    fn find_principal(&self, email: &str) -> Result<Option<Principal>> {
        self.ensure_open()?;
        let mut repository = self.repository.lock().unwrap();
        repository.journal.principal_lookups.push(email.to_string());
        Ok(repository
            .principals
            .iter()
            .find(|principal| principal.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

impl Session for MockSession {
    fn set_current_user(&mut self, principal: Principal) {
        self.repository.lock().unwrap().journal.current_user = Some(principal.clone());
        self.current_user = Some(principal);
    }

    fn current_user(&self) -> Option<&Principal> {
        self.current_user.as_ref()
    }

    fn set_mode(&mut self, mode: SessionMode) {
        self.repository.lock().unwrap().journal.modes.push(mode);
        self.mode = mode;
    }

    fn mode(&self) -> SessionMode {
        self.mode
    }

    fn create_object(&mut self, object: NewObject) -> Result<RepositoryObject> {
        self.ensure_writable()?;
        if let Some(handle) = &object.handle
            && self.working.contains_key(handle)
        {
            return Err(PackagingError::collision(handle).into());
        }

        let id = self.next_id;
        self.next_id += 1;
        let handle = object
            .handle
            .unwrap_or_else(|| format!("{MOCK_HANDLE_PREFIX}/{id}"));

        let created = RepositoryObject {
            id,
            handle: handle.clone(),
            kind: object.kind,
            name: object.name,
            parent: object.parent,
            in_workflow: object.in_workflow,
            metadata: object.metadata,
        };
        self.working.insert(handle, created.clone());
        Ok(created)
    }

    fn remove_object(&mut self, handle: &str) -> Result<()> {
        self.ensure_writable()?;
        if !self.working.contains_key(handle) {
            return Err(StoreError::unknown_object(handle).into());
        }

        let mut doomed = vec![handle.to_string()];
        let mut index = 0;
        while index < doomed.len() {
            let current = doomed[index].clone();
            doomed.extend(
                self.working
                    .values()
                    .filter(|object| object.parent.as_deref() == Some(current.as_str()))
                    .map(|object| object.handle.clone()),
            );
            index += 1;
        }
        for handle in doomed {
            self.working.remove(&handle);
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;

        let mut repository = self.repository.lock().unwrap();
        repository.journal.commits += 1;
        if repository.fail_commit {
            return Err(StoreError::corrupt(std::path::Path::new("mock"), "commit failed").into());
        }
        repository.persisted = std::mem::take(&mut self.working);
        repository.next_id = self.next_id;
        Ok(())
    }

    fn abort(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.working.clear();
        self.repository.lock().unwrap().journal.aborts += 1;
    }
}
