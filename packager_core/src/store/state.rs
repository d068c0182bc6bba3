//! On-disk repository state

use crate::error::{IoError, PackagingError, Result, StoreError};
use crate::model::{NewObject, Principal, RepositoryObject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Everything the JSON store persists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryState {
    pub handle_prefix: String,
    pub next_id: u64,
    #[serde(default)]
    pub principals: Vec<Principal>,
    /// Objects keyed by handle
    #[serde(default)]
    pub objects: BTreeMap<String, RepositoryObject>,
}

impl RepositoryState {
    /// An empty repository minting handles under `handle_prefix`
    pub fn new(handle_prefix: &str) -> Self {
        Self {
            handle_prefix: handle_prefix.to_string(),
            next_id: 1,
            principals: Vec::new(),
            objects: BTreeMap::new(),
        }
    }

    /// Read the state at `path`, or start empty if there is no file yet
    pub fn load(path: &Path, handle_prefix: &str) -> Result<Self> {
        if !path.exists() {
            log::debug!(
                "No repository store at {}, starting empty",
                path.display()
            );
            return Ok(Self::new(handle_prefix));
        }

        let contents = fs::read_to_string(path).map_err(|e| IoError::at(path, e))?;
        let state: Self = serde_json::from_str(&contents)
            .map_err(|e| StoreError::corrupt(path, &e.to_string()))?;

        if let Some(handle) = state
            .objects
            .iter()
            .find(|(handle, object)| *handle != &object.handle)
            .map(|(handle, _)| handle)
        {
            let reason = format!("object key {handle} does not match its handle");
            return Err(StoreError::corrupt(path, &reason).into());
        }

        log::debug!(
            "Loaded {} objects from {}",
            state.objects.len(),
            path.display()
        );
        Ok(state)
    }

    /// Write the state to `path`, replacing the previous file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|e| IoError::at(dir, e))?;

        let mut file = NamedTempFile::new_in(dir).map_err(|e| IoError::at(dir, e))?;
        serde_json::to_writer_pretty(&mut file, self)?;
        file.write_all(b"\n").map_err(|e| IoError::at(path, e))?;
        file.flush().map_err(|e| IoError::at(path, e))?;
        file.persist(path).map_err(|e| IoError::at(path, e.error))?;

        log::debug!("Saved {} objects to {}", self.objects.len(), path.display());
        Ok(())
    }

    pub fn get(&self, handle: &str) -> Option<&RepositoryObject> {
        self.objects.get(handle)
    }

    /// Direct children of `handle`, ordered by internal id
    pub fn children(&self, handle: &str) -> Vec<RepositoryObject> {
        let mut children: Vec<_> = self
            .objects
            .values()
            .filter(|object| object.parent.as_deref() == Some(handle))
            .cloned()
            .collect();
        children.sort_by_key(|object| object.id);
        children
    }

    pub fn find_principal(&self, email: &str) -> Option<&Principal> {
        self.principals
            .iter()
            .find(|principal| principal.email.eq_ignore_ascii_case(email))
    }

    /// Add a new object, minting an id and, unless one is requested, a handle
    pub fn insert(&mut self, object: NewObject) -> Result<RepositoryObject> {
        if let Some(handle) = &object.handle
            && self.objects.contains_key(handle)
        {
            return Err(PackagingError::collision(handle).into());
        }

        if let Some(parent) = &object.parent
            && !self.objects.contains_key(parent)
        {
            return Err(StoreError::unknown_object(parent).into());
        }

        let id = self.next_id;
        self.next_id += 1;

        let handle = match object.handle {
            Some(handle) => handle,
            None => self.mint_handle(id),
        };

        let created = RepositoryObject {
            id,
            handle: handle.clone(),
            kind: object.kind,
            name: object.name,
            parent: object.parent,
            in_workflow: object.in_workflow,
            metadata: object.metadata,
        };
        self.objects.insert(handle, created.clone());
        Ok(created)
    }

    /// Remove `handle` and every object beneath it, returning how many were removed
    pub fn remove(&mut self, handle: &str) -> Result<usize> {
        if !self.objects.contains_key(handle) {
            return Err(StoreError::unknown_object(handle).into());
        }

        let mut doomed = vec![handle.to_string()];
        let mut index = 0;
        while index < doomed.len() {
            let children = self.children(&doomed[index]);
            doomed.extend(children.into_iter().map(|child| child.handle));
            index += 1;
        }

        for handle in &doomed {
            self.objects.remove(handle);
        }
        Ok(doomed.len())
    }

    // A restore may already have taken `<prefix>/<id>`; skip forward until free
    fn mint_handle(&mut self, id: u64) -> String {
        let mut candidate = format!("{}/{}", self.handle_prefix, id);
        while self.objects.contains_key(&candidate) {
            let next = self.next_id;
            self.next_id += 1;
            candidate = format!("{}/{}", self.handle_prefix, next);
        }
        candidate
    }
}
