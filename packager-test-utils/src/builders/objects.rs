//! Builders for repository objects

use packager_core::{ObjectType, RepositoryObject};
use std::collections::BTreeMap;

/// Builder for [`RepositoryObject`] fixtures
///
/// The internal id defaults to the numeric suffix of the handle.
pub struct ObjectBuilder {
    kind: ObjectType,
    handle: String,
    id: Option<u64>,
    name: Option<String>,
    parent: Option<String>,
    in_workflow: bool,
    metadata: BTreeMap<String, String>,
}

impl ObjectBuilder {
    pub fn new(kind: ObjectType, handle: &str) -> Self {
        Self {
            kind,
            handle: handle.to_string(),
            id: None,
            name: None,
            parent: None,
            in_workflow: false,
            metadata: BTreeMap::new(),
        }
    }

    pub fn community(handle: &str) -> Self {
        Self::new(ObjectType::Community, handle)
    }

    pub fn collection(handle: &str) -> Self {
        Self::new(ObjectType::Collection, handle)
    }

    pub fn item(handle: &str) -> Self {
        Self::new(ObjectType::Item, handle)
    }

    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn parent(mut self, handle: &str) -> Self {
        self.parent = Some(handle.to_string());
        self
    }

    pub fn in_workflow(mut self) -> Self {
        self.in_workflow = true;
        self
    }

    pub fn metadata(mut self, field: &str, value: &str) -> Self {
        self.metadata.insert(field.to_string(), value.to_string());
        self
    }

    pub fn build(self) -> RepositoryObject {
        let id = self.id.unwrap_or_else(|| {
            self.handle
                .rsplit('/')
                .next()
                .and_then(|suffix| suffix.parse().ok())
                .unwrap_or(1)
        });

        RepositoryObject {
            id,
            name: self
                .name
                .unwrap_or_else(|| format!("Test {}", self.kind.label().to_lowercase())),
            handle: self.handle,
            kind: self.kind,
            parent: self.parent,
            in_workflow: self.in_workflow,
            metadata: self.metadata,
        }
    }
}
