//! Repository object model as seen by the packager

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Type tag of a repository object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ObjectType {
    Site,
    Community,
    Collection,
    Item,
}

impl ObjectType {
    /// Upper-case label used in reports and package file names
    pub fn label(self) -> &'static str {
        match self {
            Self::Site => "SITE",
            Self::Community => "COMMUNITY",
            Self::Collection => "COLLECTION",
            Self::Item => "ITEM",
        }
    }

    /// Whether an object of this type may hold `child`
    pub fn can_contain(self, child: ObjectType) -> bool {
        matches!(
            (self, child),
            (Self::Site, Self::Community)
                | (Self::Community, Self::Community)
                | (Self::Community, Self::Collection)
                | (Self::Collection, Self::Item)
        )
    }

    /// Whether an object of this type may exist without a parent
    pub fn can_be_top_level(self) -> bool {
        matches!(self, Self::Site | Self::Community)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SITE" => Ok(Self::Site),
            "COMMUNITY" => Ok(Self::Community),
            "COLLECTION" => Ok(Self::Collection),
            "ITEM" => Ok(Self::Item),
            _ => Err(format!("Unknown object type: {s}")),
        }
    }
}

/// An object in the repository, referenced by its handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryObject {
    pub id: u64,
    pub handle: String,
    pub kind: ObjectType,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Submitted but still waiting in the review workflow
    #[serde(default)]
    pub in_workflow: bool,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RepositoryObject {
    /// One-line description used in reports, e.g. `ITEM [ hdl=123456/7, dbID=7 ]`
    pub fn describe(&self) -> String {
        format!("{} [ hdl={}, dbID={} ]", self.kind, self.handle, self.id)
    }
}

/// Everything needed to create an object; the store assigns the internal id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObject {
    pub kind: ObjectType,
    pub name: String,
    /// Requested handle; `None` lets the store mint one
    pub handle: Option<String>,
    pub parent: Option<String>,
    pub in_workflow: bool,
    pub metadata: BTreeMap<String, String>,
}

impl NewObject {
    pub fn new(kind: ObjectType, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            handle: None,
            parent: None,
            in_workflow: false,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_handle(mut self, handle: &str) -> Self {
        self.handle = Some(handle.to_string());
        self
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn in_workflow(mut self, in_workflow: bool) -> Self {
        self.in_workflow = in_workflow;
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// The actor on whose behalf a run is performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Principal {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            name: None,
        }
    }
}
