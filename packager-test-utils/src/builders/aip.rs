//! On-disk JSON-AIP package trees

use serde_json::{Map, Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for a single JSON-AIP manifest
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    kind: String,
    name: String,
    handle: Option<String>,
    parent: Option<String>,
    metadata: Map<String, Value>,
    children: Vec<String>,
}

impl ManifestBuilder {
    pub fn new(kind: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            name: name.to_string(),
            handle: None,
            parent: None,
            metadata: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn handle(mut self, handle: &str) -> Self {
        self.handle = Some(handle.to_string());
        self
    }

    pub fn parent(mut self, handle: &str) -> Self {
        self.parent = Some(handle.to_string());
        self
    }

    pub fn metadata(mut self, field: &str, value: &str) -> Self {
        self.metadata
            .insert(field.to_string(), Value::String(value.to_string()));
        self
    }

    /// Reference a child package by path relative to this one
    pub fn child(mut self, reference: &str) -> Self {
        self.children.push(reference.to_string());
        self
    }

    pub fn to_json(&self) -> Value {
        let mut manifest = json!({
            "format": "json-aip/1",
            "type": self.kind,
            "name": self.name,
            "metadata": self.metadata,
            "children": self.children,
        });
        if let Some(handle) = &self.handle {
            manifest["handle"] = json!(handle);
        }
        if let Some(parent) = &self.parent {
            manifest["parent"] = json!(parent);
        }
        manifest
    }
}

/// A temporary directory of package files
pub struct AipTree {
    dir: TempDir,
}

impl AipTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Tree of three restorable packages:
    /// `COMMUNITY@10673-1` holding `COLLECTION@10673-2` holding `ITEM@10673-3`
    pub fn sample() -> Self {
        let tree = Self::new();
        tree.write(
            "COMMUNITY@10673-1.json",
            &ManifestBuilder::new("COMMUNITY", "Research")
                .handle("10673/1")
                .metadata("dc.title", "Research")
                .child("COLLECTION@10673-2.json"),
        );
        tree.write(
            "COLLECTION@10673-2.json",
            &ManifestBuilder::new("COLLECTION", "Theses")
                .handle("10673/2")
                .parent("10673/1")
                .child("ITEM@10673-3.json"),
        );
        tree.write(
            "ITEM@10673-3.json",
            &ManifestBuilder::new("ITEM", "A thesis")
                .handle("10673/3")
                .parent("10673/2")
                .metadata("dc.title", "A thesis")
                .metadata("local.note", "internal"),
        );
        tree
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the tree, whether or not it exists
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Top package of [`AipTree::sample`]
    pub fn root(&self) -> PathBuf {
        self.file("COMMUNITY@10673-1.json")
    }

    pub fn write(&self, name: &str, manifest: &ManifestBuilder) -> PathBuf {
        self.write_raw(name, &serde_json::to_string_pretty(&manifest.to_json()).unwrap())
    }

    pub fn write_raw(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

impl Default for AipTree {
    fn default() -> Self {
        Self::new()
    }
}
