//! JSON-AIP manifest format

use crate::error::{IoError, PackagingError, Result};
use crate::location::PackageLocation;
use crate::model::{ObjectType, RepositoryObject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{Read, Write};

/// Format tag every manifest carries
pub const MANIFEST_FORMAT: &str = "json-aip/1";

/// One package: a single object plus references to its children's packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub format: String,
    #[serde(rename = "type")]
    pub kind: ObjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Child package paths, relative to this package's directory
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl Manifest {
    pub fn new(kind: ObjectType, name: &str) -> Self {
        Self {
            format: MANIFEST_FORMAT.to_string(),
            kind,
            handle: None,
            name: name.to_string(),
            parent: None,
            metadata: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Manifest describing an existing object; children are filled in by the caller
    pub fn describing(object: &RepositoryObject) -> Self {
        Self {
            format: MANIFEST_FORMAT.to_string(),
            kind: object.kind,
            handle: Some(object.handle.clone()),
            name: object.name.clone(),
            parent: object.parent.clone(),
            metadata: object.metadata.clone(),
            children: Vec::new(),
        }
    }

    /// Read and validate the manifest at `location`
    pub fn read(location: &PackageLocation) -> Result<Self> {
        let contents = match location {
            PackageLocation::Stdio => {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .map_err(IoError::from_std)?;
                buffer
            }
            PackageLocation::File(path) => {
                if !path.exists() {
                    return Err(PackagingError::package_not_found(path).into());
                }
                fs::read_to_string(path).map_err(|e| IoError::at(path, e))?
            }
        };

        Self::parse(&contents, &location.to_string())
    }

    /// Parse manifest text; `package` names the source in error messages
    pub fn parse(contents: &str, package: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(contents)
            .map_err(|e| PackagingError::invalid_package(package, &e.to_string()))?;

        if manifest.format != MANIFEST_FORMAT {
            return Err(PackagingError::invalid_package(
                package,
                &format!("unsupported format '{}'", manifest.format),
            )
            .into());
        }
        if manifest.name.trim().is_empty() {
            return Err(PackagingError::invalid_package(package, "name must not be empty").into());
        }

        Ok(manifest)
    }

    /// Write the manifest to `location`, creating parent directories as needed
    pub fn write(&self, location: &PackageLocation, pretty: bool) -> Result<()> {
        let mut rendered = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        rendered.push('\n');

        match location {
            PackageLocation::Stdio => {
                let mut stdout = std::io::stdout().lock();
                stdout
                    .write_all(rendered.as_bytes())
                    .and_then(|()| stdout.flush())
                    .map_err(IoError::from_std)?;
            }
            PackageLocation::File(path) => {
                if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(dir).map_err(|e| IoError::at(dir, e))?;
                }
                fs::write(path, rendered).map_err(|e| IoError::at(path, e))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = Manifest::parse(
            r#"{"format":"json-aip/1","type":"COMMUNITY","name":"Research"}"#,
            "root.json",
        )
        .unwrap();

        assert_eq!(manifest.kind, ObjectType::Community);
        assert_eq!(manifest.handle, None);
        assert!(manifest.children.is_empty());
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        let error = Manifest::parse(
            r#"{"format":"mets","type":"ITEM","name":"Thesis"}"#,
            "thesis.json",
        )
        .unwrap_err();

        assert!(error.to_string().contains("thesis.json"));
        assert!(error.to_string().contains("unsupported format"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let error = Manifest::parse("not json", "broken.json").unwrap_err();
        assert!(matches!(
            error,
            crate::Error::Packaging(PackagingError::InvalidPackage { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_blank_name() {
        assert!(
            Manifest::parse(
                r#"{"format":"json-aip/1","type":"ITEM","name":"  "}"#,
                "blank.json"
            )
            .is_err()
        );
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let location = PackageLocation::File(temp_dir.path().join("missing.json"));

        let error = Manifest::read(&location).unwrap_err();
        assert!(error.to_string().contains("does not exist"));
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let location = PackageLocation::File(temp_dir.path().join("out").join("ITEM@1-2.json"));

        let mut manifest = Manifest::new(ObjectType::Item, "Thesis");
        manifest.handle = Some("1/2".to_string());
        manifest
            .metadata
            .insert("dc.title".to_string(), "Thesis".to_string());

        manifest.write(&location, false).unwrap();
        assert_eq!(Manifest::read(&location).unwrap(), manifest);
    }
}
