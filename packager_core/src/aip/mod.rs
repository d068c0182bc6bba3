//! JSON archival information packages
//!
//! Each package is a single JSON manifest describing one object. Containers
//! list their children's packages by relative path, so a whole tree travels as
//! a directory of sibling manifests.

mod manifest;

pub use manifest::{MANIFEST_FORMAT, Manifest};

use crate::error::{PackagingError, Result, StoreError};
use crate::location::PackageLocation;
use crate::model::{NewObject, ObjectType, RepositoryObject};
use crate::naming::{PACKAGE_EXTENSION, package_file_name};
use crate::params::{DEFAULT_SCOPE, PackageParameters};
use crate::plugin::{PackageDisseminator, PackageIngester};
use crate::session::{Session, descendants};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Name used in messages about this packager
pub const PACKAGE_TYPE: &str = "JSON-AIP";

/// Option controlling indentation of written manifests
pub const PRETTY_PROPERTY: &str = "pretty";

/// Built-in packager for JSON manifests, in both roles
#[derive(Debug, Default, Clone)]
pub struct JsonAipPackager;

impl JsonAipPackager {
    pub fn new() -> Self {
        Self
    }

    /// Create the object a manifest describes under `parent`
    ///
    /// Without an explicit parent the manifest's own `parent` is used.
    fn create(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        manifest: &Manifest,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        let package_name = package.to_string();

        let parent = match (parent, &manifest.parent) {
            (Some(parent), _) => Some(parent.clone()),
            (None, Some(handle)) => Some(session.resolve(handle)?.ok_or_else(|| {
                PackagingError::invalid_package(
                    &package_name,
                    &format!("parent {handle} does not exist"),
                )
            })?),
            (None, None) => None,
        };

        match &parent {
            Some(parent) if !parent.kind.can_contain(manifest.kind) => {
                return Err(PackagingError::invalid_package(
                    &package_name,
                    &format!("a {} cannot be placed in a {}", manifest.kind, parent.kind),
                )
                .into());
            }
            None if !manifest.kind.can_be_top_level() => {
                return Err(PackagingError::invalid_package(
                    &package_name,
                    &format!("a {} needs a parent", manifest.kind),
                )
                .into());
            }
            _ => {}
        }

        let restore = params.restore_mode_enabled();
        let in_workflow =
            manifest.kind == ObjectType::Item && params.workflow_enabled() && !restore;
        if in_workflow && session.current_user().is_none() {
            let reason = "a workflow submission needs a submitter";
            return Err(PackagingError::workflow(reason).into());
        }

        let mut object = NewObject::new(manifest.kind, &manifest.name)
            .in_workflow(in_workflow)
            .with_metadata(scoped_metadata(&manifest.metadata, params.scope()));
        if let Some(parent) = &parent {
            object = object.with_parent(&parent.handle);
        }
        if restore {
            let handle = manifest.handle.as_deref().ok_or_else(|| {
                PackagingError::invalid_package(&package_name, "restoring needs the package handle")
            })?;
            object = object.with_handle(handle);
        }

        session.create_object(object)
    }

    /// Create the object, or under keep-existing fall back to the object
    /// already holding the package's handle
    ///
    /// The flag is true when the object was created by this call.
    fn create_or_keep(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        manifest: &Manifest,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<(RepositoryObject, bool)> {
        match self.create(session, parent, manifest, package, params) {
            Ok(object) => Ok((object, true)),
            Err(e) if e.is_collision() && params.keep_existing_mode_enabled() => {
                let handle = manifest.handle.as_deref().unwrap_or_default();
                log::info!("Keeping existing object {handle} for package {package}");
                let existing = session
                    .resolve(handle)?
                    .ok_or_else(|| StoreError::unknown_object(handle))?;
                Ok((existing, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Ingest every child package of `manifest` beneath `parent`, depth-first
    fn create_children(
        &self,
        session: &mut dyn Session,
        parent: &RepositoryObject,
        manifest: &Manifest,
        package: &PackageLocation,
        params: &PackageParameters,
        created: &mut Vec<String>,
    ) -> Result<()> {
        let base = package.base_dir();

        for reference in &manifest.children {
            let location = PackageLocation::File(base.join(reference));
            let child_manifest = Manifest::read(&location)?;

            let (child, is_new) =
                self.create_or_keep(session, Some(parent), &child_manifest, &location, params)?;
            if is_new {
                created.push(child.handle.clone());
            }

            self.create_children(session, &child, &child_manifest, &location, params, created)?;
        }

        Ok(())
    }

    /// Object a replace applies to: the explicit target, else the package's handle
    ///
    /// `None` means the package's handle is not in use, so there is nothing
    /// to overwrite.
    fn replace_target(
        &self,
        session: &dyn Session,
        target: Option<&RepositoryObject>,
        manifest: &Manifest,
        package: &PackageLocation,
    ) -> Result<Option<RepositoryObject>> {
        if let Some(target) = target {
            return Ok(Some(target.clone()));
        }

        let handle = manifest.handle.as_deref().ok_or_else(|| {
            PackagingError::invalid_package(
                &package.to_string(),
                "no handle names the object to replace",
            )
        })?;
        session.resolve(handle)
    }

    /// Replace the target, or restore the package when its object is missing
    fn replace_or_restore(
        &self,
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        manifest: &Manifest,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        match self.replace_target(session, target, manifest, package)? {
            Some(existing) => self.replace_object(session, &existing, manifest, package, params),
            None => {
                log::info!("Nothing to replace for package {package}, restoring it instead");
                let restore = params.clone().with_restore_mode(true);
                self.create(session, None, manifest, package, &restore)
            }
        }
    }

    fn replace_object(
        &self,
        session: &mut dyn Session,
        existing: &RepositoryObject,
        manifest: &Manifest,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        if existing.kind != manifest.kind {
            return Err(PackagingError::invalid_package(
                &package.to_string(),
                &format!("holds a {}, cannot replace a {}", manifest.kind, existing.kind),
            )
            .into());
        }

        log::debug!("Replacing {}", existing.describe());
        session.remove_object(&existing.handle)?;

        let mut object = NewObject::new(manifest.kind, &manifest.name)
            .with_handle(&existing.handle)
            .with_metadata(scoped_metadata(&manifest.metadata, params.scope()));
        if let Some(parent) = &existing.parent {
            object = object.with_parent(parent);
        }
        session.create_object(object)
    }

    fn manifest_for(
        &self,
        session: &dyn Session,
        object: &RepositoryObject,
        scope: &str,
    ) -> Result<Manifest> {
        let mut manifest = Manifest::describing(object);
        manifest.metadata = scoped_metadata(&object.metadata, scope);
        manifest.children = session
            .children(object)?
            .iter()
            .map(|child| package_file_name(child, PACKAGE_EXTENSION))
            .collect();
        Ok(manifest)
    }
}

impl PackageIngester for JsonAipPackager {
    fn ingest(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        let manifest = Manifest::read(package)?;
        self.create(session, parent, &manifest, package, params)
    }

    fn ingest_all(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<Vec<String>> {
        let manifest = Manifest::read(package)?;
        let (top, is_new) = self.create_or_keep(session, parent, &manifest, package, params)?;

        let mut created = Vec::new();
        if is_new {
            created.push(top.handle.clone());
        }
        self.create_children(session, &top, &manifest, package, params, &mut created)?;
        Ok(created)
    }

    fn replace(
        &self,
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        let manifest = Manifest::read(package)?;
        self.replace_or_restore(session, target, &manifest, package, params)
    }

    fn replace_all(
        &self,
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<Vec<String>> {
        let manifest = Manifest::read(package)?;
        let top = self.replace_or_restore(session, target, &manifest, package, params)?;

        let restore = params.clone().with_restore_mode(true);
        let mut replaced = vec![top.handle.clone()];
        self.create_children(session, &top, &manifest, package, &restore, &mut replaced)?;
        Ok(replaced)
    }

    fn parameter_help(&self) -> String {
        [
            "JSON-AIP ingest options:",
            "  scope=<prefix>   only keep metadata fields starting with <prefix> (default: * for all)",
            "Restore and replace runs require packages that carry a handle.",
            "Replacing an object that does not exist restores it from the package.",
            "Replacing an object removes everything beneath it; use -a to restore its children too.",
        ]
        .join("\n")
    }
}

impl PackageDisseminator for JsonAipPackager {
    fn disseminate(
        &self,
        session: &dyn Session,
        target: &RepositoryObject,
        params: &PackageParameters,
        destination: &PackageLocation,
    ) -> Result<()> {
        let manifest = self.manifest_for(session, target, params.scope())?;
        manifest.write(destination, params.bool_property(PRETTY_PROPERTY, true))
    }

    fn disseminate_all(
        &self,
        session: &dyn Session,
        target: &RepositoryObject,
        params: &PackageParameters,
        destination: &PackageLocation,
    ) -> Result<Vec<PathBuf>> {
        let Some(path) = destination.path() else {
            return Err(PackagingError::unsupported(
                PACKAGE_TYPE,
                "recursive dissemination to standard output",
            )
            .into());
        };

        self.disseminate(session, target, params, destination)?;
        let mut written = vec![path.to_path_buf()];

        let dir = destination.base_dir();
        for object in descendants(session, target)? {
            let file = dir.join(package_file_name(&object, PACKAGE_EXTENSION));
            self.disseminate(session, &object, params, &PackageLocation::File(file.clone()))?;
            written.push(file);
        }

        Ok(written)
    }

    fn parameter_help(&self) -> String {
        [
            "JSON-AIP dissemination options:",
            "  scope=<prefix>   only write metadata fields starting with <prefix> (default: * for all)",
            "  pretty=<bool>    indent written manifests (default: true)",
            "Child packages are written beside the destination as <TYPE>@<handle>.json.",
        ]
        .join("\n")
    }
}

fn scoped_metadata(metadata: &BTreeMap<String, String>, scope: &str) -> BTreeMap<String, String> {
    if scope == DEFAULT_SCOPE {
        return metadata.clone();
    }
    metadata
        .iter()
        .filter(|(field, _)| field.starts_with(scope))
        .map(|(field, value)| (field.clone(), value.clone()))
        .collect()
}
