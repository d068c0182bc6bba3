//! Scripted packager plugins that record how they were called

use packager_core::error::PackagingError;
use packager_core::naming::{PACKAGE_EXTENSION, handle_from_package_name, package_file_name};
use packager_core::session::descendants;
use packager_core::{
    Error, NewObject, ObjectType, PackageDisseminator, PackageIngester, PackageLocation,
    PackageParameters, RepositoryObject, Result, Session,
};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// One recorded plugin invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCall {
    /// `ingest`, `ingest_all`, `replace`, `replace_all`, `disseminate` or `disseminate_all`
    pub operation: &'static str,
    /// Handle of the parent (ingest) or target (replace, disseminate) passed in
    pub object: Option<String>,
    pub package: PackageLocation,
    pub params: PackageParameters,
}

#[derive(Debug, Clone)]
enum Script {
    Succeed,
    Collide(String),
    Fail(String),
    Workflow(String),
    /// Create this many objects, then fail
    FailAfter(usize),
}

#[derive(Debug)]
struct ScriptState {
    script: Script,
    tree_size: usize,
    calls: Vec<PluginCall>,
}

impl Default for ScriptState {
    fn default() -> Self {
        Self {
            script: Script::Succeed,
            tree_size: 1,
            calls: Vec::new(),
        }
    }
}

impl ScriptState {
    fn record(
        &mut self,
        operation: &'static str,
        object: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) {
        self.calls.push(PluginCall {
            operation,
            object: object.map(|o| o.handle.clone()),
            package: package.clone(),
            params: params.clone(),
        });
    }

    fn scripted_error(&self) -> Option<Error> {
        match &self.script {
            Script::Succeed | Script::FailAfter(_) => None,
            Script::Collide(handle) => Some(PackagingError::collision(handle).into()),
            Script::Fail(reason) => Some(PackagingError::failed(reason.clone()).into()),
            Script::Workflow(reason) => Some(PackagingError::workflow(reason).into()),
        }
    }
}

fn child_kind(parent: Option<&RepositoryObject>) -> ObjectType {
    match parent.map(|p| p.kind) {
        Some(ObjectType::Collection) => ObjectType::Item,
        Some(ObjectType::Community) => ObjectType::Collection,
        Some(ObjectType::Site) | None => ObjectType::Community,
        Some(ObjectType::Item) => ObjectType::Item,
    }
}

fn package_name(package: &PackageLocation) -> String {
    package
        .path()
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "stdin".to_string())
}

/// Ingester that creates objects through the session it is given
///
/// With restore enabled the created object takes the handle encoded in the
/// package file name, so collisions come from the session itself.
#[derive(Clone, Default)]
pub struct MockIngester {
    state: Arc<Mutex<ScriptState>>,
}

impl MockIngester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with an identifier collision on `handle`
    pub fn expect_collision(self, handle: &str) -> Self {
        self.state.lock().unwrap().script = Script::Collide(handle.to_string());
        self
    }

    /// Every call fails with a generic packaging error
    pub fn expect_failure(self, reason: &str) -> Self {
        self.state.lock().unwrap().script = Script::Fail(reason.to_string());
        self
    }

    /// Every call fails with a workflow error
    pub fn expect_workflow_error(self, reason: &str) -> Self {
        self.state.lock().unwrap().script = Script::Workflow(reason.to_string());
        self
    }

    /// Whole-tree calls create `created` objects and then fail
    pub fn expect_failure_after(self, created: usize) -> Self {
        self.state.lock().unwrap().script = Script::FailAfter(created);
        self
    }

    /// Whole-tree calls create `size` objects: the top object and its children
    pub fn with_tree_size(self, size: usize) -> Self {
        self.state.lock().unwrap().tree_size = size.max(1);
        self
    }

    pub fn calls(&self) -> Vec<PluginCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn create(
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        let mut object = NewObject::new(child_kind(parent), &package_name(package))
            .in_workflow(params.workflow_enabled() && !params.restore_mode_enabled());
        if let Some(parent) = parent {
            object = object.with_parent(&parent.handle);
        }
        if params.restore_mode_enabled()
            && let Some(handle) = package.path().and_then(handle_from_package_name)
        {
            object = object.with_handle(&handle);
        }
        session.create_object(object)
    }

    fn create_tree(
        &self,
        session: &mut dyn Session,
        top: RepositoryObject,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<Vec<String>> {
        let (script, tree_size) = {
            let state = self.state.lock().unwrap();
            (state.script.clone(), state.tree_size)
        };

        let limit = match script {
            Script::FailAfter(count) => count,
            _ => tree_size,
        };

        let mut handles = vec![top.handle.clone()];
        while handles.len() < limit {
            let child = NewObject::new(child_kind(Some(&top)), &package_name(package))
                .with_parent(&top.handle)
                .in_workflow(params.workflow_enabled() && !params.restore_mode_enabled());
            handles.push(session.create_object(child)?.handle);
        }

        if let Script::FailAfter(count) = script {
            return Err(PackagingError::failed(format!("failed after {count} objects")).into());
        }
        Ok(handles)
    }

    fn replace_target(
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        package: &PackageLocation,
    ) -> Result<RepositoryObject> {
        if let Some(target) = target {
            return Ok(target.clone());
        }
        let handle = package
            .path()
            .and_then(handle_from_package_name)
            .ok_or_else(|| PackagingError::invalid_package(&package.to_string(), "no target"))?;
        session.resolve(&handle)?.ok_or_else(|| {
            PackagingError::invalid_package(&package.to_string(), "target does not exist").into()
        })
    }

    fn recreate(
        session: &mut dyn Session,
        existing: &RepositoryObject,
        package: &PackageLocation,
    ) -> Result<RepositoryObject> {
        session.remove_object(&existing.handle)?;
        let mut object =
            NewObject::new(existing.kind, &package_name(package)).with_handle(&existing.handle);
        if let Some(parent) = &existing.parent {
            object = object.with_parent(parent);
        }
        session.create_object(object)
    }
}

impl PackageIngester for MockIngester {
    fn ingest(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        let error = {
            let mut state = self.state.lock().unwrap();
            state.record("ingest", parent, package, params);
            state.scripted_error()
        };
        if let Some(error) = error {
            return Err(error);
        }
        Self::create(session, parent, package, params)
    }

    fn ingest_all(
        &self,
        session: &mut dyn Session,
        parent: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<Vec<String>> {
        let error = {
            let mut state = self.state.lock().unwrap();
            state.record("ingest_all", parent, package, params);
            state.scripted_error()
        };
        if let Some(error) = error {
            return Err(error);
        }
        let top = Self::create(session, parent, package, params)?;
        self.create_tree(session, top, package, params)
    }

    fn replace(
        &self,
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<RepositoryObject> {
        let error = {
            let mut state = self.state.lock().unwrap();
            state.record("replace", target, package, params);
            state.scripted_error()
        };
        if let Some(error) = error {
            return Err(error);
        }
        let existing = Self::replace_target(session, target, package)?;
        Self::recreate(session, &existing, package)
    }

    fn replace_all(
        &self,
        session: &mut dyn Session,
        target: Option<&RepositoryObject>,
        package: &PackageLocation,
        params: &PackageParameters,
    ) -> Result<Vec<String>> {
        let error = {
            let mut state = self.state.lock().unwrap();
            state.record("replace_all", target, package, params);
            state.scripted_error()
        };
        if let Some(error) = error {
            return Err(error);
        }
        let existing = Self::replace_target(session, target, package)?;
        let top = Self::recreate(session, &existing, package)?;
        self.create_tree(session, top, package, params)
    }

    fn parameter_help(&self) -> String {
        "Mock ingester options: none".to_string()
    }
}

/// Disseminator that writes a one-line placeholder package per object
#[derive(Clone, Default)]
pub struct MockDisseminator {
    state: Arc<Mutex<ScriptState>>,
}

impl MockDisseminator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with a generic packaging error
    pub fn expect_failure(self, reason: &str) -> Self {
        self.state.lock().unwrap().script = Script::Fail(reason.to_string());
        self
    }

    pub fn calls(&self) -> Vec<PluginCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn write(object: &RepositoryObject, destination: &PackageLocation) -> Result<()> {
        let contents = format!("mock package for {}\n", object.handle);
        match destination {
            PackageLocation::Stdio => print!("{contents}"),
            PackageLocation::File(path) => fs::write(path, contents)?,
        }
        Ok(())
    }
}

impl PackageDisseminator for MockDisseminator {
    fn disseminate(
        &self,
        _session: &dyn Session,
        target: &RepositoryObject,
        params: &PackageParameters,
        destination: &PackageLocation,
    ) -> Result<()> {
        let error = {
            let mut state = self.state.lock().unwrap();
            state.record("disseminate", Some(target), destination, params);
            state.scripted_error()
        };
        if let Some(error) = error {
            return Err(error);
        }
        Self::write(target, destination)
    }

    fn disseminate_all(
        &self,
        session: &dyn Session,
        target: &RepositoryObject,
        params: &PackageParameters,
        destination: &PackageLocation,
    ) -> Result<Vec<PathBuf>> {
        let error = {
            let mut state = self.state.lock().unwrap();
            state.record("disseminate_all", Some(target), destination, params);
            state.scripted_error()
        };
        if let Some(error) = error {
            return Err(error);
        }

        let Some(path) = destination.path() else {
            return Err(PackagingError::unsupported("MOCK", "standard output").into());
        };
        Self::write(target, destination)?;
        let mut written = vec![path.to_path_buf()];

        for object in descendants(session, target)? {
            let file = destination
                .base_dir()
                .join(package_file_name(&object, PACKAGE_EXTENSION));
            Self::write(&object, &PackageLocation::File(file.clone()))?;
            written.push(file);
        }
        Ok(written)
    }

    fn parameter_help(&self) -> String {
        "Mock disseminator options: none".to_string()
    }
}
