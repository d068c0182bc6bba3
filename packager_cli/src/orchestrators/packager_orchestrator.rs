//! Packager orchestrator
//!
//! Turns one [`PackagerRequest`] into plugin calls inside a single session.
//! Preconditions are checked before the session is opened where possible;
//! after that the run either commits once or aborts once.

use crate::output::Reporter;
use crate::progress::TreeSpinner;
use crate::prompt::{NonInteractivePrompt, Prompt, TerminalPrompt};
use log::{debug, info, warn};
use packager_core::error::{PackagingError, UsageError};
use packager_core::location::{STDIO_ARGUMENT, canonical_display};
use packager_core::naming::handle_from_package_name;
use packager_core::params::SCOPE_PROPERTY;
use packager_core::session::descendants;
use packager_core::{
    Error, IdentityResolver, ModeFlags, OperatingMode, PackageDisseminator, PackageIngester,
    PackageLocation, PackageParameters, PluginRegistry, PrincipalDirectory, RepositoryObject,
    Result, Session, SessionProvider, expand_sources,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything one invocation asks for, already parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerRequest {
    pub package_type: Option<String>,
    pub eperson: Option<String>,
    /// Sources for ingest and replace, destinations for dissemination
    pub packages: Vec<String>,
    /// Parent handles; the first one owns new objects
    pub parents: Vec<String>,
    pub identifier: Option<String>,
    pub flags: ModeFlags,
    pub keep_existing: bool,
    pub workflow: bool,
    pub recursive: bool,
    pub options: Vec<(String, String)>,
    pub scope: Option<String>,
    pub no_user_interaction: bool,
    pub dry_run: bool,
    pub help: bool,
}

impl Default for PackagerRequest {
    fn default() -> Self {
        Self {
            package_type: None,
            eperson: None,
            packages: Vec::new(),
            parents: Vec::new(),
            identifier: None,
            flags: ModeFlags::default(),
            keep_existing: false,
            workflow: true,
            recursive: false,
            options: Vec::new(),
            scope: None,
            no_user_interaction: false,
            dry_run: false,
            help: false,
        }
    }
}

impl PackagerRequest {
    pub fn mode(&self) -> OperatingMode {
        OperatingMode::derive(self.flags)
    }

    /// Parameters handed to every plugin call of the run
    pub fn to_params(&self) -> PackageParameters {
        // replace implies restore
        let restore = self.flags.restore || self.flags.replace;

        let mut params = PackageParameters::new()
            .with_workflow(self.workflow)
            .with_restore_mode(restore)
            .with_keep_existing_mode(self.keep_existing)
            .with_replace_mode(self.flags.replace)
            .with_recursive_mode(self.recursive);

        for (name, value) in &self.options {
            params.add_property(name, value);
        }
        if let Some(scope) = &self.scope {
            params.set_property(SCOPE_PROPERTY, scope);
        }

        params
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Usage was printed; no session was opened
    Help,
    /// Plugins ran and the session was committed
    Completed,
    /// Work was listed but nothing changed
    DryRun,
    /// The operator declined to replace anything
    Declined,
}

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub mode: Option<OperatingMode>,
    /// Handles of the objects created, restored or replaced
    pub objects: Vec<String>,
    /// Package files written
    pub files: Vec<PathBuf>,
    /// Packages skipped because their object already existed
    pub skipped: Vec<PackageLocation>,
}

impl RunSummary {
    fn new(outcome: RunOutcome, mode: Option<OperatingMode>) -> Self {
        Self {
            outcome,
            mode,
            objects: Vec::new(),
            files: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

enum Plugin {
    Ingester(Arc<dyn PackageIngester>),
    Disseminator(Arc<dyn PackageDisseminator>),
}

/// Drives packager plugins for one request
pub struct PackagerOrchestrator<'a> {
    provider: &'a dyn SessionProvider,
    registry: &'a PluginRegistry,
    prompt: Box<dyn Prompt>,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    usage: String,
    use_color: bool,
    show_progress: bool,
    no_user_interaction: bool,
}

impl<'a> PackagerOrchestrator<'a> {
    pub fn new(provider: &'a dyn SessionProvider, registry: &'a PluginRegistry) -> Self {
        Self {
            provider,
            registry,
            prompt: Box::new(TerminalPrompt::new()),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
            usage: String::new(),
            use_color: false,
            show_progress: false,
            no_user_interaction: false,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Prompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Redirect report output and the stream used when packages go to stdout
    pub fn with_output(
        mut self,
        stdout: impl Write + 'static,
        stderr: impl Write + 'static,
    ) -> Self {
        self.stdout = Box::new(stdout);
        self.stderr = Box::new(stderr);
        self
    }

    /// Usage text printed on the help path
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn with_color(mut self, enabled: bool) -> Self {
        self.use_color = enabled;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Never prompt, whatever the request says
    pub fn with_no_user_interaction(mut self, disabled: bool) -> Self {
        self.no_user_interaction = disabled;
        self
    }

    /// Run one request
    ///
    /// Usage errors found before the session is opened leave the repository
    /// untouched. Once a session is open, any error aborts it and is returned;
    /// success commits it exactly once.
    pub fn run(&mut self, request: &PackagerRequest) -> Result<RunSummary> {
        let mode = request.mode();

        // keep a package streamed to stdout free of report lines
        let reports_to_stderr = mode == OperatingMode::Disseminate
            && request.packages.iter().any(|p| p == STDIO_ARGUMENT);
        let out: &mut dyn Write = if reports_to_stderr {
            self.stderr.as_mut()
        } else {
            self.stdout.as_mut()
        };
        let mut reporter = Reporter::new(out, self.use_color);

        if request.help {
            print_help(
                &mut reporter,
                self.registry,
                &self.usage,
                request.package_type.as_deref(),
            )?;
            reporter.flush()?;
            return Ok(RunSummary::new(RunOutcome::Help, None));
        }

        if request.packages.is_empty() {
            return Err(UsageError::missing_argument("PACKAGE").into());
        }
        let eperson = request
            .eperson
            .as_deref()
            .ok_or_else(|| UsageError::missing_argument("-e <email>"))?;
        let package_type = request
            .package_type
            .as_deref()
            .ok_or_else(|| UsageError::missing_argument("-t <type>"))?;

        let plugin = match mode {
            OperatingMode::Disseminate => {
                self.registry.disseminator(package_type).map(Plugin::Disseminator)
            }
            _ => self.registry.ingester(package_type).map(Plugin::Ingester),
        }
        .ok_or_else(|| UsageError::unknown_package_type(package_type, mode.plugin_role()))?;

        if request.keep_existing && request.flags.replace {
            warn!("Both keep-existing and replace were requested; existing objects will be replaced");
        } else if request.keep_existing && !request.flags.restore {
            debug!("Ignoring keep-existing outside of restore mode");
        }

        let interactive = !(request.no_user_interaction || self.no_user_interaction);
        debug!("Starting {mode} run with {package_type} (interactive: {interactive})");

        let mut session = self.provider.open()?;
        let mut run = Run {
            request,
            mode,
            eperson,
            params: request.to_params(),
            reporter,
            prompt: self.prompt.as_mut(),
            interactive,
            show_progress: self.show_progress,
        };

        let result = run.execute(session.as_mut(), &plugin);
        let flushed = run.reporter.flush();

        match result {
            Ok(summary) if summary.outcome == RunOutcome::Completed => {
                if let Err(error) = session.commit() {
                    warn!("Commit failed, discarding changes: {error}");
                    session.abort();
                    return Err(error);
                }
                info!(
                    "Committed {mode} run: {} objects, {} package files",
                    summary.objects.len(),
                    summary.files.len()
                );
                flushed?;
                Ok(summary)
            }
            Ok(summary) => {
                debug!("Discarding session after {:?}", summary.outcome);
                session.abort();
                flushed?;
                Ok(summary)
            }
            Err(error) => {
                debug!("Aborting session: {error}");
                session.abort();
                Err(error)
            }
        }
    }
}

fn print_help(
    reporter: &mut Reporter<'_>,
    registry: &PluginRegistry,
    usage: &str,
    package_type: Option<&str>,
) -> Result<()> {
    if !usage.is_empty() {
        reporter.text(usage)?;
    }

    let Some(package_type) = package_type else {
        reporter.blank()?;
        reporter.line(&format!(
            "Registered ingest package types: {}",
            registry.ingester_names().join(", ")
        ))?;
        return reporter.line(&format!(
            "Registered dissemination package types: {}",
            registry.disseminator_names().join(", ")
        ));
    };

    reporter.blank()?;
    match registry.ingester(package_type) {
        Some(ingester) => {
            reporter.line(&format!("{package_type} ingest plugin options:"))?;
            reporter.text(&ingester.parameter_help())?;
        }
        None => reporter.line(&format!(
            "No valid ingest plugin found for {package_type} type."
        ))?,
    }

    reporter.blank()?;
    match registry.disseminator(package_type) {
        Some(disseminator) => {
            reporter.line(&format!("{package_type} dissemination plugin options:"))?;
            reporter.text(&disseminator.parameter_help())
        }
        None => reporter.line(&format!(
            "No valid dissemination plugin found for {package_type} type."
        )),
    }
}

/// State of one run while its session is open
struct Run<'r, 'w> {
    request: &'r PackagerRequest,
    mode: OperatingMode,
    eperson: &'r str,
    params: PackageParameters,
    reporter: Reporter<'w>,
    prompt: &'r mut dyn Prompt,
    interactive: bool,
    show_progress: bool,
}

impl Run<'_, '_> {
    fn execute(&mut self, session: &mut dyn Session, plugin: &Plugin) -> Result<RunSummary> {
        session.set_mode(self.mode.session_mode());

        let principal = session
            .find_principal(self.eperson)?
            .ok_or_else(|| UsageError::unknown_principal(self.eperson))?;
        debug!("Acting as {}", principal.email);
        session.set_current_user(principal);

        let parents = self
            .request
            .parents
            .iter()
            .map(|handle| {
                session
                    .resolve(handle)?
                    .ok_or_else(|| Error::from(UsageError::unresolved_parent(handle)))
            })
            .collect::<Result<Vec<_>>>()?;

        // only replace and disseminate runs have a target object
        let identifier = match self.request.identifier.as_deref() {
            Some(handle)
                if matches!(self.mode, OperatingMode::Replace | OperatingMode::Disseminate) =>
            {
                Some(resolve_identifier(session, handle)?)
            }
            Some(handle) => {
                debug!("Ignoring -i {handle} in {} mode", self.mode);
                None
            }
            None => None,
        };

        match plugin {
            Plugin::Disseminator(disseminator) => {
                let target =
                    identifier.ok_or_else(|| UsageError::missing_argument("-i <handle>"))?;
                self.disseminate(session, disseminator.as_ref(), &target)
            }
            Plugin::Ingester(ingester) => {
                let sources = expand_sources(&self.request.packages)?;
                for source in &sources {
                    if let Some(path) = source.path()
                        && !path.exists()
                    {
                        return Err(PackagingError::package_not_found(path).into());
                    }
                }

                if self.mode == OperatingMode::Replace {
                    self.replace(session, ingester.as_ref(), identifier.as_ref(), &sources)
                } else {
                    self.ingest(session, ingester.as_ref(), &parents, &sources)
                }
            }
        }
    }

    fn ask(&mut self, question: &str) -> Result<bool> {
        if self.interactive {
            self.prompt.confirm(question)
        } else {
            NonInteractivePrompt.confirm(question)
        }
    }

    fn spinner(&self, message: &str) -> TreeSpinner {
        TreeSpinner::start(self.show_progress, message)
    }

    fn ingest(
        &mut self,
        session: &mut dyn Session,
        ingester: &dyn PackageIngester,
        parents: &[RepositoryObject],
        sources: &[PackageLocation],
    ) -> Result<RunSummary> {
        if !parents.is_empty() {
            self.reporter.destination_parents(parents)?;
        }
        // the plugin works out the parent itself when there is no owner
        let owner = parents.first();
        let restored = self.params.restore_mode_enabled();

        if self.request.dry_run {
            let verb = if restored { "restored" } else { "ingested" };
            return self.dry_run_packages(session, sources, verb);
        }

        let mut summary = RunSummary::new(RunOutcome::Completed, Some(self.mode));
        for source in sources {
            self.reporter.ingesting(source)?;

            if self.params.recursive_mode_enabled() {
                let spinner = self.spinner("Ingesting all referenced packages");
                let result = ingester.ingest_all(session, owner, source, &self.params);
                spinner.finish();

                let handles = match result {
                    Ok(handles) => handles,
                    Err(error) if self.skips(&error) => {
                        self.skip(&mut summary, source)?;
                        continue;
                    }
                    Err(error) => return Err(error),
                };

                self.reporter.created_total(handles.len())?;
                if self.ask("Would you like to view a list of all objects that were created?")? {
                    for object in resolve_all(&*session, &handles)? {
                        self.reporter.ingested(&object, restored)?;
                    }
                }
                summary.objects.extend(handles);
            } else {
                match ingester.ingest(session, owner, source, &self.params) {
                    Ok(object) => {
                        self.reporter.ingested(&object, restored)?;
                        summary.objects.push(object.handle);
                    }
                    Err(error) if self.skips(&error) => self.skip(&mut summary, source)?,
                    Err(error) => return Err(error),
                }
            }
        }

        Ok(summary)
    }

    /// Collisions are skipped only in keep-existing restores
    fn skips(&self, error: &Error) -> bool {
        error.is_collision() && self.params.keep_existing_mode_enabled()
    }

    fn skip(&mut self, summary: &mut RunSummary, source: &PackageLocation) -> Result<()> {
        info!("Skipping {source}: its object already exists");
        self.reporter.skipped(source)?;
        summary.skipped.push(source.clone());
        Ok(())
    }

    fn replace(
        &mut self,
        session: &mut dyn Session,
        ingester: &dyn PackageIngester,
        identifier: Option<&RepositoryObject>,
        sources: &[PackageLocation],
    ) -> Result<RunSummary> {
        if self.request.dry_run {
            return self.dry_run_packages(session, sources, "replaced");
        }

        if self.interactive {
            self.reporter.blank()?;
            self.reporter
                .line("WARNING -- You are running the packager in REPLACE mode.")?;
            self.reporter.line(
                "REPLACE mode removes and recreates existing objects and everything beneath them.",
            )?;
            self.reporter
                .line("Back up the repository before continuing.")?;
            self.reporter.flush()?;
        }
        if !self.ask("Would you like to continue?")? {
            self.reporter
                .line("Replacement cancelled. No changes were made.")?;
            return Ok(RunSummary::new(RunOutcome::Declined, Some(self.mode)));
        }
        self.reporter.line("Beginning replacement process...")?;

        let mut summary = RunSummary::new(RunOutcome::Completed, Some(self.mode));
        for source in sources {
            self.reporter.replacing(source)?;
            let target = self.replace_target(session, identifier, source)?;
            if let Some(target) = &target {
                self.reporter.will_replace(target)?;
            }

            if self.params.recursive_mode_enabled() {
                let spinner = self.spinner("Replacing all referenced packages");
                let result =
                    ingester.replace_all(session, target.as_ref(), source, &self.params);
                spinner.finish();
                let handles = result.map_err(Error::into_generic)?;

                self.reporter.replaced_total(handles.len())?;
                if self.ask("Would you like to view a list of all objects that were replaced?")? {
                    for object in resolve_all(&*session, &handles)? {
                        self.reporter.replaced(&object)?;
                    }
                }
                summary.objects.extend(handles);
            } else {
                let object = ingester
                    .replace(session, target.as_ref(), source, &self.params)
                    .map_err(Error::into_generic)?;
                self.reporter.replaced(&object)?;
                summary.objects.push(object.handle);
            }
        }

        Ok(summary)
    }

    /// Object a package should replace
    ///
    /// A package file named after an object names its target. Without `-i` an
    /// unknown name-derived handle is left to the plugin; with `-i` on a single
    /// replace a differing name wins and must resolve.
    fn replace_target(
        &self,
        session: &dyn Session,
        identifier: Option<&RepositoryObject>,
        source: &PackageLocation,
    ) -> Result<Option<RepositoryObject>> {
        let named = source.path().and_then(handle_from_package_name);

        match (identifier, named) {
            (None, Some(handle)) => {
                let target = session.resolve(&handle)?;
                if target.is_none() {
                    debug!("{source} names {handle}, which does not exist yet");
                }
                Ok(target)
            }
            (Some(explicit), Some(handle))
                if handle != explicit.handle && !self.params.recursive_mode_enabled() =>
            {
                resolve_identifier(session, &handle).map(Some)
            }
            (explicit, _) => Ok(explicit.cloned()),
        }
    }

    fn disseminate(
        &mut self,
        session: &mut dyn Session,
        disseminator: &dyn PackageDisseminator,
        target: &RepositoryObject,
    ) -> Result<RunSummary> {
        let destinations: Vec<_> = self
            .request
            .packages
            .iter()
            .map(|argument| PackageLocation::from_argument(argument))
            .collect();

        if self.request.dry_run {
            self.reporter.line("Objects that would be disseminated:")?;
            self.reporter.dry_run_item(&target.describe())?;
            if self.params.recursive_mode_enabled() {
                for object in descendants(&*session, target)? {
                    self.reporter.dry_run_item(&object.describe())?;
                }
            }
            for destination in &destinations {
                self.reporter
                    .line(&format!("Destination: {}", destination.display_path()))?;
            }
            self.reporter.dry_run_done()?;
            return Ok(RunSummary::new(RunOutcome::DryRun, Some(self.mode)));
        }

        let mut summary = RunSummary::new(RunOutcome::Completed, Some(self.mode));
        for destination in &destinations {
            if self.params.recursive_mode_enabled() {
                let spinner = self.spinner("Disseminating all descendants");
                let result =
                    disseminator.disseminate_all(&*session, target, &self.params, destination);
                spinner.finish();
                let files = result?;

                self.reporter.package_total(files.len())?;
                if self.ask("Would you like to view a list of all files that were created?")? {
                    for file in &files {
                        self.reporter.package_file(&canonical_display(file))?;
                    }
                }
                summary.files.extend(files);
            } else {
                disseminator.disseminate(&*session, target, &self.params, destination)?;
                if destination.has_data() {
                    self.reporter.package_file(&destination.display_path())?;
                }
                if let Some(path) = destination.path() {
                    summary.files.push(path.to_path_buf());
                }
            }
        }

        Ok(summary)
    }

    fn dry_run_packages(
        &mut self,
        session: &dyn Session,
        sources: &[PackageLocation],
        verb: &str,
    ) -> Result<RunSummary> {
        self.reporter
            .line(&format!("Packages that would be {verb}:"))?;
        for source in sources {
            let named = source.path().and_then(handle_from_package_name);
            let line = match named {
                Some(handle) if session.resolve(&handle)?.is_some() => {
                    format!("{} (existing object {handle})", source.display_path())
                }
                _ => source.display_path(),
            };
            self.reporter.dry_run_item(&line)?;
        }
        self.reporter.dry_run_done()?;
        Ok(RunSummary::new(RunOutcome::DryRun, Some(self.mode)))
    }
}

fn resolve_identifier(resolver: &dyn IdentityResolver, handle: &str) -> Result<RepositoryObject> {
    resolver
        .resolve(handle)?
        .ok_or_else(|| Error::from(UsageError::unresolved_identifier(handle)))
}

/// Resolve reported handles, skipping any that no longer resolve
fn resolve_all(resolver: &dyn IdentityResolver, handles: &[String]) -> Result<Vec<RepositoryObject>> {
    let mut objects = Vec::with_capacity(handles.len());
    for handle in handles {
        match resolver.resolve(handle)? {
            Some(object) => objects.push(object),
            None => debug!("Reported handle {handle} does not resolve"),
        }
    }
    Ok(objects)
}
