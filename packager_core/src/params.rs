//! Per-run packaging parameters
//!
//! A [`PackageParameters`] value is built once from the command line and then
//! handed, read-only, to every plugin call of the run.

/// Name of the property carrying the relational scope
pub const SCOPE_PROPERTY: &str = "scope";

/// Default relational scope when none is given
pub const DEFAULT_SCOPE: &str = "*";

/// Switches and free-form options forwarded to packager plugins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageParameters {
    workflow_enabled: bool,
    restore_mode_enabled: bool,
    keep_existing_mode_enabled: bool,
    replace_mode_enabled: bool,
    recursive_mode_enabled: bool,
    properties: Vec<(String, String)>,
}

impl Default for PackageParameters {
    fn default() -> Self {
        Self {
            workflow_enabled: true,
            restore_mode_enabled: false,
            keep_existing_mode_enabled: false,
            replace_mode_enabled: false,
            recursive_mode_enabled: false,
            properties: Vec::new(),
        }
    }
}

impl PackageParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route submissions through the review workflow (default `true`)
    pub fn with_workflow(mut self, enabled: bool) -> Self {
        self.workflow_enabled = enabled;
        self
    }

    /// Recreate objects with the identifiers recorded in the package
    pub fn with_restore_mode(mut self, enabled: bool) -> Self {
        self.restore_mode_enabled = enabled;
        self
    }

    /// Skip objects whose identifier is already in use during a restore
    pub fn with_keep_existing_mode(mut self, enabled: bool) -> Self {
        self.keep_existing_mode_enabled = enabled;
        self
    }

    /// Destroy and recreate objects whose identifier is already in use
    pub fn with_replace_mode(mut self, enabled: bool) -> Self {
        self.replace_mode_enabled = enabled;
        self
    }

    /// Operate on the whole tree referenced by the package
    pub fn with_recursive_mode(mut self, enabled: bool) -> Self {
        self.recursive_mode_enabled = enabled;
        self
    }

    pub fn workflow_enabled(&self) -> bool {
        self.workflow_enabled
    }

    pub fn restore_mode_enabled(&self) -> bool {
        self.restore_mode_enabled
    }

    /// Keep-existing only takes effect in a restore that is not a replace
    pub fn keep_existing_mode_enabled(&self) -> bool {
        self.keep_existing_mode_enabled && self.restore_mode_enabled && !self.replace_mode_enabled
    }

    pub fn replace_mode_enabled(&self) -> bool {
        self.replace_mode_enabled && self.restore_mode_enabled
    }

    pub fn recursive_mode_enabled(&self) -> bool {
        self.recursive_mode_enabled
    }

    /// Append a value; a property may hold several values
    pub fn add_property(&mut self, name: &str, value: &str) {
        self.properties.push((name.to_string(), value.to_string()));
    }

    /// Replace every value of a property with a single one
    pub fn set_property(&mut self, name: &str, value: &str) {
        match self.properties.iter().position(|(key, _)| key == name) {
            Some(first) => {
                self.properties[first].1 = value.to_string();
                let mut index = 0;
                self.properties.retain(|(key, _)| {
                    let keep = index <= first || key != name;
                    index += 1;
                    keep
                });
            }
            None => self.add_property(name, value),
        }
    }

    /// First value of a property
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value of a property, in insertion order
    pub fn property_values(&self, name: &str) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Interpret a property as a boolean flag
    pub fn bool_property(&self, name: &str, default: bool) -> bool {
        match self.property(name) {
            Some(value) => matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "on" | "1"
            ),
            None => default,
        }
    }

    /// All properties in insertion order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Relational scope forwarded to plugins
    pub fn scope(&self) -> &str {
        self.property(SCOPE_PROPERTY).unwrap_or(DEFAULT_SCOPE)
    }
}
