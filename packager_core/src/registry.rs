//! Plugin registry
//!
//! Plugins are registered explicitly under one or more aliases. Alias lookup
//! ignores ASCII case.

use crate::aip::JsonAipPackager;
use crate::plugin::{PackageDisseminator, PackageIngester};
use std::sync::Arc;

/// Aliases the built-in JSON-AIP packager answers to
pub const AIP_ALIASES: [&str; 2] = ["AIP", "JSON-AIP"];

/// Maps package type aliases to plugin implementations
#[derive(Default, Clone)]
pub struct PluginRegistry {
    ingesters: Vec<(String, Arc<dyn PackageIngester>)>,
    disseminators: Vec<(String, Arc<dyn PackageDisseminator>)>,
}

impl PluginRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in packagers
    pub fn builtin() -> Self {
        let aip = Arc::new(JsonAipPackager::new());
        let mut registry = Self::new();
        for alias in AIP_ALIASES {
            registry.register_ingester(alias, aip.clone());
            registry.register_disseminator(alias, aip.clone());
        }
        registry
    }

    /// Register an ingester; a later registration under the same alias wins
    pub fn register_ingester(&mut self, alias: &str, plugin: Arc<dyn PackageIngester>) {
        self.ingesters
            .retain(|(name, _)| !name.eq_ignore_ascii_case(alias));
        log::debug!("Registered ingester for package type {alias}");
        self.ingesters.push((alias.to_string(), plugin));
    }

    /// Register a disseminator; a later registration under the same alias wins
    pub fn register_disseminator(&mut self, alias: &str, plugin: Arc<dyn PackageDisseminator>) {
        self.disseminators
            .retain(|(name, _)| !name.eq_ignore_ascii_case(alias));
        log::debug!("Registered disseminator for package type {alias}");
        self.disseminators.push((alias.to_string(), plugin));
    }

    pub fn ingester(&self, alias: &str) -> Option<Arc<dyn PackageIngester>> {
        self.ingesters
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(alias))
            .map(|(_, plugin)| plugin.clone())
    }

    pub fn disseminator(&self, alias: &str) -> Option<Arc<dyn PackageDisseminator>> {
        self.disseminators
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(alias))
            .map(|(_, plugin)| plugin.clone())
    }

    /// Ingester aliases in registration order
    pub fn ingester_names(&self) -> Vec<&str> {
        self.ingesters.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Disseminator aliases in registration order
    pub fn disseminator_names(&self) -> Vec<&str> {
        self.disseminators
            .iter()
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registers_both_roles() {
        let registry = PluginRegistry::builtin();

        for alias in AIP_ALIASES {
            assert!(registry.ingester(alias).is_some(), "ingester {alias}");
            assert!(registry.disseminator(alias).is_some(), "disseminator {alias}");
        }
        assert_eq!(registry.ingester_names(), AIP_ALIASES.to_vec());
        assert_eq!(registry.disseminator_names(), AIP_ALIASES.to_vec());
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = PluginRegistry::builtin();
        assert!(registry.ingester("aip").is_some());
        assert!(registry.disseminator("json-aip").is_some());
    }

    #[test]
    fn test_unknown_alias() {
        let registry = PluginRegistry::builtin();
        assert!(registry.ingester("METS").is_none());
        assert!(registry.disseminator("METS").is_none());
    }

    #[test]
    fn test_reregistration_replaces_alias() {
        let mut registry = PluginRegistry::new();
        registry.register_ingester("AIP", Arc::new(JsonAipPackager::new()));
        registry.register_ingester("aip", Arc::new(JsonAipPackager::new()));

        assert_eq!(registry.ingester_names(), vec!["aip"]);
        assert!(registry.disseminator_names().is_empty());
    }
}
