use crate::paths;
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use packager_core::store::DEFAULT_HANDLE_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct PackagerConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub interaction: InteractionConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StoreConfig {
    /// Repository file; the platform data directory is used when unset
    pub path: Option<PathBuf>,
    /// Prefix for handles minted in a new repository
    pub handle_prefix: String,
    /// Actor emails accepted in addition to those recorded in the repository
    pub principals: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct InteractionConfig {
    /// Answer every prompt with its default, as `-u` does
    pub no_user_interaction: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub color_enabled: bool,
    pub progress_enabled: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            handle_prefix: DEFAULT_HANDLE_PREFIX.to_string(),
            principals: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color_enabled: true,
            progress_enabled: true,
        }
    }
}

impl StoreConfig {
    /// Effective repository file
    pub fn store_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(paths::get_store_path)
    }
}

/// Configuration manager that handles platform paths and layered configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with the default platform path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn get_config_path(&self) -> PathBuf {
        self.config_path.clone()
    }

    fn default_config_path() -> PathBuf {
        // Check for XDG_CONFIG_HOME override first (Linux/macOS)
        #[cfg(not(target_os = "windows"))]
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("packager/config.toml");
        }

        paths::get_config_path()
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    pub fn load(&self) -> Result<PackagerConfig> {
        let mut figment = Figment::new();

        // Layer 1: Defaults
        figment = figment.merge(Serialized::defaults(PackagerConfig::default()));

        // Layer 2: Config file (if exists)
        if self.config_path.exists() {
            log::debug!("Loading configuration from {}", self.config_path.display());
            figment = figment.merge(Toml::file(&self.config_path));
        }

        // Layer 3: Environment variables
        figment = figment.merge(Env::prefixed("PACKAGER_").split("__"));

        figment.extract().context("Failed to load configuration")
    }
}

/// Load configuration from `path`, or from the default location
pub fn get_config(path: Option<PathBuf>) -> Result<PackagerConfig> {
    let manager = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            ConfigManager::with_path(path)
        }
        None => ConfigManager::new(),
    };
    manager.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp_dir.path().join("missing.toml"));

        let config = manager.load().unwrap();
        assert_eq!(config.store.handle_prefix, "123456789");
        assert!(config.store.principals.is_empty());
        assert!(!config.interaction.no_user_interaction);
        assert!(config.output.color_enabled);
        assert_eq!(config.store.store_path(), paths::get_store_path());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[store]
path = "/srv/packager/repository.json"
handle_prefix = "10673"
principals = ["admin@example.org", "curator@example.org"]

[interaction]
no_user_interaction = true
"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(config_path).load().unwrap();
        assert_eq!(
            config.store.store_path(),
            PathBuf::from("/srv/packager/repository.json")
        );
        assert_eq!(config.store.handle_prefix, "10673");
        assert_eq!(config.store.principals.len(), 2);
        assert!(config.interaction.no_user_interaction);
        assert!(config.output.progress_enabled);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let error = get_config(Some(temp_dir.path().join("nope.toml"))).unwrap_err();
        assert!(error.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "[store\nhandle_prefix = ").unwrap();

        assert!(ConfigManager::with_path(config_path).load().is_err());
    }
}
