//! Centralized path management for the packager CLI
//!
//! This module provides utilities for consistently locating the repository
//! store and configuration file across the entire application.

use std::path::PathBuf;

/// The name of the application directory used across all platforms
const APP_DATA_DIR: &str = "packager";

/// The name of the repository store file
const STORE_FILE: &str = "repository.json";

/// Returns the base data directory for the application
///
/// On Unix-like systems this follows the XDG Base Directory specification
/// (`~/.local/share/packager`); on Windows it is `%APPDATA%/packager`.
///
/// If the standard directories cannot be determined, falls back to `.packager` in the current directory.
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DATA_DIR))
        .unwrap_or_else(|| PathBuf::from(".packager"))
}

/// Returns the default path of the JSON repository store
pub fn get_store_path() -> PathBuf {
    get_data_dir().join(STORE_FILE)
}

/// Returns the path to the configuration directory
///
/// This is separate from the data directory to follow platform conventions.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DATA_DIR))
        .unwrap_or_else(|| PathBuf::from(".packager"))
}

/// Returns the path to the configuration file
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_contains_app_name() {
        let data_dir = get_data_dir();
        assert!(
            data_dir.to_string_lossy().contains("packager"),
            "Data dir should contain 'packager': {}",
            data_dir.display()
        );
    }

    #[test]
    fn test_store_path_is_inside_data_dir() {
        let store_path = get_store_path();
        assert!(store_path.starts_with(get_data_dir()));
        assert_eq!(store_path.file_name().unwrap(), "repository.json");
    }

    #[test]
    fn test_config_path_is_toml() {
        let config_path = get_config_path();
        assert!(config_path.starts_with(get_config_dir()));
        assert_eq!(config_path.extension().unwrap(), "toml");
    }
}
