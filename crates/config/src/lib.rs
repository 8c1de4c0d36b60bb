//! Configuration loading for Cosmos applications
//!
//! Resolves the shared Cosmos config directory and reads/writes JSON
//! documents in it (launch settings, account backups, legacy account
//! exports).
//!
//! The directory is `~/.config/cosmos/` unless `COSMOS_CONFIG_DIR` points
//! somewhere else. Call [`init`] at application startup to create it.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the config directory
pub const CONFIG_DIR_ENV: &str = "COSMOS_CONFIG_DIR";

/// Create the Cosmos config directory and return its path.
pub fn init() -> Result<PathBuf> {
    ensure_config_dir()
}

/// Get the Cosmos config directory
pub fn config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|p| p.join("cosmos")),
    }
}

/// Get the path to a file within the Cosmos config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// Check if a file exists in the Cosmos config directory
pub fn config_exists(filename: &str) -> bool {
    config_path(filename).is_some_and(|p| p.exists())
}

/// Ensure the Cosmos config directory exists
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

/// Load and parse a JSON file from the Cosmos config directory
pub fn load_json<T: DeserializeOwned>(filename: &str) -> Result<T> {
    let path = config_path(filename).context("Could not determine config directory")?;
    load_json_file(&path)
}

/// Load a JSON file from the config directory, or `T::default()` when absent
pub fn load_json_or_default<T: DeserializeOwned + Default>(filename: &str) -> Result<T> {
    if config_exists(filename) {
        load_json(filename)
    } else {
        Ok(T::default())
    }
}

/// Load and parse a JSON file from an arbitrary path
pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Save a value as JSON into the Cosmos config directory
pub fn save_json<T: Serialize>(filename: &str, value: &T) -> Result<PathBuf> {
    let path = ensure_config_dir()?.join(filename);
    save_json_file(&path, value)?;
    Ok(path)
}

/// Save a value as pretty JSON to an arbitrary path, creating parent directories
pub fn save_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    // Readers never observe a partially written document
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)
        .with_context(|| format!("Failed to write config file: {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace config file: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_config_path_joins_filename() {
        if let Some(path) = config_path("test.json") {
            assert!(path.ends_with("test.json"));
        }
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = std::env::temp_dir().join(format!("cosmos-config-test-{}", std::process::id()));
        let path = dir.join("nested").join("sample.json");

        let value = Sample {
            name: "welcome".to_string(),
            count: 3,
        };
        save_json_file(&path, &value).unwrap();

        let loaded: Sample = load_json_file(&path).unwrap();
        assert_eq!(loaded, value);
        assert!(!path.with_extension("tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = std::env::temp_dir().join("cosmos-config-test-missing.json");
        let result: Result<Sample> = load_json_file(&path);
        assert!(result.is_err());
    }
}
