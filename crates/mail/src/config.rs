//! Launch settings
//!
//! Loaded from (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. `launch.json` in the Cosmos config directory
//! 3. Environment variables (`COSMOS_SCREEN_SIZE`, `COSMOS_DB_PATH`)

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::accounts::{BACKUP_FILE, LEGACY_ACCOUNTS_FILE};
use crate::launch::ScreenSize;
use crate::sync::SyncOptions;

/// Settings filename in the Cosmos config directory
pub const SETTINGS_FILE: &str = "launch.json";

/// Account database filename in the Cosmos config directory
pub const DATABASE_FILE: &str = "accounts.sqlite";

pub const ENV_SCREEN_SIZE: &str = "COSMOS_SCREEN_SIZE";
pub const ENV_DB_PATH: &str = "COSMOS_DB_PATH";

/// Settings for the launch router and the services it starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Screen size class of the display
    pub screen_size: ScreenSize,
    /// Account database (default: `accounts.sqlite` in the config dir)
    pub database_path: Option<PathBuf>,
    /// Account backup snapshot (default: `accounts-backup.json`)
    pub backup_path: Option<PathBuf>,
    /// Legacy account export (default: `legacy-accounts.json`)
    pub legacy_accounts_path: Option<PathBuf>,
    /// Pause between background sync passes
    pub sync_interval_secs: u64,
    /// Minimum seconds between syncs of one account
    pub sync_cooldown_secs: u64,
    /// Worker threads; 0 uses the shared rayon pool
    pub worker_threads: usize,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        let sync = SyncOptions::default();
        Self {
            screen_size: ScreenSize::default(),
            database_path: None,
            backup_path: None,
            legacy_accounts_path: None,
            sync_interval_secs: sync.interval.as_secs(),
            sync_cooldown_secs: sync.cooldown_secs,
            worker_threads: 0,
        }
    }
}

impl LaunchSettings {
    /// Load settings from the config directory and the environment
    pub fn load() -> Result<Self> {
        let mut settings: Self = config::load_json_or_default(SETTINGS_FILE)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse launch settings JSON")
    }

    /// Apply overrides from a variable lookup (normally the environment)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(ENV_SCREEN_SIZE) {
            match ScreenSize::parse(&value) {
                Some(size) => self.screen_size = size,
                None => warn!("Ignoring unknown {}: {:?}", ENV_SCREEN_SIZE, value),
            }
        }
        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.is_empty()) {
            self.database_path = Some(PathBuf::from(path));
        }
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        resolve(&self.database_path, DATABASE_FILE)
    }

    pub fn backup_path(&self) -> Result<PathBuf> {
        resolve(&self.backup_path, BACKUP_FILE)
    }

    pub fn legacy_accounts_path(&self) -> Result<PathBuf> {
        resolve(&self.legacy_accounts_path, LEGACY_ACCOUNTS_FILE)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            interval: Duration::from_secs(self.sync_interval_secs),
            cooldown_secs: self.sync_cooldown_secs,
        }
    }
}

fn resolve(explicit: &Option<PathBuf>, filename: &str) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.clone()),
        None => config::config_path(filename).context("Could not determine config directory"),
    }
}
