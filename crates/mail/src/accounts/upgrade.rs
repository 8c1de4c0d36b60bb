//! Bulk upgrade of accounts exported by older app versions
//!
//! Older releases kept their accounts in a flat JSON export. On first
//! launch of a newer version the router hands off to the upgrade screen,
//! which imports those accounts and retires the export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;

use crate::launch::{Destination, LaunchHost};
use crate::models::Account;
use crate::storage::AccountStore;

/// Legacy export filename in the Cosmos config directory
pub const LEGACY_ACCOUNTS_FILE: &str = "legacy-accounts.json";

/// Check run first on every launch
pub trait BulkUpgrade: Send + Sync {
    /// Start an upgrade if one is pending.
    ///
    /// Returns true when the upgrade took over the launch; the caller must
    /// then finish without routing.
    fn upgrade_if_necessary(&self, host: &dyn LaunchHost) -> Result<bool>;
}

#[derive(Debug, Deserialize)]
struct LegacyExport {
    #[serde(default)]
    accounts: Vec<LegacyAccount>,
}

#[derive(Debug, Deserialize)]
struct LegacyAccount {
    #[serde(alias = "emailAddress")]
    email: String,
    #[serde(default, alias = "displayName")]
    name: Option<String>,
    #[serde(default, alias = "isDefault")]
    default: bool,
}

/// Upgrade from a legacy account export file
pub struct LegacyAccountUpgrade {
    path: PathBuf,
    store: Arc<dyn AccountStore>,
}

impl LegacyAccountUpgrade {
    pub fn new(path: impl Into<PathBuf>, store: Arc<dyn AccountStore>) -> Self {
        Self {
            path: path.into(),
            store,
        }
    }

    /// Look for `legacy-accounts.json` in the Cosmos config directory
    pub fn in_config_dir(store: Arc<dyn AccountStore>) -> Result<Self> {
        let path = config::config_path(LEGACY_ACCOUNTS_FILE)
            .context("Could not determine config directory")?;
        Ok(Self::new(path, store))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a legacy export is waiting to be imported
    pub fn is_pending(&self) -> bool {
        self.path.exists()
    }

    /// Import the legacy accounts and retire the export file
    ///
    /// This is the work of the upgrade screen. Returns the number of
    /// accounts imported; already known addresses are not duplicated.
    pub fn import_accounts(&self) -> Result<usize> {
        if !self.is_pending() {
            return Ok(0);
        }

        let export: LegacyExport = config::load_json_file(&self.path)?;
        let mut imported = 0;
        for legacy in export.accounts {
            let mut account = Account::new(legacy.email).with_default(legacy.default);
            account.display_name = legacy.name;
            self.store.register_account(account)?;
            imported += 1;
        }

        let retired = self.path.with_extension("json.migrated");
        std::fs::rename(&self.path, &retired)
            .with_context(|| format!("Failed to retire legacy export: {}", self.path.display()))?;

        info!("Imported {} legacy account(s)", imported);
        Ok(imported)
    }
}

impl BulkUpgrade for LegacyAccountUpgrade {
    fn upgrade_if_necessary(&self, host: &dyn LaunchHost) -> Result<bool> {
        if !self.is_pending() {
            return Ok(false);
        }
        info!("Legacy accounts found at {}, starting upgrade", self.path.display());
        host.open(&Destination::AccountUpgrade)?;
        Ok(true)
    }
}
