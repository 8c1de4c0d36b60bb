//! Account backup and restore
//!
//! A JSON snapshot of the configured accounts is kept next to the other
//! Cosmos config files. When the account database comes up empty (wiped
//! data, reinstall) the accounts are restored from that snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::registry::AccountRegistry;
use crate::models::Account;
use crate::storage::AccountStore;

/// Backup filename in the Cosmos config directory
pub const BACKUP_FILE: &str = "accounts-backup.json";

const BACKUP_VERSION: u32 = 1;

/// Restore accounts when local storage lost them
pub trait RestoreAccounts: Send + Sync {
    /// Returns the number of accounts restored
    fn restore_accounts_if_needed(&self) -> Result<usize>;
}

#[derive(Debug, Serialize, Deserialize)]
struct BackupFile {
    version: u32,
    saved_at: DateTime<Utc>,
    accounts: Vec<BackupAccount>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BackupAccount {
    email: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    is_default: bool,
}

impl From<&Account> for BackupAccount {
    fn from(a: &Account) -> Self {
        Self {
            email: a.email.clone(),
            display_name: a.display_name.clone(),
            is_default: a.is_default,
        }
    }
}

impl BackupAccount {
    fn into_account(self) -> Account {
        let mut account = Account::new(self.email).with_default(self.is_default);
        account.display_name = self.display_name;
        account
    }
}

/// File-backed account snapshot
pub struct AccountBackup {
    path: PathBuf,
    store: Arc<dyn AccountStore>,
    registry: Option<Arc<dyn AccountRegistry>>,
}

impl AccountBackup {
    /// Back up to an explicit file
    pub fn new(path: impl Into<PathBuf>, store: Arc<dyn AccountStore>) -> Self {
        Self {
            path: path.into(),
            store,
            registry: None,
        }
    }

    /// Back up to `accounts-backup.json` in the Cosmos config directory
    pub fn in_config_dir(store: Arc<dyn AccountStore>) -> Result<Self> {
        let path = config::config_path(BACKUP_FILE).context("Could not determine config directory")?;
        Ok(Self::new(path, store))
    }

    /// Also re-add restored accounts to the external registry
    pub fn with_registry(mut self, registry: Arc<dyn AccountRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current accounts to the snapshot; returns how many
    pub fn backup_accounts(&self) -> Result<usize> {
        let accounts = self.store.list_accounts()?;
        let file = BackupFile {
            version: BACKUP_VERSION,
            saved_at: Utc::now(),
            accounts: accounts.iter().map(BackupAccount::from).collect(),
        };
        config::save_json_file(&self.path, &file)?;
        info!("Backed up {} account(s) to {}", file.accounts.len(), self.path.display());
        Ok(file.accounts.len())
    }
}

impl RestoreAccounts for AccountBackup {
    fn restore_accounts_if_needed(&self) -> Result<usize> {
        if self.store.count_accounts()? > 0 {
            debug!("Accounts present, no restore needed");
            return Ok(0);
        }
        if !self.path.exists() {
            debug!("No account backup at {}", self.path.display());
            return Ok(0);
        }

        let file: BackupFile = config::load_json_file(&self.path)?;
        if file.version > BACKUP_VERSION {
            warn!(
                "Account backup version {} is newer than supported {}, skipping restore",
                file.version, BACKUP_VERSION
            );
            return Ok(0);
        }

        let mut restored = 0;
        for entry in file.accounts {
            let account = self.store.register_account(entry.into_account())?;
            if let Some(registry) = &self.registry {
                registry.add_account(&account.email)?;
            }
            restored += 1;
        }
        info!("Restored {} account(s) from backup", restored);
        Ok(restored)
    }
}
